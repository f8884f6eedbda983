//! Address windows and clipping.

/// Inclusive rectangle of panel memory, in controller coordinates.
///
/// The controller auto-increments across the window left to right and wraps to the
/// next row after `x2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Window {
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Window covering a whole panel of `size` (width, height).
    pub const fn full(size: (u16, u16)) -> Self {
        Self::new(0, 0, size.0.saturating_sub(1), size.1.saturating_sub(1))
    }

    pub const fn width(&self) -> u32 {
        if self.x2 < self.x1 {
            0
        } else {
            (self.x2 - self.x1) as u32 + 1
        }
    }

    pub const fn height(&self) -> u32 {
        if self.y2 < self.y1 {
            0
        } else {
            (self.y2 - self.y1) as u32 + 1
        }
    }

    /// Number of pixels in the window.
    pub const fn len(&self) -> u32 {
        self.width() * self.height()
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Clips the `w`×`h` rectangle at (`x`, `y`) to a panel of `size` (width, height).
///
/// Returns `None` when nothing of the rectangle is visible.
pub fn clip(size: (u16, u16), x: i32, y: i32, w: i32, h: i32) -> Option<Window> {
    if w <= 0 || h <= 0 {
        return None;
    }
    let x1 = x.max(0);
    let y1 = y.max(0);
    let x2 = x.saturating_add(w - 1).min(i32::from(size.0) - 1);
    let y2 = y.saturating_add(h - 1).min(i32::from(size.1) - 1);
    if x1 > x2 || y1 > y2 {
        return None;
    }
    Some(Window::new(x1 as u16, y1 as u16, x2 as u16, y2 as u16))
}
