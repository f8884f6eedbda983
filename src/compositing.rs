//! Compositing mode for the 16-bit rendering primitives.

use embedded_graphics_core::pixelcolor::Rgb565;

use crate::color::colors;

/// How 16-bit primitives turn a requested color into bus traffic.
///
/// The mode is a plain value: every toggle returns a new mode and the display reads
/// its current mode once per primitive call.
///
/// - Masking turns every draw into a two-color stencil: the color argument is
///   ignored and the background (mask flag clear) or foreground (mask flag set)
///   color is written instead. This makes erase and redraw passes cheap without the
///   caller tracking which color means what.
/// - Overdraw avoidance skips solid runs that are known to already hold the
///   requested color, see [`Display::fill_rect`](crate::Display::fill_rect).
/// - Low color mode floods using only the high byte of each color, which makes every
///   flood a single bus write at reduced color precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compositing {
    masking: bool,
    overdraw: bool,
    mask_flag: bool,
    low_color: bool,
    background: Rgb565,
    foreground: Rgb565,
}

impl Compositing {
    pub const fn new() -> Self {
        Self {
            masking: false,
            overdraw: false,
            mask_flag: false,
            low_color: false,
            background: colors::BLACK,
            foreground: colors::WHITE,
        }
    }

    #[must_use]
    pub const fn masking_on(self) -> Self {
        Self {
            masking: true,
            ..self
        }
    }

    #[must_use]
    pub const fn masking_off(self) -> Self {
        Self {
            masking: false,
            ..self
        }
    }

    #[must_use]
    pub const fn overdraw_on(self) -> Self {
        Self {
            overdraw: true,
            ..self
        }
    }

    #[must_use]
    pub const fn overdraw_off(self) -> Self {
        Self {
            overdraw: false,
            ..self
        }
    }

    /// Swaps between the erase (background) and paint (foreground) phase.
    #[must_use]
    pub const fn flip_mask(self) -> Self {
        Self {
            mask_flag: !self.mask_flag,
            ..self
        }
    }

    #[must_use]
    pub const fn mask_flag(self, mask_flag: bool) -> Self {
        Self { mask_flag, ..self }
    }

    #[must_use]
    pub const fn background(self, background: Rgb565) -> Self {
        Self { background, ..self }
    }

    #[must_use]
    pub const fn foreground(self, foreground: Rgb565) -> Self {
        Self { foreground, ..self }
    }

    #[must_use]
    pub const fn low_color_mode_on(self) -> Self {
        Self {
            low_color: true,
            ..self
        }
    }

    #[must_use]
    pub const fn low_color_mode_off(self) -> Self {
        Self {
            low_color: false,
            ..self
        }
    }

    #[must_use]
    pub const fn toggle_low_color_mode(self) -> Self {
        Self {
            low_color: !self.low_color,
            ..self
        }
    }

    pub const fn is_masking(&self) -> bool {
        self.masking
    }

    pub const fn is_overdraw(&self) -> bool {
        self.overdraw
    }

    pub const fn is_mask_flag_set(&self) -> bool {
        self.mask_flag
    }

    pub const fn is_low_color(&self) -> bool {
        self.low_color
    }

    pub const fn background_color(&self) -> Rgb565 {
        self.background
    }

    pub const fn foreground_color(&self) -> Rgb565 {
        self.foreground
    }

    /// Color actually written when `color` is requested.
    pub const fn resolve(&self, color: Rgb565) -> Rgb565 {
        match (self.masking, self.mask_flag) {
            (false, _) => color,
            (true, false) => self.background,
            (true, true) => self.foreground,
        }
    }
}

impl Default for Compositing {
    fn default() -> Self {
        Self::new()
    }
}
