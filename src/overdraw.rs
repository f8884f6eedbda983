//! Memory of the last solid run per scanline and per column.

use embedded_graphics_core::pixelcolor::Rgb565;

use crate::window::Window;

/// Scanlines and columns beyond this are never remembered, so never skipped.
pub(crate) const MAX_LINES: usize = 320;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u16,
    end: u16,
    color: Rgb565,
}

impl Span {
    fn covers(&self, start: u16, end: u16, color: Rgb565) -> bool {
        self.color == color && self.start <= start && end <= self.end
    }

    fn overlaps(&self, start: u16, end: u16) -> bool {
        self.start <= end && start <= self.end
    }
}

/// Remembers, for each scanline and each column, the last solid run written to it.
///
/// A run is "unchanged" only if the remembered run fully covers it with the same
/// color. Every write that is not itself remembered must [`invalidate`](Self::invalidate)
/// the area it touched.
pub(crate) struct OverdrawCache {
    rows: [Option<Span>; MAX_LINES],
    columns: [Option<Span>; MAX_LINES],
}

impl OverdrawCache {
    pub const fn new() -> Self {
        Self {
            rows: [None; MAX_LINES],
            columns: [None; MAX_LINES],
        }
    }

    pub fn clear(&mut self) {
        self.rows = [None; MAX_LINES];
        self.columns = [None; MAX_LINES];
    }

    pub fn row_unchanged(&self, y: u16, x1: u16, x2: u16, color: Rgb565) -> bool {
        matches!(self.rows.get(usize::from(y)), Some(Some(span)) if span.covers(x1, x2, color))
    }

    pub fn column_unchanged(&self, x: u16, y1: u16, y2: u16, color: Rgb565) -> bool {
        matches!(self.columns.get(usize::from(x)), Some(Some(span)) if span.covers(y1, y2, color))
    }

    pub fn record_row(&mut self, y: u16, x1: u16, x2: u16, color: Rgb565) {
        Self::forget_crossing(&mut self.columns, x1, x2, y);
        if let Some(row) = self.rows.get_mut(usize::from(y)) {
            *row = Some(Span {
                start: x1,
                end: x2,
                color,
            });
        }
    }

    pub fn record_column(&mut self, x: u16, y1: u16, y2: u16, color: Rgb565) {
        Self::forget_crossing(&mut self.rows, y1, y2, x);
        if let Some(column) = self.columns.get_mut(usize::from(x)) {
            *column = Some(Span {
                start: y1,
                end: y2,
                color,
            });
        }
    }

    pub fn invalidate(&mut self, window: Window) {
        for y in window.y1..=window.y2 {
            Self::forget_overlapping(&mut self.rows, y, window.x1, window.x2);
        }
        for x in window.x1..=window.x2 {
            Self::forget_overlapping(&mut self.columns, x, window.y1, window.y2);
        }
    }

    /// Forgets the lines `first..=last` whose run passes through `at`.
    fn forget_crossing(lines: &mut [Option<Span>], first: u16, last: u16, at: u16) {
        for line in first..=last {
            Self::forget_overlapping(lines, line, at, at);
        }
    }

    fn forget_overlapping(lines: &mut [Option<Span>], line: u16, start: u16, end: u16) {
        if let Some(slot) = lines.get_mut(usize::from(line)) {
            if matches!(slot, Some(span) if span.overlaps(start, end)) {
                *slot = None;
            }
        }
    }
}
