//! Shape algorithms written against [`PixelSink`].
//!
//! The algorithms only ever ask a sink for clipped solid runs, so the same code
//! drives the 16-bit [`Display`](crate::Display) and its fast 8-bit path.

use crate::window::{clip, Window};

/// Something that can open an address window and stream colors into it.
pub trait PixelSink {
    type Color: Copy;
    type Error;

    /// Panel size as (width, height).
    fn size(&self) -> (u16, u16);

    /// Programs the address window. Coordinates are inclusive and already clipped.
    fn set_window(&mut self, window: Window) -> Result<(), Self::Error>;

    /// Streams colors into the current window.
    fn stream_pixels(&mut self, colors: &[Self::Color]) -> Result<(), Self::Error>;

    /// Streams `count` copies of `color` into the current window.
    fn flood(&mut self, color: Self::Color, count: u32) -> Result<(), Self::Error>;

    /// Fills a clipped, non-empty window with a single color.
    ///
    /// Every provided drawing method ends up here, which makes it the place to apply
    /// per-run policy.
    fn fill_window(&mut self, window: Window, color: Self::Color) -> Result<(), Self::Error> {
        self.set_window(window)?;
        self.flood(color, window.len())
    }

    fn pixel(&mut self, x: i32, y: i32, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(x, y, 1, 1, color)
    }

    fn hline(&mut self, x: i32, y: i32, w: i32, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(x, y, w, 1, color)
    }

    fn vline(&mut self, x: i32, y: i32, h: i32, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(x, y, 1, h, color)
    }

    fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        match clip(self.size(), x, y, w, h) {
            Some(window) => self.fill_window(window, color),
            None => Ok(()),
        }
    }
}

/// Points of a Bresenham line.
///
/// Points come in increasing order along the major axis: a line is walked from the
/// endpoint with the smaller major coordinate, whichever endpoint that is.
#[derive(Debug, Clone)]
pub struct LinePoints {
    steep: bool,
    x_start: i64,
    y_start: i64,
    x: i64,
    x_end: i64,
    y: i64,
    dx: i64,
    dy: i64,
    err: i64,
    y_step: i64,
}

impl LinePoints {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        let (mut x0, mut y0, mut x1, mut y1) = if steep {
            (y0, x0, y1, x1)
        } else {
            (x0, y0, x1, y1)
        };
        if x0 > x1 {
            core::mem::swap(&mut x0, &mut x1);
            core::mem::swap(&mut y0, &mut y1);
        }
        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        Self {
            steep,
            x_start: x0,
            y_start: y0,
            x: x0,
            x_end: x1,
            y: y0,
            dx,
            dy,
            err: dx / 2,
            y_step: if y0 < y1 { 1 } else { -1 },
        }
    }

    /// Whether the major axis is vertical.
    pub fn is_steep(&self) -> bool {
        self.steep
    }

    /// Restricts the walk to major axis coordinates in `first..=last`.
    ///
    /// Points before `first` are stepped over in constant time, so the cost of a line
    /// does not depend on how far its endpoints lie outside the range.
    #[must_use]
    pub fn major_range(mut self, first: i64, last: i64) -> Self {
        if first > self.x {
            if first <= self.x_end {
                // after k steps the minor axis has moved ceil((k * dy - dx / 2) / dx) times
                let k = i128::from(first - self.x_start);
                let (dx, dy) = (i128::from(self.dx), i128::from(self.dy));
                let err = dx / 2 - k * dy;
                let moved = -err.div_euclid(dx);
                self.y = self.y_start + self.y_step * moved as i64;
                self.err = (err + moved * dx) as i64;
            }
            self.x = first;
        }
        self.x_end = self.x_end.min(last);
        self
    }
}

impl Iterator for LinePoints {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x > self.x_end {
            return None;
        }
        let (x, y) = (self.x as i32, self.y as i32);
        let point = if self.steep { (y, x) } else { (x, y) };
        self.err -= self.dy;
        if self.err < 0 {
            self.y += self.y_step;
            self.err += self.dx;
        }
        self.x += 1;
        Some(point)
    }
}

/// Draws a line, emitting one run per stretch of points along the major axis.
///
/// Axis-aligned lines become a single [`PixelSink::hline`] or [`PixelSink::vline`].
pub fn line<S: PixelSink>(
    sink: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: S::Color,
) -> Result<(), S::Error> {
    let (width, height) = sink.size();
    if y0 == y1 {
        let (x, w) = trimmed_run(x0.into(), x1.into(), width);
        return sink.hline(x, y0, w, color);
    }
    if x0 == x1 {
        let (y, h) = trimmed_run(y0.into(), y1.into(), height);
        return sink.vline(x0, y, h, color);
    }

    let (width, height) = (i32::from(width), i32::from(height));
    if (x0 < 0 && x1 < 0)
        || (y0 < 0 && y1 < 0)
        || (x0 >= width && x1 >= width)
        || (y0 >= height && y1 >= height)
    {
        return Ok(());
    }

    let points = LinePoints::new(x0, y0, x1, y1);
    let steep = points.is_steep();
    let major = if steep { height } else { width };
    let mut run: Option<((i32, i32), i32)> = None;
    for (x, y) in points.major_range(0, i64::from(major) - 1) {
        run = match run {
            Some((start, len)) if (steep && start.0 == x) || (!steep && start.1 == y) => {
                Some((start, len + 1))
            }
            Some(done) => {
                emit_run(sink, steep, done, color)?;
                Some(((x, y), 1))
            }
            None => Some(((x, y), 1)),
        };
    }
    match run {
        Some(done) => emit_run(sink, steep, done, color),
        None => Ok(()),
    }
}

fn emit_run<S: PixelSink>(
    sink: &mut S,
    steep: bool,
    ((x, y), len): ((i32, i32), i32),
    color: S::Color,
) -> Result<(), S::Error> {
    if steep {
        sink.vline(x, y, len, color)
    } else {
        sink.hline(x, y, len, color)
    }
}

/// Inclusive run between `a` and `b` in either order, as (start, length).
///
/// The run is cut one past each panel edge, so its length always fits an `i32`.
fn trimmed_run(a: i64, b: i64, limit: u16) -> (i32, i32) {
    let start = a.min(b).max(-1);
    let end = a.max(b).min(i64::from(limit));
    (start as i32, (end - start + 1) as i32)
}

/// Outline of a rectangle.
pub fn draw_rect<S: PixelSink>(
    sink: &mut S,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: S::Color,
) -> Result<(), S::Error> {
    if w <= 0 || h <= 0 {
        return Ok(());
    }
    sink.hline(x, y, w, color)?;
    if h > 1 {
        sink.hline(x, y.saturating_add(h - 1), w, color)?;
    }
    if h > 2 {
        sink.vline(x, y.saturating_add(1), h - 2, color)?;
        if w > 1 {
            sink.vline(x.saturating_add(w - 1), y.saturating_add(1), h - 2, color)?;
        }
    }
    Ok(())
}

/// Outline of a triangle.
pub fn draw_triangle<S: PixelSink>(
    sink: &mut S,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    (x2, y2): (i32, i32),
    color: S::Color,
) -> Result<(), S::Error> {
    line(sink, x0, y0, x1, y1, color)?;
    line(sink, x1, y1, x2, y2, color)?;
    line(sink, x2, y2, x0, y0, color)
}

/// Filled triangle, one horizontal span per visible scanline.
pub fn fill_triangle<S: PixelSink>(
    sink: &mut S,
    p0: (i32, i32),
    p1: (i32, i32),
    p2: (i32, i32),
    color: S::Color,
) -> Result<(), S::Error> {
    let mut points = [p0, p1, p2];
    points.sort_unstable_by_key(|p| p.1);
    let [(x0, y0), (x1, y1), (x2, y2)] = points.map(|(x, y)| (i64::from(x), i64::from(y)));

    if y0 == y2 {
        let a = x0.min(x1).min(x2);
        let b = x0.max(x1).max(x2);
        return span(sink, a, b, points[0].1, color);
    }

    let (dx01, dy01) = (x1 - x0, y1 - y0);
    let (dx02, dy02) = (x2 - x0, y2 - y0);
    let (dx12, dy12) = (x2 - x1, y2 - y1);
    let bottom = i64::from(sink.size().1) - 1;

    // The upper part includes scanline y1 only when the lower edge is flat.
    let last = if y1 == y2 { y1 } else { y1 - 1 };

    for y in y0.max(0)..=last.min(bottom) {
        let a = edge_x(x0, dx01, dy01, y - y0);
        let b = edge_x(x0, dx02, dy02, y - y0);
        span(sink, a, b, y as i32, color)?;
    }
    for y in (last + 1).max(0)..=y2.min(bottom) {
        let a = edge_x(x1, dx12, dy12, y - y1);
        let b = edge_x(x0, dx02, dy02, y - y0);
        span(sink, a, b, y as i32, color)?;
    }
    Ok(())
}

/// X of an edge `t` scanlines below its upper end, truncated toward the start.
fn edge_x(x: i64, dx: i64, dy: i64, t: i64) -> i64 {
    x + (i128::from(dx) * i128::from(t) / i128::from(dy)) as i64
}

fn span<S: PixelSink>(
    sink: &mut S,
    a: i64,
    b: i64,
    y: i32,
    color: S::Color,
) -> Result<(), S::Error> {
    let (x, w) = trimmed_run(a, b, sink.size().0);
    sink.hline(x, y, w, color)
}
