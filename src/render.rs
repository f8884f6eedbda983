//! 16-bit rendering primitives with masking and overdraw avoidance.

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;

use crate::{
    interface::Interface,
    models::Model,
    shapes::{self, PixelSink},
    window::Window,
    Display,
};

impl<DI, M, RST> PixelSink for Display<DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DI::Error;

    fn size(&self) -> (u16, u16) {
        M::FRAMEBUFFER_SIZE
    }

    fn set_window(&mut self, window: Window) -> Result<(), DI::Error> {
        self.open_window(window)
    }

    fn stream_pixels(&mut self, colors: &[Rgb565]) -> Result<(), DI::Error> {
        self.push_colors(colors, false)
    }

    fn flood(&mut self, color: Rgb565, count: u32) -> Result<(), DI::Error> {
        Display::flood(self, color, count)
    }

    fn fill_window(&mut self, window: Window, color: Rgb565) -> Result<(), DI::Error> {
        let color = self.compositing.resolve(color);
        if !self.compositing.is_overdraw() {
            self.open_window(window)?;
            return Display::flood(self, color, window.len());
        }

        if window.height() == 1 {
            self.fill_row(window.y1, window.x1, window.x2, color)
        } else if window.width() == 1 {
            self.fill_column(window.x1, window.y1, window.y2, color)
        } else {
            for y in window.y1..=window.y2 {
                self.fill_row(y, window.x1, window.x2, color)?;
            }
            Ok(())
        }
    }
}

impl<DI, M, RST> Display<DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    fn fill_row(&mut self, y: u16, x1: u16, x2: u16, color: Rgb565) -> Result<(), DI::Error> {
        if self.overdraw.row_unchanged(y, x1, x2, color) {
            return Ok(());
        }
        let window = Window::new(x1, y, x2, y);
        self.open_window(window)?;
        Display::flood(self, color, window.len())?;
        self.overdraw.record_row(y, x1, x2, color);
        Ok(())
    }

    fn fill_column(&mut self, x: u16, y1: u16, y2: u16, color: Rgb565) -> Result<(), DI::Error> {
        if self.overdraw.column_unchanged(x, y1, y2, color) {
            return Ok(());
        }
        let window = Window::new(x, y1, x, y2);
        self.open_window(window)?;
        Display::flood(self, color, window.len())?;
        self.overdraw.record_column(x, y1, y2, color);
        Ok(())
    }

    /// Draws a single pixel. Pixels outside the panel are skipped.
    ///
    /// With masking on the background or foreground color is written instead of `color`.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), DI::Error> {
        self.pixel(x, y, color)
    }

    /// Horizontal line of `w` pixels starting at (`x`, `y`), written as one flood.
    pub fn draw_fast_hline(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        self.hline(x, y, w, color)
    }

    /// Vertical line of `h` pixels starting at (`x`, `y`), written as one flood.
    pub fn draw_fast_vline(
        &mut self,
        x: i32,
        y: i32,
        h: i32,
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        self.vline(x, y, h, color)
    }

    /// Bresenham line between both endpoints, inclusive.
    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        shapes::line(self, x0, y0, x1, y1, color)
    }

    /// Fills a rectangle, clipped to the panel.
    ///
    /// The clipped area is written as a single window flood since the controller wraps
    /// rows at the window's right edge. With overdraw avoidance on the area is written
    /// row by row instead, and rows already known to hold `color` are skipped.
    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        PixelSink::fill_rect(self, x, y, w, h, color)
    }

    pub fn fill_screen(&mut self, color: Rgb565) -> Result<(), DI::Error> {
        let (width, height) = self.size();
        self.fill_rect(0, 0, i32::from(width), i32::from(height), color)
    }

    pub fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        shapes::draw_rect(self, x, y, w, h, color)
    }

    pub fn draw_triangle(
        &mut self,
        p0: (i32, i32),
        p1: (i32, i32),
        p2: (i32, i32),
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        shapes::draw_triangle(self, p0, p1, p2, color)
    }

    pub fn fill_triangle(
        &mut self,
        p0: (i32, i32),
        p1: (i32, i32),
        p2: (i32, i32),
        color: Rgb565,
    ) -> Result<(), DI::Error> {
        shapes::fill_triangle(self, p0, p1, p2, color)
    }
}
