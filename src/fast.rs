//! Reduced precision drawing, one byte per pixel.
//!
//! Every pixel is a single byte clocked twice, so a fill of any size is one bus write
//! followed by write strobes. Compositing modes don't apply here: fast colors are
//! written as given.

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;

use crate::{
    color, dcs,
    interface::Interface,
    models::Model,
    shapes::{self, PixelSink},
    window::{clip, Window},
    Display,
};

/// Longest run [`Display::fast_xor_flood`] handles in one call.
pub const XOR_RUN_MAX: usize = u8::MAX as usize;

/// An 8-bit color for the fast path.
///
/// The byte is sent as both halves of the 16-bit pixel, so `FastColor(b)` shows as
/// RGB565 `0xbbbb`. It is not an RGB565 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FastColor(pub u8);

impl From<FastColor> for Rgb565 {
    fn from(color: FastColor) -> Self {
        color::from_raw(u16::from_be_bytes([color.0, color.0]))
    }
}

struct FastSink<'a, DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    display: &'a mut Display<DI, M, RST>,
}

impl<DI, M, RST> PixelSink for FastSink<'_, DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    type Color = FastColor;
    type Error = DI::Error;

    fn size(&self) -> (u16, u16) {
        M::FRAMEBUFFER_SIZE
    }

    fn set_window(&mut self, window: Window) -> Result<(), DI::Error> {
        self.display.open_window(window)
    }

    fn stream_pixels(&mut self, colors: &[FastColor]) -> Result<(), DI::Error> {
        self.display.begin_stream(false)?;
        self.display.window_touched();
        for color in colors {
            self.display.di.send_repeated(color.0, 2)?;
        }
        Ok(())
    }

    fn flood(&mut self, color: FastColor, count: u32) -> Result<(), DI::Error> {
        self.display.fast_flood(color, count)
    }
}

impl<DI, M, RST> Display<DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    fn fast(&mut self) -> FastSink<'_, DI, M, RST> {
        FastSink { display: self }
    }

    /// Writes `len` pixels of `color` into the current window.
    pub fn fast_flood(&mut self, color: FastColor, len: u32) -> Result<(), DI::Error> {
        if len == 0 {
            return Ok(());
        }
        self.begin_stream(false)?;
        self.window_touched();
        self.repeat_byte(color.0, len)
    }

    pub fn fast_pixel(&mut self, x: i32, y: i32, color: FastColor) -> Result<(), DI::Error> {
        self.fast().pixel(x, y, color)
    }

    pub fn fastest_hline(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        color: FastColor,
    ) -> Result<(), DI::Error> {
        self.fast().hline(x, y, w, color)
    }

    pub fn fastest_vline(
        &mut self,
        x: i32,
        y: i32,
        h: i32,
        color: FastColor,
    ) -> Result<(), DI::Error> {
        self.fast().vline(x, y, h, color)
    }

    pub fn fast_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: FastColor,
    ) -> Result<(), DI::Error> {
        shapes::line(&mut self.fast(), x0, y0, x1, y1, color)
    }

    pub fn fast_fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: FastColor,
    ) -> Result<(), DI::Error> {
        self.fast().fill_rect(x, y, w, h, color)
    }

    pub fn fast_draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: FastColor,
    ) -> Result<(), DI::Error> {
        shapes::draw_rect(&mut self.fast(), x, y, w, h, color)
    }

    pub fn fast_fill_screen(&mut self, color: FastColor) -> Result<(), DI::Error> {
        self.open_window(Window::full(M::FRAMEBUFFER_SIZE))?;
        self.fast_flood(color, Window::full(M::FRAMEBUFFER_SIZE).len())
    }

    pub fn fast_fill_triangle(
        &mut self,
        p0: (i32, i32),
        p1: (i32, i32),
        p2: (i32, i32),
        color: FastColor,
    ) -> Result<(), DI::Error> {
        shapes::fill_triangle(&mut self.fast(), p0, p1, p2, color)
    }

    pub fn fast_draw_triangle(
        &mut self,
        p0: (i32, i32),
        p1: (i32, i32),
        p2: (i32, i32),
        color: FastColor,
    ) -> Result<(), DI::Error> {
        shapes::draw_triangle(&mut self.fast(), p0, p1, p2, color)
    }

    /// XORs the first `length` pixels of the current window with `mask`.
    ///
    /// The resident pixels are read back and rewritten with both bytes XORed, so doing
    /// it twice with the same mask restores the original content.
    pub fn fast_xor_flood(&mut self, mask: u8, length: u8) -> Result<(), DI::Error> {
        if length == 0 {
            return Ok(());
        }
        let mut resident = [Rgb565::default(); XOR_RUN_MAX];
        let resident = &mut resident[..usize::from(length)];
        self.read_into(dcs::READ_MEMORY_START, resident)?;

        let mask = u16::from_be_bytes([mask, mask]);
        self.begin_stream(true)?;
        self.window_touched();
        self.stream_iter(
            resident
                .iter()
                .map(|pixel| color::from_raw(color::to_raw(*pixel) ^ mask)),
        )
    }

    /// XORs a rectangle with `mask`, clipped to the panel.
    pub fn fast_xor_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        mask: u8,
    ) -> Result<(), DI::Error> {
        let Some(area) = clip(M::FRAMEBUFFER_SIZE, x, y, w, h) else {
            return Ok(());
        };
        for row in area.y1..=area.y2 {
            let mut start = area.x1;
            loop {
                let run = (area.x2 - start + 1).min(XOR_RUN_MAX as u16);
                let end = start + run - 1;
                self.open_window(Window::new(start, row, end, row))?;
                self.fast_xor_flood(mask, run as u8)?;
                if end == area.x2 {
                    break;
                }
                start = end + 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        _mock::{new_mock_display, Controller},
        color, FastColor,
    };

    fn snapshot(controller: &Controller, x: u16, y: u16, w: u16, h: u16) -> std::vec::Vec<u16> {
        (y..y + h)
            .flat_map(|row| (x..x + w).map(move |col| (col, row)))
            .map(|(col, row)| controller.pixel(col, row))
            .collect()
    }

    #[test]
    fn fast_fill_writes_byte_twice() {
        let (mut display, controller) = new_mock_display();
        display.fast_fill_rect(2, 3, 4, 5, FastColor(0xA5)).unwrap();

        assert_eq!(controller.written().len(), 20);
        assert_eq!(controller.pixel(5, 7), 0xA5A5);
        assert_eq!(controller.pixel(5, 7), color::to_raw(FastColor(0xA5).into()));
        // window setup, 0x2C, one color byte
        assert_eq!(controller.bus_writes(), 10 + 1 + 1);
    }

    #[test]
    fn fast_primitives_clip() {
        let (mut display, controller) = new_mock_display();
        display.fast_pixel(-1, 0, FastColor(1)).unwrap();
        display.fastest_hline(0, 400, 10, FastColor(1)).unwrap();
        display.fast_line(-10, -10, -2, -1, FastColor(1)).unwrap();
        display.fast_xor_rect(300, 0, 10, 10, 0xFF).unwrap();
        assert_eq!(controller.transactions(), 0);
    }

    #[test]
    fn fast_shapes() {
        let (mut display, controller) = new_mock_display();
        display.fast_line(0, 0, 3, 2, FastColor(0x11)).unwrap();
        assert_eq!(controller.written(), [(0, 0), (1, 1), (2, 1), (3, 2)]);

        display.fast_draw_rect(20, 20, 4, 4, FastColor(0x22)).unwrap();
        assert_eq!(controller.pixel(23, 23), 0x2222);
        assert_eq!(controller.pixel(21, 21), 0);

        display
            .fast_fill_triangle((50, 50), (60, 50), (50, 60), FastColor(0x33))
            .unwrap();
        assert_eq!(controller.pixel(52, 52), 0x3333);

        display
            .fast_draw_triangle((100, 100), (110, 100), (100, 110), FastColor(0x44))
            .unwrap();
        assert_eq!(controller.pixel(105, 100), 0x4444);
        assert_eq!(controller.pixel(102, 102), 0);

        display.fastest_vline(200, 10, 5, FastColor(0x55)).unwrap();
        assert_eq!(controller.pixel(200, 14), 0x5555);
    }

    #[test]
    fn fast_fill_screen_covers_panel() {
        let (mut display, controller) = new_mock_display();
        display.fast_fill_screen(FastColor(0x0F)).unwrap();
        assert_eq!(controller.pixel(0, 0), 0x0F0F);
        assert_eq!(controller.pixel(239, 319), 0x0F0F);
    }

    #[test]
    fn double_xor_restores_content() {
        let (mut display, controller) = new_mock_display();
        for y in 0..20u16 {
            for x in 0..240u16 {
                controller.set_pixel(x, y, x.wrapping_mul(0x9E37) ^ y.wrapping_mul(0x0101));
            }
        }
        let before = snapshot(&controller, 0, 0, 240, 20);

        display.fast_xor_rect(0, 0, 240, 20, 0x5A).unwrap();
        let once = snapshot(&controller, 0, 0, 240, 20);
        assert_ne!(once, before);
        assert_eq!(once[0], before[0] ^ 0x5A5A);

        display.fast_xor_rect(0, 0, 240, 20, 0x5A).unwrap();
        assert_eq!(snapshot(&controller, 0, 0, 240, 20), before);
    }

    #[test]
    fn xor_flood_uses_current_window() {
        let (mut display, controller) = new_mock_display();
        controller.set_pixel(10, 10, 0x1234);
        controller.set_pixel(11, 10, 0xFFFF);
        display.set_addr_window(10, 10, 11, 10).unwrap();

        display.fast_xor_flood(0x0F, 2).unwrap();
        assert_eq!(controller.pixel(10, 10), 0x1234 ^ 0x0F0F);
        assert_eq!(controller.pixel(11, 10), 0xF0F0);
        assert_eq!(controller.pixel(12, 10), 0);
    }

    #[test]
    fn fast_shapes_with_extreme_coordinates() {
        let (mut display, controller) = new_mock_display();
        display
            .fast_fill_triangle((0, 0), (100_000, 100_000), (0, 200_000), FastColor(0x66))
            .unwrap();
        assert_eq!(controller.pixel(100, 100), 0x6666);
        assert_eq!(controller.pixel(101, 100), 0);
        assert_eq!(controller.pixel(239, 319), 0x6666);

        controller.clear_log();
        display.fast_line(i32::MIN, 0, i32::MAX, 5, FastColor(0x77)).unwrap();
        assert_eq!(controller.written().len(), 240);

        display
            .fast_draw_rect(10, 10, 5, i32::MAX, FastColor(0x88))
            .unwrap();
        assert_eq!(controller.pixel(14, 319), 0x8888);
    }
}
