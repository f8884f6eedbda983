//! `embedded-graphics` integration.

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::Rgb565,
    primitives::{PointsIter, Rectangle},
    Pixel,
};
use embedded_hal::digital::OutputPin;

use crate::{interface::Interface, models::Model, window::Window, Display};

impl<DI, M, RST> OriginDimensions for Display<DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    fn size(&self) -> Size {
        let (width, height) = M::FRAMEBUFFER_SIZE;
        Size::new(u32::from(width), u32::from(height))
    }
}

impl<DI, M, RST> DrawTarget for Display<DI, M, RST>
where
    DI: Interface,
    M: Model,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DI::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color)?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        if area.is_zero_sized() {
            return Ok(());
        }

        // Partly hidden areas and masked draws go pixel by pixel.
        let visible = area.intersection(&self.bounding_box()) == *area;
        if !visible || self.compositing.is_masking() {
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            );
        }

        let (x1, y1) = (area.top_left.x as u16, area.top_left.y as u16);
        let window = Window::new(
            x1,
            y1,
            x1 + area.size.width as u16 - 1,
            y1 + area.size.height as u16 - 1,
        );
        self.open_window(window)?;
        self.begin_stream(true)?;
        self.window_touched();
        self.stream_iter(colors.into_iter().take(window.len() as usize))
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width as i32,
            area.size.height as i32,
            color,
        )
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(color)
    }
}
