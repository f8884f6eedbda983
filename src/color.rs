//! Color helpers.

use embedded_graphics_core::pixelcolor::{
    raw::{RawData, RawU16},
    Rgb565,
};

/// Packs 8-bit channels into RGB565, dropping the low bits.
pub const fn color565(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

/// The 16-bit value sent on the bus for `color`.
pub fn to_raw(color: Rgb565) -> u16 {
    RawU16::from(color).into_inner()
}

pub fn from_raw(value: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(value))
}

/// Named colors.
///
/// Except for [`GREY`](colors::GREY), every color here has identical high and low
/// bytes, so filled regions need one bus write per flood instead of two per pixel.
pub mod colors {
    use embedded_graphics_core::pixelcolor::Rgb565;

    pub const BLACK: Rgb565 = Rgb565::new(0b00000, 0b000000, 0b00000);
    pub const BLUE: Rgb565 = Rgb565::new(0b00010, 0b000000, 0b10000);
    pub const RED: Rgb565 = Rgb565::new(0b11100, 0b000111, 0b00000);
    pub const GREEN: Rgb565 = Rgb565::new(0b00000, 0b100000, 0b00100);
    pub const CYAN: Rgb565 = Rgb565::new(0b00010, 0b100000, 0b10100);
    pub const MAGENTA: Rgb565 = Rgb565::new(0b11110, 0b000111, 0b10000);
    pub const YELLOW: Rgb565 = Rgb565::new(0b11100, 0b100111, 0b00100);
    pub const WHITE: Rgb565 = Rgb565::new(0b11110, 0b111111, 0b10111);

    pub const GREY: Rgb565 = Rgb565::new(0b01100, 0b011011, 0b01011);
}
