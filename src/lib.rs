#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

//! This crate provides a driver for TFT display controllers on an 8080-style 8-bit
//! parallel bus, such as the ILI9341 on Arduino-style shields.
//!
//! Drawing requests are turned into bus transactions that program the controller's
//! address window and stream RGB565 pixel data into it. On top of plain drawing the
//! driver offers:
//!
//! - masked rendering, a two-color stencil mode for cheap erase/redraw cycles,
//! - overdraw avoidance, which skips solid runs already known to hold their color,
//! - a fast 8-bit path with one byte per pixel and XOR compositing.
//!
//! ## Example
//!
//! ```ignore
//! use tftlcd::{
//!     color::colors,
//!     interface::{BusTiming, ParallelInterface},
//!     models::ILI9341,
//!     Builder,
//! };
//!
//! let di = ParallelInterface::new(data_lines, dc, wr, rd, delay, BusTiming::new(16_000_000));
//! let mut display = Builder::new(ILI9341, di)
//!     .reset_pin(rst)
//!     .init(&mut async_delay)
//!     .await?;
//!
//! display.fill_screen(colors::BLACK)?;
//! display.draw_line(0, 0, 239, 319, colors::WHITE)?;
//! display.fast_fill_triangle((10, 10), (100, 40), (40, 120), FastColor(0xE0))?;
//! ```
//!
//! ## Bus access
//!
//! The bus has no arbitration. A `Display` owns its interface, so transactions from
//! one display can't interleave; when the GPIO lines are shared with interrupt
//! handlers wrap the interface in [`interface::CriticalSectionInterface`].

use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_hal::digital::OutputPin;

pub mod interface;

mod builder;
pub use builder::*;

pub mod color;
pub mod compositing;
pub mod dcs;
pub mod models;
pub mod shapes;
pub mod window;

mod fast;
pub use fast::*;

mod graphics;
mod overdraw;
mod render;

#[cfg(test)]
mod _mock;

use compositing::Compositing;
use dcs::{InterfaceExt, SetColumnAddress, SetRowAddress};
use models::Model;
use overdraw::OverdrawCache;
use window::Window;

/// Flood batches are built from this many pixels at a time.
const FLOOD_CHUNK: usize = 32;

/// Where the controller is in the window/stream protocol.
///
/// Any command byte ends an open pixel stream, so the only way from `Streaming` back
/// to `WindowSet` is through another command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    /// Window unknown to the driver.
    Idle,
    /// Window programmed, no pixel stream open.
    WindowSet,
    /// Pixel data write (`0x2C`) open.
    Streaming,
}

/// Display driver structure.
pub struct Display<DI, MODEL, RST>
where
    DI: interface::Interface,
    MODEL: Model,
    RST: OutputPin,
{
    /// The display interface.
    di: DI,
    /// The display model instance.
    model: MODEL,
    /// The reset pin.
    rst: Option<RST>,
    /// Current compositing mode.
    compositing: Compositing,
    /// Last programmed address window.
    window: Window,
    state: BusState,
    overdraw: OverdrawCache,
}

impl<DI, M, RST> Display<DI, M, RST>
where
    DI: interface::Interface,
    M: Model,
    RST: OutputPin,
{
    fn new(di: DI, model: M, rst: Option<RST>, compositing: Compositing) -> Self {
        Self {
            di,
            model,
            rst,
            compositing,
            window: Window::full(M::FRAMEBUFFER_SIZE),
            state: BusState::Idle,
            overdraw: OverdrawCache::new(),
        }
    }

    /// Panel size as (width, height).
    pub fn size(&self) -> (u16, u16) {
        M::FRAMEBUFFER_SIZE
    }

    /// Last programmed address window.
    pub fn address_window(&self) -> Window {
        self.window
    }

    pub fn bus_state(&self) -> BusState {
        self.state
    }

    // Address window

    /// Programs the column range of the address window.
    ///
    /// Coordinates are not validated: callers clip to the panel.
    pub fn set_column_window(&mut self, x1: u16, x2: u16) -> Result<(), DI::Error> {
        self.di.write_command(SetColumnAddress::new(x1, x2))?;
        self.window.x1 = x1;
        self.window.x2 = x2;
        self.window_programmed();
        Ok(())
    }

    /// Programs the row range of the address window.
    pub fn set_row_window(&mut self, y1: u16, y2: u16) -> Result<(), DI::Error> {
        self.di.write_command(SetRowAddress::new(y1, y2))?;
        self.window.y1 = y1;
        self.window.y2 = y2;
        self.window_programmed();
        Ok(())
    }

    /// Moves the window start to (`x`, `y`) and keeps the window's end.
    pub fn set_point(&mut self, x: u16, y: u16) -> Result<(), DI::Error> {
        self.di.write_command(SetColumnAddress::start(x))?;
        self.di.write_command(SetRowAddress::start(y))?;
        self.window.x1 = x;
        self.window.y1 = y;
        self.window_programmed();
        Ok(())
    }

    /// Programs both window ranges. The next pixel stream starts at (`x1`, `y1`).
    pub fn set_addr_window(&mut self, x1: u16, y1: u16, x2: u16, y2: u16) -> Result<(), DI::Error> {
        self.set_column_window(x1, x2)?;
        self.set_row_window(y1, y2)
    }

    pub(crate) fn open_window(&mut self, window: Window) -> Result<(), DI::Error> {
        self.set_addr_window(window.x1, window.y1, window.x2, window.y2)
    }

    fn window_programmed(&mut self) {
        self.state = BusState::WindowSet;
    }

    /// Called after any command that isn't part of the window/stream protocol.
    fn stream_interrupted(&mut self) {
        if self.state == BusState::Streaming {
            self.state = BusState::WindowSet;
        }
    }

    // Pixel streaming

    /// Opens a pixel data write unless one is already open and `restart` is false.
    fn begin_stream(&mut self, restart: bool) -> Result<(), DI::Error> {
        if restart || self.state != BusState::Streaming {
            self.di.write_command(dcs::WriteMemoryStart)?;
            self.state = BusState::Streaming;
        }
        Ok(())
    }

    /// Streamed pixels land somewhere in the current window.
    fn window_touched(&mut self) {
        if self.compositing.is_overdraw() {
            self.overdraw.invalidate(self.window);
        }
    }

    /// Writes one pixel at the controller's cursor, high byte first.
    ///
    /// Doesn't reprogram the window. Opens a pixel stream if none is open.
    pub fn push_color(&mut self, color: Rgb565) -> Result<(), DI::Error> {
        self.push_colors(&[color], false)
    }

    /// Streams `colors` into the current window.
    ///
    /// With `first` set the stream (re)starts at the window start. Without it the
    /// colors continue an open stream, or start one if the last window change or
    /// command ended it.
    pub fn push_colors(&mut self, colors: &[Rgb565], first: bool) -> Result<(), DI::Error> {
        if colors.is_empty() {
            return Ok(());
        }
        self.begin_stream(first)?;
        self.window_touched();
        self.stream_iter(colors.iter().copied())
    }

    /// Writes `len` pixels of `color` into the current window.
    ///
    /// Colors with identical high and low bytes, and any color in low color mode, are
    /// placed on the bus once and only strobed afterwards.
    pub fn flood(&mut self, color: Rgb565, len: u32) -> Result<(), DI::Error> {
        if len == 0 {
            return Ok(());
        }
        self.begin_stream(false)?;
        self.window_touched();

        let [hi, lo] = color::to_raw(color).to_be_bytes();
        if hi == lo || self.compositing.is_low_color() {
            return self.repeat_byte(hi, len);
        }

        let mut chunk = [0u8; FLOOD_CHUNK * 2];
        for pair in chunk.chunks_exact_mut(2) {
            pair.copy_from_slice(&[hi, lo]);
        }
        let full = len / FLOOD_CHUNK as u32;
        let rest = (len % FLOOD_CHUNK as u32) as usize;
        for _ in 0..full {
            self.di.send_data(&chunk)?;
        }
        self.di.send_data(&chunk[..rest * 2])
    }

    /// Two strobes per pixel of a single bus value.
    fn repeat_byte(&mut self, byte: u8, pixels: u32) -> Result<(), DI::Error> {
        match pixels.checked_mul(2) {
            Some(strobes) => self.di.send_repeated(byte, strobes),
            None => {
                self.di.send_repeated(byte, pixels)?;
                self.di.send_repeated(byte, pixels)
            }
        }
    }

    #[cfg(feature = "batch")]
    fn stream_iter(&mut self, colors: impl Iterator<Item = Rgb565>) -> Result<(), DI::Error> {
        let mut batch = heapless::Vec::<u8, { FLOOD_CHUNK * 2 }>::new();
        for color in colors {
            if batch.is_full() {
                self.di.send_data(&batch)?;
                batch.clear();
            }
            // capacity is even, so both bytes always fit after the check above
            let _ = batch.extend_from_slice(&color::to_raw(color).to_be_bytes());
        }
        self.di.send_data(&batch)
    }

    #[cfg(not(feature = "batch"))]
    fn stream_iter(&mut self, colors: impl Iterator<Item = Rgb565>) -> Result<(), DI::Error> {
        for color in colors {
            self.di.send_data(&color::to_raw(color).to_be_bytes())?;
        }
        Ok(())
    }

    /// Moves only the row start to `y` and writes one pixel at the current column start.
    pub fn color_pixel(&mut self, y: u16, color: Rgb565) -> Result<(), DI::Error> {
        self.di.write_command(SetRowAddress::start(y))?;
        self.window.y1 = y;
        self.window_programmed();
        self.push_colors(&[color], true)
    }

    // Read-back

    /// Reads the pixel at (`x`, `y`); `None` when it's outside the panel.
    ///
    /// The controller returns 6 bits per channel which are narrowed back to RGB565,
    /// so a pixel written with masking off reads back as the written color. Read
    /// data is not validated: a bus fault or a wrong [`BusTiming`](interface::BusTiming)
    /// calibration yields wrong colors, not an error.
    pub fn read_pixel(&mut self, x: i32, y: i32) -> Result<Option<Rgb565>, DI::Error> {
        let Some(window) = window::clip(self.size(), x, y, 1, 1) else {
            return Ok(None);
        };
        self.open_window(window)?;
        let mut pixel = [Rgb565::default()];
        self.read_into(dcs::READ_MEMORY_START, &mut pixel)?;
        Ok(Some(pixel[0]))
    }

    /// Reads pixels from the window (`x1`, `y1`)-(`x2`, `y2`) in scan order.
    ///
    /// The window is clipped to the panel. Returns how many pixels were read, at
    /// most `buffer.len()`.
    pub fn read_pixels(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        buffer: &mut [Rgb565],
    ) -> Result<usize, DI::Error> {
        let w = x2.saturating_sub(x1).saturating_add(1);
        let h = y2.saturating_sub(y1).saturating_add(1);
        let Some(window) = window::clip(self.size(), x1, y1, w, h) else {
            return Ok(0);
        };
        self.open_window(window)?;
        let count = buffer.len().min(window.len() as usize);
        self.read_into(dcs::READ_MEMORY_START, &mut buffer[..count])?;
        Ok(count)
    }

    /// Continues the last read where it stopped.
    pub fn read_pixels_continue(&mut self, buffer: &mut [Rgb565]) -> Result<(), DI::Error> {
        self.read_into(dcs::READ_MEMORY_CONTINUE, buffer)
    }

    fn read_into(&mut self, command: u8, buffer: &mut [Rgb565]) -> Result<(), DI::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("read {=usize} pixels, command {=u8:#x}", buffer.len(), command);

        self.di.send_command(command)?;
        self.stream_interrupted();

        let mut dummy = [0u8; 1];
        self.di.read_data(&mut dummy)?;
        for pixel in buffer.iter_mut() {
            let mut rgb = [0u8; 3];
            self.di.read_data(&mut rgb)?;
            *pixel = Rgb565::new(rgb[0] >> 3, rgb[1] >> 2, rgb[2] >> 3);
        }
        Ok(())
    }

    // Compositing

    pub fn compositing(&self) -> Compositing {
        self.compositing
    }

    /// Replaces the compositing mode. Switching overdraw avoidance on starts with an
    /// empty run memory.
    pub fn set_compositing(&mut self, compositing: Compositing) {
        if compositing.is_overdraw() && !self.compositing.is_overdraw() {
            self.overdraw.clear();
        }
        self.compositing = compositing;
    }

    pub fn masking_on(&mut self) {
        self.set_compositing(self.compositing.masking_on());
    }

    pub fn masking_off(&mut self) {
        self.set_compositing(self.compositing.masking_off());
    }

    pub fn flip_mask(&mut self) {
        self.set_compositing(self.compositing.flip_mask());
    }

    pub fn overdraw_on(&mut self) {
        self.set_compositing(self.compositing.overdraw_on());
    }

    pub fn overdraw_off(&mut self) {
        self.set_compositing(self.compositing.overdraw_off());
    }

    pub fn low_color_mode_on(&mut self) {
        self.set_compositing(self.compositing.low_color_mode_on());
    }

    pub fn low_color_mode_off(&mut self) {
        self.set_compositing(self.compositing.low_color_mode_off());
    }

    pub fn toggle_low_color_mode(&mut self) {
        self.set_compositing(self.compositing.toggle_low_color_mode());
    }

    pub fn set_background_color(&mut self, color: Rgb565) {
        self.set_compositing(self.compositing.background(color));
    }

    pub fn set_foreground_color(&mut self, color: Rgb565) {
        self.set_compositing(self.compositing.foreground(color));
    }

    // Register programming

    pub fn write_register8(&mut self, register: u8, value: u8) -> Result<(), DI::Error> {
        self.stream_interrupted();
        self.di.write_register8(register, value)
    }

    pub fn write_register16(&mut self, register: u16, value: u16) -> Result<(), DI::Error> {
        self.stream_interrupted();
        self.di.write_register16(register, value)
    }

    pub fn write_register24(&mut self, register: u8, value: u32) -> Result<(), DI::Error> {
        self.stream_interrupted();
        self.di.write_register24(register, value)
    }

    pub fn write_register32(&mut self, register: u8, value: u32) -> Result<(), DI::Error> {
        self.stream_interrupted();
        self.di.write_register32(register, value)
    }

    pub fn set_registers8(&mut self, table: &[(u8, u8)]) -> Result<(), DI::Error> {
        self.stream_interrupted();
        self.di.set_registers8(table)
    }

    /// Releases the display interface, model instance, and reset pin.
    pub fn release(self) -> (DI, M, Option<RST>) {
        (self.di, self.model, self.rst)
    }

    /// Returns a mutable reference to the underlying display interface for sending raw commands.
    ///
    /// # Safety
    ///
    /// The driver forgets the window and stream state and the overdraw run memory;
    /// the caller must not leave a pixel stream half-written.
    pub unsafe fn raw_interface_mut(&mut self) -> &mut DI {
        self.state = BusState::Idle;
        self.overdraw.clear();
        &mut self.di
    }
}
