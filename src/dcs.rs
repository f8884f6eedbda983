//! Controller commands and register programming.
//!
//! Each command is a plain value that encodes to a [`Frame`]: one command byte
//! followed by up to four parameter bytes, multi-byte values high byte first.
//! Encoding is independent of any transport, [`InterfaceExt::write_command`] puts a
//! frame on the bus.

use crate::interface::Interface;

/// Set column address window.
pub const SET_COLUMN_ADDRESS: u8 = 0x2A;
/// Set row (page) address window.
pub const SET_ROW_ADDRESS: u8 = 0x2B;
/// Begin pixel data write at the window start.
pub const WRITE_MEMORY_START: u8 = 0x2C;
/// Begin pixel data read at the window start.
pub const READ_MEMORY_START: u8 = 0x2E;
/// Continue pixel data read after the last pixel read.
pub const READ_MEMORY_CONTINUE: u8 = 0x3E;

pub const SOFT_RESET: u8 = 0x01;
pub const EXIT_SLEEP_MODE: u8 = 0x11;
pub const SET_DISPLAY_ON: u8 = 0x29;
pub const SET_ADDRESS_MODE: u8 = 0x36;
pub const SET_PIXEL_FORMAT: u8 = 0x3A;

/// Encoded command: instruction byte plus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    instruction: u8,
    params: [u8; 4],
    len: usize,
}

impl Frame {
    pub fn instruction(&self) -> u8 {
        self.instruction
    }

    pub fn params(&self) -> &[u8] {
        &self.params[..self.len]
    }
}

/// A command that can be sent to the controller.
pub trait DcsCommand {
    /// Instruction byte.
    fn instruction(&self) -> u8;

    /// Writes the parameters into `buffer` and returns how many were written.
    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize;

    /// Encodes the command without touching any bus.
    fn frame(&self) -> Frame {
        let mut params = [0; 4];
        let len = self.fill_params_buf(&mut params);
        Frame {
            instruction: self.instruction(),
            params,
            len,
        }
    }
}

macro_rules! dcs_basic_command {
    (#[$meta:meta] $name:ident, $instr:expr) => {
        #[$meta]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl DcsCommand for $name {
            fn instruction(&self) -> u8 {
                $instr
            }

            fn fill_params_buf(&self, _buffer: &mut [u8]) -> usize {
                0
            }
        }
    };
}

dcs_basic_command!(
    /// Begin pixel data write.
    WriteMemoryStart,
    WRITE_MEMORY_START
);
dcs_basic_command!(
    /// Begin pixel data read.
    ReadMemoryStart,
    READ_MEMORY_START
);
dcs_basic_command!(
    /// Continue a pixel data read.
    ReadMemoryContinue,
    READ_MEMORY_CONTINUE
);
dcs_basic_command!(
    /// Software reset.
    SoftReset,
    SOFT_RESET
);
dcs_basic_command!(
    /// Leave sleep mode.
    ExitSleepMode,
    EXIT_SLEEP_MODE
);
dcs_basic_command!(
    /// Turn the panel on.
    SetDisplayOn,
    SET_DISPLAY_ON
);

/// One axis of the address window.
///
/// Without an end only the start address is sent and the controller keeps the
/// previous end address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressRange {
    start: u16,
    end: Option<u16>,
}

impl AddressRange {
    fn fill(&self, buffer: &mut [u8]) -> usize {
        buffer[0..2].copy_from_slice(&self.start.to_be_bytes());
        match self.end {
            Some(end) => {
                buffer[2..4].copy_from_slice(&end.to_be_bytes());
                4
            }
            None => 2,
        }
    }
}

/// Column window, `0x2A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetColumnAddress(AddressRange);

impl SetColumnAddress {
    pub const fn new(start: u16, end: u16) -> Self {
        Self(AddressRange {
            start,
            end: Some(end),
        })
    }

    pub const fn start(start: u16) -> Self {
        Self(AddressRange { start, end: None })
    }
}

impl DcsCommand for SetColumnAddress {
    fn instruction(&self) -> u8 {
        SET_COLUMN_ADDRESS
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        self.0.fill(buffer)
    }
}

/// Row window, `0x2B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetRowAddress(AddressRange);

impl SetRowAddress {
    pub const fn new(start: u16, end: u16) -> Self {
        Self(AddressRange {
            start,
            end: Some(end),
        })
    }

    pub const fn start(start: u16) -> Self {
        Self(AddressRange { start, end: None })
    }
}

impl DcsCommand for SetRowAddress {
    fn instruction(&self) -> u8 {
        SET_ROW_ADDRESS
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        self.0.fill(buffer)
    }
}

/// Memory access control (MADCTL).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetAddressMode(pub u8);

impl DcsCommand for SetAddressMode {
    fn instruction(&self) -> u8 {
        SET_ADDRESS_MODE
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        buffer[0] = self.0;
        1
    }
}

/// Interface pixel format (COLMOD).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetPixelFormat(u8);

impl SetPixelFormat {
    /// 16 bits per pixel on both the RGB and the MCU interface.
    pub const RGB565: Self = Self(0x55);

    pub const fn new(format: u8) -> Self {
        Self(format)
    }
}

impl DcsCommand for SetPixelFormat {
    fn instruction(&self) -> u8 {
        SET_PIXEL_FORMAT
    }

    fn fill_params_buf(&self, buffer: &mut [u8]) -> usize {
        buffer[0] = self.0;
        1
    }
}

/// Command and register programming on top of any [`Interface`].
pub trait InterfaceExt: Interface {
    fn write_command(&mut self, command: impl DcsCommand) -> Result<(), Self::Error> {
        let frame = command.frame();
        self.send_command(frame.instruction())?;
        if !frame.params().is_empty() {
            self.send_data(frame.params())?;
        }
        Ok(())
    }

    fn write_register8(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.send_command(register)?;
        self.send_data(&[value])
    }

    /// Controllers with 16-bit register addresses take both address bytes as commands.
    fn write_register16(&mut self, register: u16, value: u16) -> Result<(), Self::Error> {
        let [reg_hi, reg_lo] = register.to_be_bytes();
        self.send_command(reg_hi)?;
        self.send_command(reg_lo)?;
        self.send_data(&value.to_be_bytes())
    }

    fn write_register24(&mut self, register: u8, value: u32) -> Result<(), Self::Error> {
        self.send_command(register)?;
        self.send_data(&value.to_be_bytes()[1..])
    }

    fn write_register32(&mut self, register: u8, value: u32) -> Result<(), Self::Error> {
        self.send_command(register)?;
        self.send_data(&value.to_be_bytes())
    }

    /// Writes the high byte of `value` to `reg_hi` and the low byte to `reg_lo`.
    fn write_register_pair(
        &mut self,
        reg_hi: u8,
        reg_lo: u8,
        value: u16,
    ) -> Result<(), Self::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.write_register8(reg_hi, hi)?;
        self.write_register8(reg_lo, lo)
    }

    /// Writes a table of `(register, value)` pairs in order.
    fn set_registers8(&mut self, table: &[(u8, u8)]) -> Result<(), Self::Error> {
        for &(register, value) in table {
            self.write_register8(register, value)?;
        }
        Ok(())
    }
}

impl<T: Interface + ?Sized> InterfaceExt for T {}
