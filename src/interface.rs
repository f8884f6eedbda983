//! Bus transport to the display controller.

mod parallel;
pub use parallel::*;

mod shared;
pub use shared::*;

mod timing;
pub use timing::*;

/// Command and data transport to the controller.
///
/// Every method is a complete, blocking bus transaction: none of them return with the
/// bus left half-way through a strobe, and none of them yield.
pub trait Interface {
    /// Error type
    type Error: core::fmt::Debug;

    /// Kind of interface
    const KIND: InterfaceKind;

    /// Sends a single command byte (DC low).
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Sends payload bytes (DC high), one write strobe per byte.
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Places `byte` on the bus once and strobes it `count` times.
    ///
    /// This performs no new framing, it only repeats the data phase. Interfaces that
    /// can't hold a value on the bus fall back to sending the byte `count` times.
    fn send_repeated(&mut self, byte: u8, count: u32) -> Result<(), Self::Error> {
        for _ in 0..count {
            self.send_data(&[byte])?;
        }
        Ok(())
    }

    /// Reads `buffer.len()` bytes from the controller.
    ///
    /// The matching read command (`0x2E`/`0x3E`) must have been sent before. The bus is
    /// back in write mode when this returns, on success as well as on error.
    fn read_data(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: Interface + ?Sized> Interface for &mut T {
    type Error = T::Error;
    const KIND: InterfaceKind = T::KIND;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        T::send_command(self, command)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::send_data(self, data)
    }

    fn send_repeated(&mut self, byte: u8, count: u32) -> Result<(), Self::Error> {
        T::send_repeated(self, byte, count)
    }

    fn read_data(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        T::read_data(self, buffer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum InterfaceKind {
    Parallel8Bit,
}
