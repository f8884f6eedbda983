use super::{Interface, InterfaceKind};

/// Runs every bus transaction inside a critical section.
///
/// Use this when the display's GPIO banks are shared with code that may run from an
/// interrupt handler or another task: a command, data or read cycle interrupted by
/// another writer to the same lines corrupts the framing. Each method of
/// [`Interface`] is one transaction, so a long flood is split into many short
/// critical sections instead of blocking interrupts for the whole fill.
pub struct CriticalSectionInterface<DI> {
    inner: DI,
}

impl<DI: Interface> CriticalSectionInterface<DI> {
    pub fn new(inner: DI) -> Self {
        Self { inner }
    }

    pub fn release(self) -> DI {
        self.inner
    }
}

impl<DI: Interface> Interface for CriticalSectionInterface<DI> {
    type Error = DI::Error;

    const KIND: InterfaceKind = DI::KIND;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        critical_section::with(|_| self.inner.send_command(command))
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        critical_section::with(|_| self.inner.send_data(data))
    }

    fn send_repeated(&mut self, byte: u8, count: u32) -> Result<(), Self::Error> {
        critical_section::with(|_| self.inner.send_repeated(byte, count))
    }

    fn read_data(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        critical_section::with(|_| self.inner.read_data(buffer))
    }
}
