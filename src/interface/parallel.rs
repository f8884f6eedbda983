use embedded_hal::{delay::DelayNs, digital::OutputPin};

use super::{BusTiming, Interface, InterfaceKind};

/// Direction of the data lines as seen from the MCU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Output,
    Input,
}

/// Byte-wide bidirectional data lines.
///
/// This is the platform seam: an implementation maps the eight data lines onto its
/// GPIO banks. Implementations sharing a bank with other I/O must not be driven from
/// anywhere else while a transaction is in flight, see
/// [`CriticalSectionInterface`](super::CriticalSectionInterface).
pub trait DataBus {
    type Error: core::fmt::Debug;

    /// Drives `byte` onto the data lines. Only valid in [`Direction::Output`].
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Samples the data lines. Only valid in [`Direction::Input`].
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Switches the data lines between driving and sampling.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;
}

/// Parallel interface error
#[derive(Clone, Copy, Debug)]
pub enum ParallelError<BUS, DC, WR, RD> {
    Bus(BUS),
    Dc(DC),
    Wr(WR),
    Rd(RD),
}

/// 8080-style 8-bit parallel interface.
///
/// `DC` selects command (low) or data (high), `WR` latches on its rising edge, `RD`
/// presents read data while low. Chip select is expected to be held active.
pub struct ParallelInterface<BUS, DC, WR, RD, DELAY> {
    bus: BUS,
    dc: DC,
    wr: WR,
    rd: RD,
    delay: DELAY,
    timing: BusTiming,
}

type Error<BUS, DC, WR, RD> = ParallelError<
    <BUS as DataBus>::Error,
    <DC as embedded_hal::digital::ErrorType>::Error,
    <WR as embedded_hal::digital::ErrorType>::Error,
    <RD as embedded_hal::digital::ErrorType>::Error,
>;

impl<BUS, DC, WR, RD, DELAY> ParallelInterface<BUS, DC, WR, RD, DELAY>
where
    BUS: DataBus,
    DC: OutputPin,
    WR: OutputPin,
    RD: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(bus: BUS, dc: DC, wr: WR, rd: RD, delay: DELAY, timing: BusTiming) -> Self {
        Self {
            bus,
            dc,
            wr,
            rd,
            delay,
            timing,
        }
    }

    pub fn timing(&self) -> BusTiming {
        self.timing
    }

    pub fn release(self) -> (BUS, DC, WR, RD, DELAY) {
        (self.bus, self.dc, self.wr, self.rd, self.delay)
    }

    fn strobe(&mut self) -> Result<(), Error<BUS, DC, WR, RD>> {
        self.wr.set_low().map_err(ParallelError::Wr)?;
        let pulse = self.timing.write_pulse_cycles();
        if pulse > 0 {
            self.delay.delay_ns(self.timing.cycles_to_ns(pulse));
        }
        self.wr.set_high().map_err(ParallelError::Wr)
    }

    fn send_word(&mut self, word: u8) -> Result<(), Error<BUS, DC, WR, RD>> {
        self.bus.write_byte(word).map_err(ParallelError::Bus)?;
        self.strobe()
    }
}

impl<BUS, DC, WR, RD, DELAY> Interface for ParallelInterface<BUS, DC, WR, RD, DELAY>
where
    BUS: DataBus,
    DC: OutputPin,
    WR: OutputPin,
    RD: OutputPin,
    DELAY: DelayNs,
{
    type Error = Error<BUS, DC, WR, RD>;

    const KIND: InterfaceKind = InterfaceKind::Parallel8Bit;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.dc.set_low().map_err(ParallelError::Dc)?;
        self.send_word(command)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(ParallelError::Dc)?;
        for &word in data {
            self.send_word(word)?;
        }
        Ok(())
    }

    fn send_repeated(&mut self, byte: u8, count: u32) -> Result<(), Self::Error> {
        if count == 0 {
            return Ok(());
        }
        self.dc.set_high().map_err(ParallelError::Dc)?;
        self.bus.write_byte(byte).map_err(ParallelError::Bus)?;
        for _ in 0..count {
            self.strobe()?;
        }
        Ok(())
    }

    fn read_data(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        if buffer.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(ParallelError::Dc)?;
        let settle = self.timing.cycles_to_ns(self.timing.read_settle_cycles());

        let mut session = ReadSession::begin(&mut self.bus).map_err(ParallelError::Bus)?;
        for byte in buffer.iter_mut() {
            self.rd.set_low().map_err(ParallelError::Rd)?;
            self.delay.delay_ns(settle);
            *byte = session.sample().map_err(ParallelError::Bus)?;
            self.rd.set_high().map_err(ParallelError::Rd)?;
        }
        session.finish().map_err(ParallelError::Bus)
    }
}

/// Data lines switched to input for the lifetime of the session.
///
/// Dropping the session restores output mode on every exit path. [`Self::finish`]
/// does the same but reports a failure to switch back.
struct ReadSession<'a, BUS: DataBus> {
    bus: &'a mut BUS,
    restored: bool,
}

impl<'a, BUS: DataBus> ReadSession<'a, BUS> {
    fn begin(bus: &'a mut BUS) -> Result<Self, BUS::Error> {
        bus.set_direction(Direction::Input)?;
        Ok(Self {
            bus,
            restored: false,
        })
    }

    fn sample(&mut self) -> Result<u8, BUS::Error> {
        self.bus.read_byte()
    }

    fn finish(mut self) -> Result<(), BUS::Error> {
        self.restored = true;
        self.bus.set_direction(Direction::Output)
    }
}

impl<BUS: DataBus> Drop for ReadSession<'_, BUS> {
    fn drop(&mut self) {
        if !self.restored {
            // error paths already carry the original failure
            let _ = self.bus.set_direction(Direction::Output);
        }
    }
}
