/// Bus delay calibration for the target MCU clock.
///
/// Delays are specified in nanoseconds and rounded up to whole cycles of the target
/// clock, so a port to another clock speed only needs a different `clock_hz`. A
/// wrong calibration shows up as corrupted read-back data, it is never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// Target clock frequency in Hz.
    pub clock_hz: u32,
    /// Minimum time between RD going active and sampling the data lines.
    pub read_settle_ns: u32,
    /// Time WR is held active before the latching edge. Zero means no explicit delay.
    pub write_pulse_ns: u32,
}

impl BusTiming {
    /// Clock rate the default settle budget was measured at.
    pub const REFERENCE_CLOCK_HZ: u32 = 16_000_000;

    /// Minimum read settle time budget.
    pub const READ_SETTLE_NS: u32 = 400;

    /// Default timing for a target running at `clock_hz`.
    pub const fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            read_settle_ns: Self::READ_SETTLE_NS,
            write_pulse_ns: 0,
        }
    }

    /// Timing at the reference clock.
    pub const fn reference() -> Self {
        Self::new(Self::REFERENCE_CLOCK_HZ)
    }

    #[must_use]
    pub const fn read_settle(mut self, ns: u32) -> Self {
        self.read_settle_ns = ns;
        self
    }

    #[must_use]
    pub const fn write_pulse(mut self, ns: u32) -> Self {
        self.write_pulse_ns = ns;
        self
    }

    /// Number of whole clock cycles covering `ns` nanoseconds.
    pub const fn cycles(&self, ns: u32) -> u32 {
        let scaled = ns as u64 * self.clock_hz as u64;
        scaled.div_ceil(1_000_000_000) as u32
    }

    /// Duration of `cycles` clock cycles in nanoseconds, rounded up.
    pub const fn cycles_to_ns(&self, cycles: u32) -> u32 {
        if self.clock_hz == 0 {
            return 0;
        }
        let scaled = cycles as u64 * 1_000_000_000;
        scaled.div_ceil(self.clock_hz as u64) as u32
    }

    /// Cycles to wait between RD active and sampling.
    pub const fn read_settle_cycles(&self) -> u32 {
        self.cycles(self.read_settle_ns)
    }

    /// Cycles to hold WR active.
    pub const fn write_pulse_cycles(&self) -> u32 {
        self.cycles(self.write_pulse_ns)
    }
}

impl Default for BusTiming {
    fn default() -> Self {
        Self::reference()
    }
}
