//! Display models.

use embedded_hal_async::delay::DelayNs;

use crate::{interface::Interface, ConfigurationError};

mod ili9341;

pub use ili9341::*;

/// Display model.
pub trait Model {
    /// The framebuffer size in pixels as (width, height).
    const FRAMEBUFFER_SIZE: (u16, u16);

    /// Duration of the active low reset pulse in µs.
    const RESET_DURATION: u32 = 10;

    /// Brings the controller from reset into 16-bit pixel mode with the display on.
    async fn init<DELAY, DI>(
        &mut self,
        di: &mut DI,
        delay: &mut DELAY,
    ) -> Result<(), ModelInitError<DI::Error>>
    where
        DELAY: DelayNs,
        DI: Interface;
}

/// Error returned by [`Model::init`].
///
/// This error type is used internally by implementations of the [`Model`]
/// trait.
#[derive(Debug)]
pub enum ModelInitError<DiError> {
    /// Error caused by the display interface.
    Interface(DiError),

    /// Invalid configuration error.
    ///
    /// This error is returned when the model can't be driven through the given
    /// interface kind.
    InvalidConfiguration(ConfigurationError),
}

impl<DiError> From<DiError> for ModelInitError<DiError> {
    fn from(value: DiError) -> Self {
        Self::Interface(value)
    }
}
