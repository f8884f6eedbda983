//! [super::Display] builder module

use embedded_hal::digital::{self, OutputPin};
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use crate::{
    compositing::Compositing,
    dcs::{InterfaceExt, SoftReset},
    interface::Interface,
    models::{Model, ModelInitError},
    window::Window,
    Display,
};

/// Builder for [Display] instances.
///
/// Exposes all possible display options.
///
/// # Examples
///
/// ```ignore
/// use tftlcd::{compositing::Compositing, models::ILI9341, Builder};
///
/// let mut display = Builder::new(ILI9341, di)
///     .reset_pin(rst)
///     .compositing(Compositing::new().overdraw_on())
///     .init(&mut delay)
///     .await?;
/// ```
pub struct Builder<DI, MODEL, RST>
where
    DI: Interface,
    MODEL: Model,
{
    di: DI,
    model: MODEL,
    rst: Option<RST>,
    compositing: Compositing,
}

impl<DI, MODEL> Builder<DI, MODEL, NoResetPin>
where
    DI: Interface,
    MODEL: Model,
{
    /// Constructs a new builder for given [Model].
    #[must_use]
    pub fn new(model: MODEL, di: DI) -> Self {
        Self {
            di,
            model,
            rst: None,
            compositing: Compositing::new(),
        }
    }
}

impl<DI, MODEL, RST> Builder<DI, MODEL, RST>
where
    DI: Interface,
    MODEL: Model,
    RST: OutputPin,
{
    /// Sets the compositing mode the display starts with.
    #[must_use]
    pub fn compositing(mut self, compositing: Compositing) -> Self {
        self.compositing = compositing;
        self
    }

    /// Sets the reset pin.
    ///
    /// Without a reset pin the display is reset with a software reset command.
    #[must_use]
    pub fn reset_pin<RST2: OutputPin>(self, rst: RST2) -> Builder<DI, MODEL, RST2> {
        Builder {
            di: self.di,
            model: self.model,
            rst: Some(rst),
            compositing: self.compositing,
        }
    }

    /// Consumes the builder to create a new [Display] with an optional reset [OutputPin].
    /// Blocks using the provided delay source until the display is ready.
    pub async fn init(
        mut self,
        delay_source: &mut impl AsyncDelayNs,
    ) -> Result<Display<DI, MODEL, RST>, InitError<DI::Error, RST::Error>> {
        let (width, height) = MODEL::FRAMEBUFFER_SIZE;
        if width == 0 || height == 0 {
            return Err(InitError::InvalidConfiguration(
                ConfigurationError::InvalidDisplaySize,
            ));
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("display init, {=u16}x{=u16}", width, height);

        if let Some(ref mut rst_pin) = self.rst {
            rst_pin.set_low().map_err(InitError::ResetPin)?;
            delay_source.delay_us(MODEL::RESET_DURATION).await;
            rst_pin.set_high().map_err(InitError::ResetPin)?;
            delay_source.delay_us(10_000).await;
        } else {
            self.di
                .write_command(SoftReset)
                .map_err(InitError::Interface)?;
            delay_source.delay_us(50_000).await;
        }

        self.model.init(&mut self.di, delay_source).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("display ready");

        let mut display = Display::new(self.di, self.model, self.rst, self.compositing);
        display
            .open_window(Window::full(MODEL::FRAMEBUFFER_SIZE))
            .map_err(InitError::Interface)?;
        Ok(display)
    }
}

/// Error returned by [`Builder::init`].
#[derive(Debug)]
pub enum InitError<DiError, PinError> {
    /// Error caused by the display interface.
    Interface(DiError),

    /// Error caused by the reset pin's
    /// [`OutputPin`](embedded_hal::digital::OutputPin) implementation.
    ResetPin(PinError),

    /// Invalid configuration error.
    ///
    /// This error is returned when the configuration passed to the builder is
    /// invalid. For example, when the model's size is zero.
    InvalidConfiguration(ConfigurationError),
}

/// Specifics of [InitError::InvalidConfiguration] if configuration was found invalid
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Unsupported interface kind.
    ///
    /// The chosen interface isn't supported by the selected model.
    UnsupportedInterface,
    /// Invalid display size
    ///
    /// The model's framebuffer has a zero dimension.
    InvalidDisplaySize,
}

impl<DiError, PinError> From<ModelInitError<DiError>> for InitError<DiError, PinError> {
    fn from(value: ModelInitError<DiError>) -> Self {
        match value {
            ModelInitError::Interface(e) => Self::Interface(e),
            ModelInitError::InvalidConfiguration(ce) => Self::InvalidConfiguration(ce),
        }
    }
}

/// Marker type for no reset pin.
pub enum NoResetPin {}

impl digital::OutputPin for NoResetPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl digital::ErrorType for NoResetPin {
    type Error = core::convert::Infallible;
}
