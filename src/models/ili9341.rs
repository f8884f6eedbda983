use embedded_hal_async::delay::DelayNs;

use crate::{
    dcs::{ExitSleepMode, InterfaceExt, SetAddressMode, SetDisplayOn, SetPixelFormat},
    interface::{Interface, InterfaceKind},
    models::{Model, ModelInitError},
    ConfigurationError,
};

const DISPLAY_OFF: u8 = 0x28;
const POWER_CONTROL_1: u8 = 0xC0;
const POWER_CONTROL_2: u8 = 0xC1;
const VCOM_CONTROL_1: u8 = 0xC5;
const VCOM_CONTROL_2: u8 = 0xC7;
const FRAME_CONTROL: u8 = 0xB1;
const ENTRY_MODE: u8 = 0xB7;

/// Row address order bottom to top, BGR panel.
const MADCTL_MY_BGR: u8 = 0x88;

/// ILI9341 display in Rgb565 color mode, portrait.
pub struct ILI9341;

impl Model for ILI9341 {
    const FRAMEBUFFER_SIZE: (u16, u16) = (240, 320);

    async fn init<DELAY, DI>(
        &mut self,
        di: &mut DI,
        delay: &mut DELAY,
    ) -> Result<(), ModelInitError<DI::Error>>
    where
        DELAY: DelayNs,
        DI: Interface,
    {
        if !matches!(DI::KIND, InterfaceKind::Parallel8Bit) {
            return Err(ModelInitError::InvalidConfiguration(
                ConfigurationError::UnsupportedInterface,
            ));
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("ILI9341 init");

        di.send_command(DISPLAY_OFF)?;
        di.set_registers8(&[(POWER_CONTROL_1, 0x23), (POWER_CONTROL_2, 0x10)])?;
        di.send_command(VCOM_CONTROL_1)?;
        di.send_data(&[0x2B, 0x2B])?;
        di.write_register8(VCOM_CONTROL_2, 0xC0)?;
        di.write_command(SetAddressMode(MADCTL_MY_BGR))?;
        di.write_command(SetPixelFormat::RGB565)?;
        di.send_command(FRAME_CONTROL)?;
        di.send_data(&[0x00, 0x1B])?;
        di.write_register8(ENTRY_MODE, 0x07)?;

        di.write_command(ExitSleepMode)?;
        delay.delay_ms(150).await;
        di.write_command(SetDisplayOn)?;
        delay.delay_ms(120).await;

        Ok(())
    }
}
