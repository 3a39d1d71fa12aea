//! YM2612 (OPN2) register helpers

/// NTSC Genesis clock (53.693175 MHz / 7)
pub const CLOCK_NTSC: u32 = 7_670_453;
/// PAL Mega Drive clock (53.203424 MHz / 7)
pub const CLOCK_PAL: u32 = 7_600_489;

/// Key on/off register (port 0)
pub const REG_KEY_ON: u8 = 0x28;
/// DAC data register (port 0)
pub const REG_DAC_DATA: u8 = 0x2A;
/// DAC enable register, bit 7 (port 0)
pub const REG_DAC_ENABLE: u8 = 0x2B;

/// Number of FM channels
pub const CHANNELS: u8 = 6;

/// Channel select value for the key on/off register.
///
/// Channels 0-2 map to 0-2 and channels 3-5 to 4-6; bit 2 selects the
/// second channel group.
pub fn key_channel(channel: u8) -> u8 {
    if channel < 3 {
        channel
    } else {
        channel + 1
    }
}
