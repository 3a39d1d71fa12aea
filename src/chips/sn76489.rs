//! SN76489 (PSG) register helpers

/// NTSC master clock
pub const CLOCK_NTSC: u32 = 3_579_545;
/// PAL master clock
pub const CLOCK_PAL: u32 = 3_546_895;

/// Latch bit plus volume-type bit: set on attenuation writes
pub const LATCH_VOLUME: u8 = 0x90;
/// Attenuation nibble (0 = loudest, 15 = off)
pub const ATTENUATION_MASK: u8 = 0x0F;
/// Maximum attenuation (channel off)
pub const ATTENUATION_OFF: u8 = 0x0F;

/// Number of channels (3 tone + 1 noise)
pub const CHANNELS: u8 = 4;

/// Attenuation offset applied to PSG volumes when the FM chip is also
/// playing, matching the reference hardware mix
pub const FM_MIX_ATTENUATION: u8 = 2;

/// Highest attenuation that still receives the FM mix offset
const FM_MIX_LIMIT: u8 = 13;

/// Check whether a PSG byte is a latched volume write
pub fn is_volume_write(value: u8) -> bool {
    value & LATCH_VOLUME == LATCH_VOLUME
}

/// Apply the FM-mix offset to a latched volume write.
///
/// Attenuations up to 13 are raised by 2; 14 and 15 pass through. Any other
/// PSG byte is returned unchanged.
pub fn bias_volume(value: u8) -> u8 {
    if !is_volume_write(value) {
        return value;
    }
    let atten = value & ATTENUATION_MASK;
    if atten <= FM_MIX_LIMIT {
        (value & !ATTENUATION_MASK) | (atten + FM_MIX_ATTENUATION)
    } else {
        value
    }
}

/// Latched full-attenuation byte for `channel` (0-3)
pub fn silence_command(channel: u8) -> u8 {
    LATCH_VOLUME | ((channel & 0x03) << 5) | ATTENUATION_OFF
}
