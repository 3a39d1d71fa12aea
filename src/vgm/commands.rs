//! VGM command opcodes and operand lengths

/// VGM command opcodes handled by the interpreter
pub mod opcode {
    pub const GG_STEREO: u8 = 0x4F;
    pub const SN76489: u8 = 0x50;
    pub const YM2612_PORT0: u8 = 0x52;
    pub const YM2612_PORT1: u8 = 0x53;
    pub const WAIT_NNNN: u8 = 0x61;
    pub const WAIT_60TH: u8 = 0x62;
    pub const WAIT_50TH: u8 = 0x63;
    pub const END: u8 = 0x66;
    pub const DATA_BLOCK: u8 = 0x67;
    pub const PCM_RAM_WRITE: u8 = 0x68;
    /// Wait n+1 samples (0x70-0x7F)
    pub const WAIT_N_BASE: u8 = 0x70;
    /// YM2612 DAC write from the PCM bank, then wait n (0x80-0x8F)
    pub const YM2612_DAC_BASE: u8 = 0x80;
    pub const DAC_STREAM_SETUP: u8 = 0x90;
    pub const DAC_STREAM_DATA: u8 = 0x91;
    pub const DAC_STREAM_FREQ: u8 = 0x92;
    pub const DAC_STREAM_START: u8 = 0x93;
    pub const DAC_STREAM_STOP: u8 = 0x94;
    pub const DAC_STREAM_FAST: u8 = 0x95;
    pub const SEEK_PCM: u8 = 0xE0;
}

/// Samples in a 1/60 second wait
pub const SAMPLES_60TH: u32 = 735;
/// Samples in a 1/50 second wait
pub const SAMPLES_50TH: u32 = 882;

/// Data block type carrying YM2612 PCM samples
pub const BLOCK_TYPE_YM2612_PCM: u8 = 0x00;

/// High bit of a data block size flags the second chip
pub const BLOCK_SIZE_MASK: u32 = 0x7FFF_FFFF;

/// Operand bytes to skip after an opcode the interpreter does not execute.
///
/// Opcodes without a known length return 0 and are consumed alone.
pub fn skip_length(op: u8) -> usize {
    match op {
        // Reserved, one operand
        0x30..=0x3F | opcode::GG_STEREO => 1,
        // Reserved, two operands
        0x40..=0x4E => 2,
        // Register writes to chips other than the PSG and the YM2612
        0x51 | 0x54..=0x5F | 0xA0..=0xBF => 2,
        0xC0..=0xDF => 3,
        0xE1..=0xFF => 4,
        opcode::PCM_RAM_WRITE => 11,
        opcode::DAC_STREAM_SETUP => 4,
        opcode::DAC_STREAM_DATA => 4,
        opcode::DAC_STREAM_FREQ => 5,
        opcode::DAC_STREAM_START => 10,
        opcode::DAC_STREAM_STOP => 1,
        opcode::DAC_STREAM_FAST => 4,
        _ => 0,
    }
}
