//! VGM header layout and parsing

use crate::error::{Error, Result};
use serde::Serialize;

/// "Vgm " read as a little-endian u32
pub const VGM_MAGIC: u32 = 0x206D_6756;

/// Size of the base header every version carries
pub const VGM_BASE_HEADER_SIZE: usize = 0x40;

/// Data start for files older than 1.50 (or with a zero data offset field)
pub const VGM_LEGACY_DATA_OFFSET: u32 = 0x40;

/// First version with a data offset field
pub const VGM_VERSION_DATA_OFFSET: u32 = 0x150;

/// VGM header offsets (in bytes)
pub mod offset {
    /// "Vgm " identifier
    pub const IDENT: usize = 0x00;
    /// End of file offset (relative to 0x04)
    pub const EOF_OFFSET: usize = 0x04;
    /// Version number (BCD)
    pub const VERSION: usize = 0x08;
    /// SN76489 clock
    pub const SN76489_CLOCK: usize = 0x0C;
    /// YM2413 clock
    pub const YM2413_CLOCK: usize = 0x10;
    /// GD3 offset (relative to 0x14)
    pub const GD3_OFFSET: usize = 0x14;
    /// Total samples
    pub const TOTAL_SAMPLES: usize = 0x18;
    /// Loop offset (relative to 0x1C)
    pub const LOOP_OFFSET: usize = 0x1C;
    /// Loop samples
    pub const LOOP_SAMPLES: usize = 0x20;
    /// Recording rate
    pub const RATE: usize = 0x24;
    /// YM2612 clock
    pub const YM2612_CLOCK: usize = 0x2C;
    /// YM2151 clock
    pub const YM2151_CLOCK: usize = 0x30;
    /// VGM data offset (relative to 0x34)
    pub const DATA_OFFSET: usize = 0x34;
}

/// Parsed VGM header.
///
/// Offsets are absolute byte positions from the start of the log. A
/// `loop_offset` of 0 means the log has no loop point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VgmHeader {
    pub version: u32,
    pub eof_offset: u32,
    pub gd3_offset: u32,
    pub sn76489_clock: u32,
    pub ym2413_clock: u32,
    pub ym2612_clock: u32,
    pub ym2151_clock: u32,
    pub total_samples: u32,
    pub loop_offset: u32,
    pub loop_samples: u32,
    pub rate: u32,
    pub data_offset: u32,
}

fn u32_at(bytes: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

/// Resolve a field stored relative to its own position; 0 stays 0
fn relative(field_pos: usize, value: u32) -> u32 {
    if value == 0 {
        0
    } else {
        (field_pos as u32).wrapping_add(value)
    }
}

impl VgmHeader {
    /// Parse the base header.
    ///
    /// `stream_len` is the total length of the log and is used to validate the
    /// data and loop offsets. A loop offset outside `[data_offset, stream_len)`
    /// is dropped with a warning rather than rejected.
    pub fn parse(bytes: &[u8], stream_len: u64) -> Result<Self> {
        if bytes.len() >= 4 {
            let magic = u32_at(bytes, offset::IDENT);
            if magic != VGM_MAGIC {
                return Err(Error::InvalidMagic(magic));
            }
        }
        if bytes.len() < VGM_BASE_HEADER_SIZE {
            return Err(Error::HeaderTooShort(bytes.len()));
        }

        let version = u32_at(bytes, offset::VERSION);
        let data_offset = match u32_at(bytes, offset::DATA_OFFSET) {
            rel if version >= VGM_VERSION_DATA_OFFSET && rel != 0 => {
                (offset::DATA_OFFSET as u32).checked_add(rel).ok_or_else(|| {
                    Error::MalformedHeader(format!("data offset {:#x} overflows", rel))
                })?
            }
            _ => VGM_LEGACY_DATA_OFFSET,
        };
        if (data_offset as usize) < VGM_BASE_HEADER_SIZE {
            return Err(Error::MalformedHeader(format!(
                "data offset {:#x} lies inside the header",
                data_offset
            )));
        }
        if data_offset as u64 > stream_len {
            return Err(Error::MalformedHeader(format!(
                "data offset {:#x} past end of stream ({} bytes)",
                data_offset, stream_len
            )));
        }

        let mut loop_offset = relative(offset::LOOP_OFFSET, u32_at(bytes, offset::LOOP_OFFSET));
        if loop_offset != 0 && (loop_offset < data_offset || loop_offset as u64 >= stream_len) {
            tracing::warn!(
                "ignoring loop offset {:#x} outside data region {:#x}..{:#x}",
                loop_offset,
                data_offset,
                stream_len
            );
            loop_offset = 0;
        }

        Ok(Self {
            version,
            eof_offset: relative(offset::EOF_OFFSET, u32_at(bytes, offset::EOF_OFFSET)),
            gd3_offset: relative(offset::GD3_OFFSET, u32_at(bytes, offset::GD3_OFFSET)),
            sn76489_clock: u32_at(bytes, offset::SN76489_CLOCK),
            ym2413_clock: u32_at(bytes, offset::YM2413_CLOCK),
            ym2612_clock: u32_at(bytes, offset::YM2612_CLOCK),
            ym2151_clock: u32_at(bytes, offset::YM2151_CLOCK),
            total_samples: u32_at(bytes, offset::TOTAL_SAMPLES),
            loop_offset,
            loop_samples: u32_at(bytes, offset::LOOP_SAMPLES),
            rate: u32_at(bytes, offset::RATE),
            data_offset,
        })
    }

    pub fn has_sn76489(&self) -> bool {
        self.sn76489_clock != 0
    }

    pub fn has_ym2612(&self) -> bool {
        self.ym2612_clock != 0
    }

    /// A loop point exists and covers at least one sample
    pub fn has_loop(&self) -> bool {
        self.loop_offset != 0 && self.loop_samples > 0
    }

    /// Version as "major.minor" (e.g. "1.50")
    pub fn version_string(&self) -> String {
        format!("{:x}.{:02x}", self.version >> 8, self.version & 0xFF)
    }
}
