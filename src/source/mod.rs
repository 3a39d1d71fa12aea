//! Byte sources for VGM command logs
//!
//! A source hands the interpreter raw bytes one read at a time. Two forms
//! exist: [`FileSource`] streams an uncompressed `.vgm` straight from disk,
//! and [`MemorySource`] holds the whole log in memory (a caller-supplied
//! buffer, or a `.vgz` inflated up front so it can still seek).
//!
//! Seek positions are relative to the data start recorded after the header
//! is parsed, so loop offsets translate directly.

pub mod file;
pub mod memory;

pub use file::FileSource;
pub use memory::MemorySource;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// gzip stream magic
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Check whether `data` starts with the gzip magic
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == GZIP_MAGIC
}

/// Sequential byte reader over a VGM log.
///
/// Reads never fail hard: short reads at end of data return fewer bytes, and
/// the fixed-width helpers return 0 (or `None` for the `try_` forms).
pub trait DataSource {
    /// Open the source. Opening an already open source is a no-op.
    fn open(&mut self) -> Result<()>;

    /// Release the underlying data. Safe to call repeatedly.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Read up to `count` bytes
    fn read(&mut self, count: usize) -> Vec<u8>;

    /// Next byte without advancing, `None` at end of data
    fn peek(&mut self) -> Option<u8>;

    /// Whether at least one more byte can be read
    fn available(&self) -> bool;

    /// Seek to `position` bytes past the data start
    fn seek(&mut self, _position: u64) -> bool {
        false
    }

    /// Whether `seek` is supported
    fn can_seek(&self) -> bool {
        false
    }

    /// Current position relative to the data start
    fn position(&self) -> u64 {
        0
    }

    /// Total size in bytes
    fn size(&self) -> u64 {
        0
    }

    /// Record the absolute offset that relative seeks are measured from
    fn set_data_start(&mut self, offset: u64);

    fn read_u8(&mut self) -> Option<u8> {
        self.read(1).first().copied()
    }

    fn try_read_u16_le(&mut self) -> Option<u16> {
        let bytes = self.read(2);
        Some(u16::from_le_bytes(bytes.as_slice().try_into().ok()?))
    }

    fn try_read_u32_le(&mut self) -> Option<u32> {
        let bytes = self.read(4);
        Some(u32::from_le_bytes(bytes.as_slice().try_into().ok()?))
    }

    /// Read a 16-bit little-endian value, 0 on short read
    fn read_u16_le(&mut self) -> u16 {
        self.try_read_u16_le().unwrap_or(0)
    }

    /// Read a 32-bit little-endian value, 0 on short read
    fn read_u32_le(&mut self) -> u32 {
        self.try_read_u32_le().unwrap_or(0)
    }

    /// Discard `count` bytes, returning how many were actually skipped
    fn skip(&mut self, count: usize) -> usize {
        self.read(count).len()
    }
}

/// What the caller asked to play
#[derive(Debug, Clone)]
pub enum Input {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Input::Path(path)
    }
}

impl From<&Path> for Input {
    fn from(path: &Path) -> Self {
        Input::Path(path.to_path_buf())
    }
}

impl From<&str> for Input {
    fn from(path: &str) -> Self {
        Input::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for Input {
    fn from(data: Vec<u8>) -> Self {
        Input::Bytes(data)
    }
}

impl From<&[u8]> for Input {
    fn from(data: &[u8]) -> Self {
        Input::Bytes(data.to_vec())
    }
}

/// The source forms a player can drive
#[derive(Debug)]
pub enum VgmSource {
    File(FileSource),
    Memory(MemorySource),
}

impl VgmSource {
    /// Pick the source form for an input.
    ///
    /// Paths ending in `.vgz`/`.gz` and buffers carrying the gzip magic are
    /// inflated into memory on open; everything else is read as-is.
    pub fn for_input(input: Input) -> Self {
        match input {
            Input::Path(path) => {
                let compressed = path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("vgz") || ext.eq_ignore_ascii_case("gz"))
                    .unwrap_or(false);
                if compressed {
                    VgmSource::Memory(MemorySource::gzip_file(path))
                } else {
                    VgmSource::File(FileSource::new(path))
                }
            }
            Input::Bytes(data) => {
                if is_gzip(&data) {
                    VgmSource::Memory(MemorySource::gzip_bytes(data))
                } else {
                    VgmSource::Memory(MemorySource::new(data))
                }
            }
        }
    }

    fn inner(&self) -> &dyn DataSource {
        match self {
            VgmSource::File(s) => s,
            VgmSource::Memory(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DataSource {
        match self {
            VgmSource::File(s) => s,
            VgmSource::Memory(s) => s,
        }
    }
}

impl DataSource for VgmSource {
    fn open(&mut self) -> Result<()> {
        self.inner_mut().open()
    }

    fn close(&mut self) {
        self.inner_mut().close()
    }

    fn is_open(&self) -> bool {
        self.inner().is_open()
    }

    fn read(&mut self, count: usize) -> Vec<u8> {
        self.inner_mut().read(count)
    }

    fn peek(&mut self) -> Option<u8> {
        self.inner_mut().peek()
    }

    fn available(&self) -> bool {
        self.inner().available()
    }

    fn seek(&mut self, position: u64) -> bool {
        self.inner_mut().seek(position)
    }

    fn can_seek(&self) -> bool {
        self.inner().can_seek()
    }

    fn position(&self) -> u64 {
        self.inner().position()
    }

    fn size(&self) -> u64 {
        self.inner().size()
    }

    fn set_data_start(&mut self, offset: u64) {
        self.inner_mut().set_data_start(offset)
    }

    fn skip(&mut self, count: usize) -> usize {
        self.inner_mut().skip(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(&[0x1F, 0x8B, 0x08]));
        assert!(!is_gzip(b"Vgm "));
        assert!(!is_gzip(&[0x1F]));
    }

    #[test]
    fn test_select_by_extension() {
        assert!(matches!(
            VgmSource::for_input(Input::from("song.vgz")),
            VgmSource::Memory(_)
        ));
        assert!(matches!(
            VgmSource::for_input(Input::from("song.VGZ")),
            VgmSource::Memory(_)
        ));
        assert!(matches!(
            VgmSource::for_input(Input::from("song.vgm")),
            VgmSource::File(_)
        ));
    }

    #[test]
    fn test_select_by_magic() {
        let src = VgmSource::for_input(Input::from(vec![0x1F, 0x8B, 0, 0]));
        match src {
            VgmSource::Memory(m) => assert!(m.is_compressed()),
            VgmSource::File(_) => panic!("expected memory source"),
        }
        let src = VgmSource::for_input(Input::from(b"Vgm ".as_slice()));
        match src {
            VgmSource::Memory(m) => assert!(!m.is_compressed()),
            VgmSource::File(_) => panic!("expected memory source"),
        }
    }

    #[test]
    fn test_fixed_width_reads() {
        let bytes = vec![0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0xAA];
        let mut src = VgmSource::for_input(Input::from(bytes));
        src.open().unwrap();
        assert_eq!(src.read_u16_le(), 0x1234);
        assert_eq!(src.read_u32_le(), 0x1234_5678);
        // Only one byte left
        assert_eq!(src.try_read_u16_le(), None);
        assert!(!src.available());
        assert_eq!(src.read_u32_le(), 0);
    }
}
