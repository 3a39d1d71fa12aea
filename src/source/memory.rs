//! Fully materialized in-memory source

use super::DataSource;
use crate::error::Result;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the bytes come from before `open`
#[derive(Debug, Clone)]
enum Origin {
    Buffer(Arc<[u8]>),
    GzipBuffer(Arc<[u8]>),
    GzipFile(PathBuf),
}

/// Reader over a buffer held entirely in memory.
///
/// Compressed origins are inflated once at `open`, which is what makes
/// seeking possible for `.vgz` input.
#[derive(Debug)]
pub struct MemorySource {
    origin: Origin,
    data: Option<Arc<[u8]>>,
    pos: usize,
    data_start: usize,
}

impl MemorySource {
    /// Source over raw, uncompressed VGM bytes
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_origin(Origin::Buffer(data.into()))
    }

    /// Source over gzip-compressed bytes
    pub fn gzip_bytes(data: Vec<u8>) -> Self {
        Self::with_origin(Origin::GzipBuffer(data.into()))
    }

    /// Source over a gzip-compressed file (`.vgz`)
    pub fn gzip_file(path: impl Into<PathBuf>) -> Self {
        Self::with_origin(Origin::GzipFile(path.into()))
    }

    fn with_origin(origin: Origin) -> Self {
        Self {
            origin,
            data: None,
            pos: 0,
            data_start: 0,
        }
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self.origin, Origin::Buffer(_))
    }

    fn inflate(reader: impl Read) -> Result<Arc<[u8]>> {
        let mut decoder = GzDecoder::new(reader);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        Ok(data.into())
    }

    fn bytes(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }
}

impl DataSource for MemorySource {
    fn open(&mut self) -> Result<()> {
        if self.data.is_some() {
            return Ok(());
        }
        let data = match &self.origin {
            Origin::Buffer(buf) => Arc::clone(buf),
            Origin::GzipBuffer(buf) => Self::inflate(&buf[..])?,
            Origin::GzipFile(path) => Self::inflate(File::open(path)?)?,
        };
        self.data = Some(data);
        self.pos = 0;
        self.data_start = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.data = None;
        self.pos = 0;
    }

    fn is_open(&self) -> bool {
        self.data.is_some()
    }

    fn read(&mut self, count: usize) -> Vec<u8> {
        let data = match &self.data {
            Some(d) => d,
            None => return Vec::new(),
        };
        let end = self.pos.saturating_add(count).min(data.len());
        let out = data[self.pos..end].to_vec();
        self.pos = end;
        out
    }

    fn peek(&mut self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn available(&self) -> bool {
        self.pos < self.bytes().len()
    }

    fn seek(&mut self, position: u64) -> bool {
        if self.data.is_none() {
            return false;
        }
        let target = match usize::try_from(position)
            .ok()
            .and_then(|p| p.checked_add(self.data_start))
        {
            Some(t) => t,
            None => return false,
        };
        if target > self.bytes().len() {
            return false;
        }
        self.pos = target;
        true
    }

    fn can_seek(&self) -> bool {
        true
    }

    fn position(&self) -> u64 {
        self.pos.saturating_sub(self.data_start) as u64
    }

    fn size(&self) -> u64 {
        self.bytes().len() as u64
    }

    fn set_data_start(&mut self, offset: u64) {
        self.data_start = offset as usize;
    }

    fn skip(&mut self, count: usize) -> usize {
        let end = self.pos.saturating_add(count).min(self.bytes().len());
        let skipped = end.saturating_sub(self.pos);
        self.pos = self.pos.max(end);
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_read_before_open_is_empty() {
        let mut src = MemorySource::new(vec![1, 2, 3]);
        assert!(!src.is_open());
        assert!(src.read(2).is_empty());
        assert_eq!(src.peek(), None);
        assert!(!src.seek(0));
    }

    #[test]
    fn test_read_and_peek() {
        let mut src = MemorySource::new(vec![1, 2, 3]);
        src.open().unwrap();
        assert_eq!(src.peek(), Some(1));
        assert_eq!(src.read(2), vec![1, 2]);
        assert_eq!(src.read(5), vec![3]);
        assert_eq!(src.peek(), None);
        assert!(!src.available());
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut src = MemorySource::new(vec![1, 2, 3]);
        src.open().unwrap();
        src.read(2);
        src.open().unwrap();
        assert_eq!(src.read(1), vec![3]);
        src.close();
        src.close();
        assert!(!src.is_open());
    }

    #[test]
    fn test_seek_relative_to_data_start() {
        let mut src = MemorySource::new((0u8..10).collect());
        src.open().unwrap();
        assert!(src.seek(4));
        src.set_data_start(4);
        assert_eq!(src.position(), 0);
        assert_eq!(src.read(1), vec![4]);
        assert!(src.seek(3));
        assert_eq!(src.read(1), vec![7]);
        assert!(src.seek(6));
        assert!(!src.available());
        assert!(!src.seek(7));
    }

    #[test]
    fn test_skip_counts() {
        let mut src = MemorySource::new(vec![0; 5]);
        src.open().unwrap();
        assert_eq!(src.skip(3), 3);
        assert_eq!(src.skip(3), 2);
        assert_eq!(src.skip(3), 0);
    }

    #[test]
    fn test_gzip_bytes_inflate_on_open() {
        let raw: Vec<u8> = (0u8..=255).collect();
        let mut src = MemorySource::gzip_bytes(gzip(&raw));
        assert!(src.is_compressed());
        src.open().unwrap();
        assert_eq!(src.size(), 256);
        assert_eq!(src.read(usize::MAX), raw);
    }

    #[test]
    fn test_bad_gzip_fails_open() {
        let mut src = MemorySource::gzip_bytes(vec![0x1F, 0x8B, 0x00, 0x01, 0x02]);
        assert!(src.open().is_err());
        assert!(!src.is_open());
    }

    #[test]
    fn test_missing_gzip_file_fails_open() {
        let mut src = MemorySource::gzip_file("/nonexistent/path/song.vgz");
        assert!(matches!(src.open(), Err(Error::Io(_))));
    }
}
