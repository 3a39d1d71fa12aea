//! Buffered, seekable reader over an uncompressed VGM file

use super::DataSource;
use crate::error::Result;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Streams a `.vgm` file from disk without loading it whole
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    /// Absolute read position, tracked to avoid `stream_position` syscalls
    pos: u64,
    len: u64,
    data_start: u64,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: None,
            pos: 0,
            len: 0,
            data_start: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for FileSource {
    fn open(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        let file = File::open(&self.path)?;
        self.len = file.metadata()?.len();
        self.reader = Some(BufReader::new(file));
        self.pos = 0;
        self.data_start = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.reader = None;
        self.pos = 0;
        self.len = 0;
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn read(&mut self, count: usize) -> Vec<u8> {
        let reader = match self.reader.as_mut() {
            Some(r) => r,
            None => return Vec::new(),
        };
        let remaining = self.len.saturating_sub(self.pos);
        let want = (count as u64).min(remaining) as usize;
        let mut buf = Vec::with_capacity(want);
        // An I/O error mid-read is indistinguishable from truncation here
        let got = reader
            .by_ref()
            .take(want as u64)
            .read_to_end(&mut buf)
            .unwrap_or(buf.len());
        buf.truncate(got);
        self.pos += got as u64;
        buf
    }

    fn peek(&mut self) -> Option<u8> {
        let reader = self.reader.as_mut()?;
        reader.fill_buf().ok()?.first().copied()
    }

    fn available(&self) -> bool {
        self.reader.is_some() && self.pos < self.len
    }

    fn seek(&mut self, position: u64) -> bool {
        let reader = match self.reader.as_mut() {
            Some(r) => r,
            None => return false,
        };
        let target = match self.data_start.checked_add(position) {
            Some(t) if t <= self.len => t,
            _ => return false,
        };
        match reader.seek(SeekFrom::Start(target)) {
            Ok(p) => {
                self.pos = p;
                true
            }
            Err(_) => false,
        }
    }

    fn can_seek(&self) -> bool {
        true
    }

    fn position(&self) -> u64 {
        self.pos.saturating_sub(self.data_start)
    }

    fn size(&self) -> u64 {
        self.len
    }

    fn set_data_start(&mut self, offset: u64) {
        self.data_start = offset;
    }

    fn skip(&mut self, count: usize) -> usize {
        let remaining = self.len.saturating_sub(self.pos);
        let n = (count as u64).min(remaining);
        let reader = match self.reader.as_mut() {
            Some(r) => r,
            None => return 0,
        };
        match reader.seek_relative(n as i64) {
            Ok(()) => {
                self.pos += n;
                n as usize
            }
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn source_with(bytes: &[u8]) -> (tempfile::TempDir, FileSource) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.vgm");
        std::fs::write(&path, bytes).unwrap();
        (dir, FileSource::new(path))
    }

    #[test]
    fn test_open_missing_file_fails() {
        let mut src = FileSource::new("/nonexistent/path/song.vgm");
        assert!(src.open().is_err());
        assert!(!src.is_open());
        assert!(src.read(4).is_empty());
    }

    #[test]
    fn test_read_peek_and_eof() {
        let (_dir, mut src) = source_with(&[1, 2, 3, 4]);
        src.open().unwrap();
        assert_eq!(src.size(), 4);
        assert_eq!(src.peek(), Some(1));
        assert_eq!(src.read(3), vec![1, 2, 3]);
        assert_eq!(src.peek(), Some(4));
        assert!(src.available());
        assert_eq!(src.read(3), vec![4]);
        assert!(!src.available());
        assert_eq!(src.peek(), None);
    }

    #[test]
    fn test_seek_and_skip() {
        let (_dir, mut src) = source_with(&(0u8..16).collect::<Vec<_>>());
        src.open().unwrap();
        assert!(src.seek(8));
        src.set_data_start(8);
        assert_eq!(src.position(), 0);
        assert_eq!(src.skip(2), 2);
        assert_eq!(src.read(1), vec![10]);
        assert!(src.seek(0));
        assert_eq!(src.read(1), vec![8]);
        assert!(!src.seek(9));
        assert_eq!(src.skip(100), 7);
        assert!(!src.available());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (_dir, mut src) = source_with(&[1]);
        src.open().unwrap();
        src.close();
        src.close();
        assert!(!src.is_open());
        assert!(!src.seek(0));
    }
}
