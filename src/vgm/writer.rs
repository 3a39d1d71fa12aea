//! In-memory VGM writer

use super::commands::{opcode, BLOCK_TYPE_YM2612_PCM};
use super::delay;
use super::header::{offset, VGM_BASE_HEADER_SIZE, VGM_MAGIC};

/// Version written into the header
pub const WRITER_VERSION: u32 = 0x150;

/// Builds a VGM 1.50 log in memory.
///
/// Commands are appended in order; `finish` closes the stream and fills in
/// the header fields that depend on its contents.
#[derive(Debug, Clone)]
pub struct VgmWriter {
    header: [u8; VGM_BASE_HEADER_SIZE],
    data: Vec<u8>,
    total_samples: u64,
    /// (absolute offset, samples written before the mark)
    loop_mark: Option<(usize, u64)>,
}

impl Default for VgmWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VgmWriter {
    pub fn new() -> Self {
        let mut writer = Self {
            header: [0u8; VGM_BASE_HEADER_SIZE],
            data: Vec::new(),
            total_samples: 0,
            loop_mark: None,
        };
        writer.put_u32(offset::IDENT, VGM_MAGIC);
        writer.put_u32(offset::VERSION, WRITER_VERSION);
        // Data immediately follows the base header
        writer.put_u32(offset::DATA_OFFSET, (VGM_BASE_HEADER_SIZE - offset::DATA_OFFSET) as u32);
        writer
    }

    fn put_u32(&mut self, off: usize, value: u32) {
        self.header[off..off + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn set_sn76489_clock(&mut self, clock: u32) {
        self.put_u32(offset::SN76489_CLOCK, clock);
    }

    pub fn set_ym2612_clock(&mut self, clock: u32) {
        self.put_u32(offset::YM2612_CLOCK, clock);
    }

    pub fn set_rate(&mut self, rate: u32) {
        self.put_u32(offset::RATE, rate);
    }

    /// Absolute offset the next command will be written at
    pub fn position(&self) -> usize {
        VGM_BASE_HEADER_SIZE + self.data.len()
    }

    /// Samples of wait written so far
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn write_psg(&mut self, value: u8) {
        self.data.extend_from_slice(&[opcode::SN76489, value]);
    }

    pub fn write_ym2612(&mut self, port: u8, register: u8, value: u8) {
        let op = if port == 0 {
            opcode::YM2612_PORT0
        } else {
            opcode::YM2612_PORT1
        };
        self.data.extend_from_slice(&[op, register, value]);
    }

    pub fn write_delay(&mut self, samples: u64) {
        self.data.extend(delay::generate_delay(samples));
        self.total_samples += samples;
    }

    /// Data block of `block_type` carrying `payload`
    pub fn write_data_block(&mut self, block_type: u8, payload: &[u8]) {
        self.data.extend_from_slice(&[opcode::DATA_BLOCK, opcode::END, block_type]);
        self.data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.data.extend_from_slice(payload);
    }

    /// YM2612 PCM data block
    pub fn write_pcm_block(&mut self, samples: &[u8]) {
        self.write_data_block(BLOCK_TYPE_YM2612_PCM, samples);
    }

    /// Write the next PCM bank byte to the DAC, then wait `wait` samples (0-15)
    pub fn write_dac(&mut self, wait: u8) {
        let wait = wait & 0x0F;
        self.data.push(opcode::YM2612_DAC_BASE | wait);
        self.total_samples += wait as u64;
    }

    pub fn seek_pcm(&mut self, position: u32) {
        self.data.push(opcode::SEEK_PCM);
        self.data.extend_from_slice(&position.to_le_bytes());
    }

    /// Mark the current position as the loop point
    pub fn mark_loop_start(&mut self) {
        self.loop_mark = Some((self.position(), self.total_samples));
    }

    /// Append bytes verbatim. Waits inside them are not counted.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append the end command and return the finished log
    pub fn finish(mut self) -> Vec<u8> {
        self.data.push(opcode::END);

        let total = self.total_samples.min(u32::MAX as u64) as u32;
        self.put_u32(offset::TOTAL_SAMPLES, total);

        if let Some((loop_pos, samples_before)) = self.loop_mark {
            self.put_u32(offset::LOOP_OFFSET, (loop_pos - offset::LOOP_OFFSET) as u32);
            let loop_samples = self.total_samples - samples_before;
            self.put_u32(offset::LOOP_SAMPLES, loop_samples as u32);
        }

        let eof = VGM_BASE_HEADER_SIZE + self.data.len();
        self.put_u32(offset::EOF_OFFSET, (eof - offset::EOF_OFFSET) as u32);

        let mut out = Vec::with_capacity(eof);
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.data);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vgm::header::VgmHeader;

    #[test]
    fn test_empty_log() {
        let bytes = VgmWriter::new().finish();
        assert_eq!(bytes.len(), 0x41);
        assert_eq!(&bytes[0..4], b"Vgm ");
        assert_eq!(bytes[0x40], 0x66);

        let hdr = VgmHeader::parse(&bytes, bytes.len() as u64).unwrap();
        assert_eq!(hdr.version, 0x150);
        assert_eq!(hdr.data_offset, 0x40);
        assert_eq!(hdr.eof_offset, 0x41);
        assert!(!hdr.has_loop());
    }

    #[test]
    fn test_command_bytes() {
        let mut w = VgmWriter::new();
        w.write_psg(0x9F);
        w.write_ym2612(1, 0xB4, 0xC0);
        w.write_dac(3);
        w.seek_pcm(0x0102);
        let bytes = w.finish();
        assert_eq!(
            &bytes[0x40..],
            &[0x50, 0x9F, 0x53, 0xB4, 0xC0, 0x83, 0xE0, 0x02, 0x01, 0x00, 0x00, 0x66]
        );
    }

    #[test]
    fn test_pcm_block_layout() {
        let mut w = VgmWriter::new();
        w.write_pcm_block(&[0x10, 0x20]);
        let bytes = w.finish();
        assert_eq!(
            &bytes[0x40..],
            &[0x67, 0x66, 0x00, 0x02, 0x00, 0x00, 0x00, 0x10, 0x20, 0x66]
        );
    }

    #[test]
    fn test_loop_and_totals() {
        let mut w = VgmWriter::new();
        w.set_ym2612_clock(7_670_453);
        w.write_delay(100);
        w.mark_loop_start();
        let loop_at = w.position();
        w.write_delay(735);
        w.write_dac(5);
        let bytes = w.finish();

        let hdr = VgmHeader::parse(&bytes, bytes.len() as u64).unwrap();
        assert_eq!(hdr.total_samples, 840);
        assert_eq!(hdr.loop_offset as usize, loop_at);
        assert_eq!(hdr.loop_samples, 740);
        assert!(hdr.has_loop());
        assert!(hdr.has_ym2612());
    }
}
