//! VGM command interpreter
//!
//! Executes opcodes from a [`DataSource`] against a [`ChipSink`] until a wait
//! is reached. The interpreter knows nothing about wall-clock time; the
//! scheduler decides when to ask for more commands.

use super::commands::{opcode, skip_length, BLOCK_SIZE_MASK, BLOCK_TYPE_YM2612_PCM};
use super::commands::{SAMPLES_50TH, SAMPLES_60TH};
use super::header::{VgmHeader, VGM_BASE_HEADER_SIZE};
use crate::chips::{opn2, sn76489, ChipSink};
use crate::error::{Error, Result};
use crate::pcm::PcmBank;
use crate::source::DataSource;

/// Outcome of a single command
enum Step {
    Continue,
    Wait(u32),
    End,
}

#[derive(Debug, Default)]
pub struct Interpreter {
    header: Option<VgmHeader>,
    pcm: PcmBank,
    finished: bool,
    loop_count: u32,
    /// Apply the FM-mix attenuation to PSG volume writes
    psg_bias: bool,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything about the previous log
    pub fn bind(&mut self) {
        self.header = None;
        self.pcm.clear();
        self.finished = false;
        self.loop_count = 0;
        self.psg_bias = false;
    }

    /// Read and validate the header, then position `source` at the first
    /// command and make that the zero point for later seeks.
    pub fn parse_header<D: DataSource + ?Sized>(&mut self, source: &mut D) -> Result<&VgmHeader> {
        if !source.is_open() {
            return Err(Error::NotOpen);
        }

        let bytes = source.read(VGM_BASE_HEADER_SIZE);
        let header = VgmHeader::parse(&bytes, source.size())?;

        let data_start = header.data_offset as u64;
        source.set_data_start(data_start);
        if !source.seek(0) {
            return Err(Error::MalformedHeader(format!(
                "cannot seek to data offset {:#x}",
                data_start
            )));
        }

        tracing::debug!(
            "VGM {}: psg={} fm={} samples={} loop={:#x}/{} data={:#x}",
            header.version_string(),
            header.sn76489_clock,
            header.ym2612_clock,
            header.total_samples,
            header.loop_offset,
            header.loop_samples,
            header.data_offset
        );

        self.psg_bias = header.has_ym2612() && header.has_sn76489();
        self.finished = false;
        Ok(&*self.header.insert(header))
    }

    /// Execute commands until one asks for a wait.
    ///
    /// Returns the wait in samples. Returns 0 once the log has ended, either
    /// through the end command or because the data ran out.
    pub fn process_until_wait<D, S>(&mut self, source: &mut D, sink: &mut S) -> u32
    where
        D: DataSource + ?Sized,
        S: ChipSink + ?Sized,
    {
        if self.finished {
            return 0;
        }
        loop {
            match self.step(source, sink) {
                Some(Step::Continue) => {}
                Some(Step::Wait(samples)) => return samples,
                Some(Step::End) => {
                    tracing::debug!("end of command stream at {:#x}", source.position());
                    self.finished = true;
                    return 0;
                }
                None => {
                    tracing::warn!("command stream truncated at {:#x}", source.position());
                    self.finished = true;
                    return 0;
                }
            }
        }
    }

    /// Execute one command. `None` means the data ended inside it.
    fn step<D, S>(&mut self, source: &mut D, sink: &mut S) -> Option<Step>
    where
        D: DataSource + ?Sized,
        S: ChipSink + ?Sized,
    {
        let Some(op) = source.read_u8() else {
            return Some(Step::End);
        };

        match op {
            opcode::SN76489 => {
                let value = source.read_u8()?;
                if self.psg_bias {
                    sink.write_psg(sn76489::bias_volume(value));
                } else {
                    sink.write_psg(value);
                }
            }
            opcode::YM2612_PORT0 => {
                let reg = source.read_u8()?;
                let value = source.read_u8()?;
                if reg == opn2::REG_DAC_DATA {
                    sink.write_dac(value);
                } else {
                    sink.write_ym2612(0, reg, value);
                }
            }
            opcode::YM2612_PORT1 => {
                let reg = source.read_u8()?;
                let value = source.read_u8()?;
                sink.write_ym2612(1, reg, value);
            }
            opcode::WAIT_NNNN => return Some(Step::Wait(source.try_read_u16_le()? as u32)),
            opcode::WAIT_60TH => return Some(Step::Wait(SAMPLES_60TH)),
            opcode::WAIT_50TH => return Some(Step::Wait(SAMPLES_50TH)),
            opcode::END => return Some(Step::End),
            opcode::DATA_BLOCK => self.data_block(source)?,
            0x70..=0x7F => return Some(Step::Wait((op & 0x0F) as u32 + 1)),
            0x80..=0x8F => {
                sink.write_dac(self.pcm.read_byte());
                let wait = (op & 0x0F) as u32;
                if wait > 0 {
                    return Some(Step::Wait(wait));
                }
            }
            opcode::SEEK_PCM => {
                let pos = source.try_read_u32_le()?;
                self.pcm.seek(pos as usize);
            }
            _ => {
                let len = skip_length(op);
                if len > 0 && source.skip(len) < len {
                    return None;
                }
            }
        }
        Some(Step::Continue)
    }

    /// 0x67 0x66 tt ss ss ss ss <payload>
    fn data_block<D: DataSource + ?Sized>(&mut self, source: &mut D) -> Option<()> {
        let marker = source.read_u8()?;
        if marker != opcode::END {
            tracing::warn!("data block marker {:#04x}, expected 0x66", marker);
        }
        let block_type = source.read_u8()?;
        let size = (source.try_read_u32_le()? & BLOCK_SIZE_MASK) as usize;

        if block_type == BLOCK_TYPE_YM2612_PCM {
            let payload = source.read(size);
            if payload.len() < size {
                return None;
            }
            tracing::debug!("loaded {} bytes of PCM", size);
            self.pcm.load(payload);
        } else {
            tracing::debug!("skipping data block type {:#04x} ({} bytes)", block_type, size);
            if source.skip(size) < size {
                return None;
            }
        }
        Some(())
    }

    /// Rewind `source` to the loop point.
    ///
    /// Returns false when the log has no loop point or the seek failed.
    pub fn seek_to_loop<D: DataSource + ?Sized>(&mut self, source: &mut D) -> bool {
        let Some(header) = self.header.as_ref().filter(|h| h.has_loop()) else {
            return false;
        };
        let target = (header.loop_offset - header.data_offset) as u64;
        if !source.seek(target) {
            tracing::warn!("cannot seek to loop point {:#x}", header.loop_offset);
            return false;
        }
        self.finished = false;
        self.loop_count += 1;
        true
    }

    pub fn header(&self) -> Option<&VgmHeader> {
        self.header.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn has_loop(&self) -> bool {
        self.header.as_ref().is_some_and(VgmHeader::has_loop)
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn pcm_bank(&self) -> &PcmBank {
        &self.pcm
    }
}
