//! Software sinks for tests, dry runs and logging

use super::{write_mute_sequence, ChipSink};
use serde::Serialize;

/// One call observed at a chip sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SinkEvent {
    /// SN76489 byte
    Psg { data: u8 },
    /// YM2612 register write
    Ym2612 { port: u8, reg: u8, data: u8 },
    /// YM2612 DAC sample
    Dac { data: u8 },
    /// Start of a mute request (followed by the writes it issues)
    MuteAll,
    /// Start of a reset request
    Reset,
}

/// Sink that remembers every call in order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// DAC samples in the order they were written
    pub fn dac_samples(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Dac { data } => Some(*data),
                _ => None,
            })
            .collect()
    }

    /// PSG bytes in the order they were written
    pub fn psg_writes(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Psg { data } => Some(*data),
                _ => None,
            })
            .collect()
    }
}

impl ChipSink for RecordingSink {
    fn write_psg(&mut self, value: u8) {
        self.events.push(SinkEvent::Psg { data: value });
    }

    fn write_ym2612(&mut self, port: u8, register: u8, value: u8) {
        self.events.push(SinkEvent::Ym2612 {
            port,
            reg: register,
            data: value,
        });
    }

    fn write_dac(&mut self, sample: u8) {
        self.events.push(SinkEvent::Dac { data: sample });
    }

    fn mute_all(&mut self) {
        self.events.push(SinkEvent::MuteAll);
        write_mute_sequence(self);
    }

    fn reset(&mut self) {
        self.events.push(SinkEvent::Reset);
        write_mute_sequence(self);
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ChipSink for NullSink {
    fn write_psg(&mut self, _value: u8) {}

    fn write_ym2612(&mut self, _port: u8, _register: u8, _value: u8) {}

    fn write_dac(&mut self, _sample: u8) {}

    fn mute_all(&mut self) {}
}

/// Sink that logs every write through `tracing` and counts them
#[derive(Debug, Clone, Default)]
pub struct TraceSink {
    psg_writes: u64,
    fm_writes: u64,
    dac_writes: u64,
}

impl TraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn psg_writes(&self) -> u64 {
        self.psg_writes
    }

    pub fn fm_writes(&self) -> u64 {
        self.fm_writes
    }

    pub fn dac_writes(&self) -> u64 {
        self.dac_writes
    }
}

impl ChipSink for TraceSink {
    fn write_psg(&mut self, value: u8) {
        self.psg_writes += 1;
        tracing::trace!("PSG {:02X}", value);
    }

    fn write_ym2612(&mut self, port: u8, register: u8, value: u8) {
        self.fm_writes += 1;
        tracing::trace!("YM2612 p{} {:02X}={:02X}", port, register, value);
    }

    fn write_dac(&mut self, sample: u8) {
        self.dac_writes += 1;
        tracing::trace!("DAC {:02X}", sample);
    }

    fn mute_all(&mut self) {
        tracing::debug!("mute all");
        write_mute_sequence(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_filters() {
        let mut sink = RecordingSink::new();
        sink.write_psg(0x90);
        sink.write_dac(0x11);
        sink.write_ym2612(0, 0x22, 0x08);
        sink.write_dac(0x22);
        assert_eq!(sink.dac_samples(), vec![0x11, 0x22]);
        assert_eq!(sink.psg_writes(), vec![0x90]);
        assert_eq!(sink.take_events().len(), 4);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_reset_is_marked() {
        let mut sink = RecordingSink::new();
        sink.reset();
        assert_eq!(sink.events()[0], SinkEvent::Reset);
        assert_eq!(sink.events().len(), 13);
    }

    #[test]
    fn test_trace_sink_counts() {
        let mut sink = TraceSink::new();
        sink.write_psg(0x9F);
        sink.write_dac(0x80);
        sink.mute_all();
        assert_eq!(sink.psg_writes(), 5);
        assert_eq!(sink.fm_writes(), 8);
        assert_eq!(sink.dac_writes(), 1);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&SinkEvent::Ym2612 {
            port: 1,
            reg: 0xB4,
            data: 0xC0,
        })
        .unwrap();
        assert_eq!(json, r#"{"cmd":"ym2612","port":1,"reg":180,"data":192}"#);
    }
}
