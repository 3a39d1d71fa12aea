//! Sound chip sinks

pub mod opn2;
pub mod sinks;
pub mod sn76489;

pub use sinks::{NullSink, RecordingSink, SinkEvent, TraceSink};

/// Destination for register writes produced by the interpreter.
///
/// Implemented by the hardware transport (or an emulator). Every call must
/// return within a few microseconds: time spent here is taken out of the
/// scheduler's budget for catching up on pending samples.
pub trait ChipSink {
    /// Write one byte to the SN76489
    fn write_psg(&mut self, value: u8);

    /// Write a YM2612 register on `port` (0 or 1)
    fn write_ym2612(&mut self, port: u8, register: u8, value: u8);

    /// Write one 8-bit sample to the YM2612 DAC (register 0x2A, port 0)
    fn write_dac(&mut self, sample: u8);

    /// Silence every channel on both chips (see [`write_mute_sequence`])
    fn mute_all(&mut self) {
        write_mute_sequence(self);
    }

    /// Return both chips to their power-on state.
    ///
    /// Transports with a reset line should pulse it; the default only mutes.
    fn reset(&mut self) {
        self.mute_all();
    }
}

/// Register writes that silence both chips.
///
/// Keys off all FM channels, parks the DAC at its midpoint and disables it,
/// then sets every PSG channel to full attenuation.
pub fn write_mute_sequence<S: ChipSink + ?Sized>(sink: &mut S) {
    for ch in 0..opn2::CHANNELS {
        sink.write_ym2612(0, opn2::REG_KEY_ON, opn2::key_channel(ch));
    }
    sink.write_ym2612(0, opn2::REG_DAC_DATA, crate::pcm::SILENCE);
    sink.write_ym2612(0, opn2::REG_DAC_ENABLE, 0x00);
    for ch in 0..sn76489::CHANNELS {
        sink.write_psg(sn76489::silence_command(ch));
    }
}

impl<T: ChipSink + ?Sized> ChipSink for &mut T {
    fn write_psg(&mut self, value: u8) {
        (**self).write_psg(value)
    }

    fn write_ym2612(&mut self, port: u8, register: u8, value: u8) {
        (**self).write_ym2612(port, register, value)
    }

    fn write_dac(&mut self, sample: u8) {
        (**self).write_dac(sample)
    }

    fn mute_all(&mut self) {
        (**self).mute_all()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<T: ChipSink + ?Sized> ChipSink for Box<T> {
    fn write_psg(&mut self, value: u8) {
        (**self).write_psg(value)
    }

    fn write_ym2612(&mut self, port: u8, register: u8, value: u8) {
        (**self).write_ym2612(port, register, value)
    }

    fn write_dac(&mut self, sample: u8) {
        (**self).write_dac(sample)
    }

    fn mute_all(&mut self) {
        (**self).mute_all()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
