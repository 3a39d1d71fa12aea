//! PCM data bank for YM2612 DAC streaming

/// DAC value for silence (center of unsigned 8-bit range)
pub const SILENCE: u8 = 0x80;

/// Sample storage fed by data blocks and drained by DAC-write opcodes.
///
/// The read cursor is independent of the command stream cursor and only moves
/// through `read_byte` and `seek`.
#[derive(Debug, Clone, Default)]
pub struct PcmBank {
    data: Vec<u8>,
    pos: usize,
}

impl PcmBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bank contents and rewind the cursor
    pub fn load(&mut self, data: Vec<u8>) {
        self.data = data;
        self.pos = 0;
    }

    /// Read the next sample, or `SILENCE` once the bank is empty or exhausted
    pub fn read_byte(&mut self) -> u8 {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                b
            }
            None => SILENCE,
        }
    }

    /// Move the cursor, clamped to the loaded length
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.pos = 0;
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
