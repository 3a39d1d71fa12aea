//! VGM log format: header, opcodes, interpreter and writer

pub mod commands;
pub mod delay;
pub mod header;
pub mod interpreter;
pub mod writer;

pub use header::VgmHeader;
pub use interpreter::Interpreter;
pub use writer::VgmWriter;

use crate::error::Result;
use crate::source::{DataSource, Input, VgmSource};

/// Open `input` just long enough to parse its header
pub fn read_header(input: impl Into<Input>) -> Result<VgmHeader> {
    let mut source = VgmSource::for_input(input.into());
    source.open()?;
    let mut interpreter = Interpreter::new();
    let header = interpreter.parse_header(&mut source).cloned();
    source.close();
    header
}
