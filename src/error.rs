use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid VGM magic: {0:#010x}")]
    InvalidMagic(u32),

    #[error("VGM header too short: {0} bytes")]
    HeaderTooShort(usize),

    #[error("Malformed VGM header: {0}")]
    MalformedHeader(String),

    #[error("Data source is not open")]
    NotOpen,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
