use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("map does not exist: {path:?}")]
    MapNotFound { path: PathBuf },
}

impl Error {
    /// True when the failure is a read past the end of the container.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Self::Format(FormatError::UnexpectedEof { .. }))
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unexpected end of data at byte {at}, need {needed} bytes")]
    UnexpectedEof { at: u64, needed: usize },

    #[error("malformed container: {reason}")]
    MalformedContainer { reason: String },

    #[error("bad magic: expected \"WAD3\", got {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error(
        "lump {lump} out of range: offset {offset} + size {size} exceeds container length {container_len}"
    )]
    LumpOutOfRange {
        lump: &'static str,
        offset: u32,
        size: u32,
        container_len: u64,
    },

    #[error("directory table has not been loaded")]
    DirectoryNotLoaded,

    #[error("texture offsets have not been loaded")]
    TextureOffsetsNotLoaded,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("expected {expected:?} but reached end of input at byte {at}")]
    UnexpectedEndOfInput { expected: char, at: usize },

    #[error("expected {expected:?} at byte {at}, found {found:?}")]
    UnexpectedChar {
        expected: char,
        found: char,
        at: usize,
    },

    #[error("conflicting values for key {key:?}: {existing:?} vs {value:?}")]
    ConflictingKey {
        key: String,
        existing: String,
        value: String,
    },
}
