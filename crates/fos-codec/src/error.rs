use thiserror::Error;

use crate::value::TypeTag;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8 in string field: {0}")]
    InvalidUtf8(String),

    #[error("string too long for wire encoding: {len} bytes (max {max})")]
    StringTooLong { len: usize, max: usize },

    #[error("invalid boolean byte: {0}")]
    InvalidBoolean(u8),

    #[error("unknown type tag: {0}")]
    UnknownTypeTag(u8),

    #[error("type mismatch: transcriber for {expected} given a {actual} value")]
    TypeMismatch { expected: TypeTag, actual: TypeTag },
}

impl CodecError {
    /// Returns `true` if the stream ended before a field was complete.
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

pub type CodecResult<T> = Result<T, CodecError>;
