//! Error types for huffpack

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HuffError>;

#[derive(Error, Debug)]
pub enum HuffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`HuffError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    InvalidInput,
    Encoding,
    CorruptStream,
    Config,
}

impl HuffError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HuffError::Io(_) => ErrorKind::Io,
            HuffError::InvalidInput(_) => ErrorKind::InvalidInput,
            HuffError::Encoding(_) => ErrorKind::Encoding,
            HuffError::CorruptStream(_) => ErrorKind::CorruptStream,
            HuffError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        HuffError::CorruptStream(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: HuffError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(HuffError::corrupt("x").kind(), ErrorKind::CorruptStream);
        assert_eq!(HuffError::Encoding("x".into()).kind(), ErrorKind::Encoding);
        assert_eq!(HuffError::InvalidInput("x".into()).kind(), ErrorKind::InvalidInput);
    }
}
