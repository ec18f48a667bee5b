use crate::ParserError;
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserBmpError {
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error(transparent)]
    ParseError(#[from] ParserError),
    #[error("invalid OpenBMP header")]
    InvalidOpenBmpHeader,
    #[error("invalid stats data length {0}")]
    InvalidStatsDataLength(u16),
    #[error("unsupported OpenBMP message")]
    UnsupportedOpenBmpMessage,
    #[error("corrupted BMP message")]
    CorruptedBmpMessage,
}

impl PartialEq for ParserBmpError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (ParserBmpError::InvalidOpenBmpHeader, ParserBmpError::InvalidOpenBmpHeader)
                | (ParserBmpError::UnsupportedOpenBmpMessage, ParserBmpError::UnsupportedOpenBmpMessage)
                | (ParserBmpError::CorruptedBmpMessage, ParserBmpError::CorruptedBmpMessage)
        ) || matches!((self, other), (ParserBmpError::InvalidStatsDataLength(a), ParserBmpError::InvalidStatsDataLength(b)) if a == b)
    }
}

impl Eq for ParserBmpError {}

impl<T> From<TryFromPrimitiveError<T>> for ParserBmpError
where
    T: TryFromPrimitive,
    ParserError: From<TryFromPrimitiveError<T>>,
{
    fn from(value: TryFromPrimitiveError<T>) -> Self {
        ParserBmpError::ParseError(ParserError::from(value))
    }
}
