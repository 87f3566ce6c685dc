use std::fmt::Display;
use std::string::FromUtf8Error;

use serde::ser;
use thiserror::Error;

/// Failure while percent-decoding a string.
///
/// Produced by [`unescape`](crate::unescape) and by any replacement
/// decoding function installed via
/// [`Config::decode_fn`](crate::Config::decode_fn). Byte positions refer
/// to the input passed to the decoder.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// A `%` with fewer than two characters after it.
    #[error("incomplete percent escape at byte {0}")]
    IncompleteEscape(usize),

    /// A `%` followed by characters that are not two hex digits.
    #[error("invalid percent escape at byte {0}")]
    InvalidEscape(usize),

    /// The decoded bytes are not valid UTF-8.
    #[error("percent-decoded bytes are not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// Catch-all for user-supplied decoding or encoding functions.
    #[error("{0}")]
    Custom(String),
}

/// Error type for query string parsing and stringification.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A decoding or encoding hook failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The value cannot be represented in a flat query string,
    /// e.g. a nested map or a sequence of sequences.
    #[error("unsupported value shape for a query string")]
    Unsupported,

    /// Serialization error raised through [`serde::ser::Error`].
    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}
