use std::time::SystemTimeError;

use thiserror::Error;

/// Why a shared secret was rejected.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SecretError {
    /// A character outside the base32 alphabet, with its index in the
    /// caller's input.
    #[error("character {character:?} at position {position} is not base32")]
    InvalidCharacter { character: char, position: usize },
    /// The secret decoded to zero key bytes.
    #[error("secret decodes to an empty key")]
    Empty,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid secret: {0}")]
    InvalidSecret(#[from] SecretError),

    #[error("unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("system clock is before the unix epoch")]
    Clock(#[from] SystemTimeError),

    #[error("invalid otpauth uri: {0}")]
    InvalidUri(String),

    #[error("malformed url")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
