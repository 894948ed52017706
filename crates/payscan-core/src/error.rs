//! Error types for PayScan
//!
//! All fallible operations return `Result<T, Error>`.
//! The first three variants are user-input notices: the triggering
//! operation aborts and nothing else is affected.

use thiserror::Error;

/// PayScan error types
#[derive(Debug, Error)]
pub enum Error {
    /// Name empty or IBAN failing the shape check
    #[error("Invalid name/IBAN: {0}")]
    InvalidSettings(String),

    /// Generation attempted before name and IBAN were saved
    #[error("Enter your settings first (name + IBAN)")]
    MissingSettings,

    /// Amount did not parse to a strictly positive number
    #[error("Enter a valid amount (got {0:?})")]
    InvalidAmount(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Reading or writing the settings file failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// QR encoding or image output failure
    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    /// True for user-input validation failures, which are reported as a
    /// notice rather than a hard error.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            Error::InvalidSettings(_) | Error::MissingSettings | Error::InvalidAmount(_)
        )
    }
}

/// Result type alias for PayScan operations
pub type Result<T> = std::result::Result<T, Error>;
