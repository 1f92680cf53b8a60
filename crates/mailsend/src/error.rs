//! Error types for composing and sending mail.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or sending a mail.
#[derive(Debug, Error)]
pub enum Error {
    /// Sender or recipient address is not valid email syntax.
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// Attachment file could not be read.
    #[error("Cannot read attachment {}: {source}", .path.display())]
    Attachment {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The message could not be assembled (e.g. no recipients).
    #[error("Message error: {0}")]
    Message(#[from] lettre::error::Error),

    /// Connection, TLS, authentication or SMTP failure.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] keyring::Error),
}

impl Error {
    /// Wraps any transport-layer failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }

    /// Returns `true` if the failure happened while reading an attachment.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Attachment { .. })
    }

    /// Returns `true` for malformed sender or recipient addresses.
    #[must_use]
    pub const fn is_address(&self) -> bool {
        matches!(self, Self::Address(_))
    }
}

impl From<lettre::transport::smtp::Error> for Error {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
