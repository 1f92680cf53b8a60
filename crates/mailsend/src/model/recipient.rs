//! Recipient model.

use serde::{Deserialize, Serialize};

/// Role of an address on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    /// Primary recipient.
    #[default]
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
}

/// An address paired with its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    address: String,
    #[serde(default, rename = "type")]
    kind: RecipientType,
}

impl Recipient {
    /// Creates a primary (`To`) recipient.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self::with_type(address, RecipientType::To)
    }

    /// Creates a recipient with an explicit role.
    #[must_use]
    pub fn with_type(address: impl Into<String>, kind: RecipientType) -> Self {
        Self {
            address: address.into(),
            kind,
        }
    }

    /// Shorthand for a `To` recipient.
    #[must_use]
    pub fn to(address: impl Into<String>) -> Self {
        Self::with_type(address, RecipientType::To)
    }

    /// Shorthand for a `Cc` recipient.
    #[must_use]
    pub fn cc(address: impl Into<String>) -> Self {
        Self::with_type(address, RecipientType::Cc)
    }

    /// Shorthand for a `Bcc` recipient.
    #[must_use]
    pub fn bcc(address: impl Into<String>) -> Self {
        Self::with_type(address, RecipientType::Bcc)
    }

    /// The raw address string, unparsed.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The recipient's role.
    #[must_use]
    pub const fn kind(&self) -> RecipientType {
        self.kind
    }
}
