//! Secure password storage using the system keyring.
//!
//! Lets applications keep SMTP passwords (or OAuth2 access tokens) out of
//! source and configuration files:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

use crate::error::Result;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "mailsend";

/// Generates the keyring entry key for an account.
fn credential_key(username: &str) -> String {
    format!("{SERVICE_NAME}_smtp_{username}")
}

fn entry(username: &str) -> Result<Entry> {
    Ok(Entry::new(SERVICE_NAME, &credential_key(username))?)
}

/// Stores the SMTP password for `username`.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_password(username: &str, password: &str) -> Result<()> {
    entry(username)?.set_password(password)?;
    debug!("Stored SMTP password for {username}");
    Ok(())
}

/// Retrieves the SMTP password for `username`, if one is stored.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_password(username: &str) -> Result<Option<String>> {
    match entry(username)?.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => {
            debug!("No SMTP password found for {username}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes the stored SMTP password for `username`.
///
/// Deleting a missing entry is not an error.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn delete_password(username: &str) -> Result<()> {
    match entry(username)?.delete_credential() {
        Ok(()) => {
            debug!("Deleted SMTP password for {username}");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No SMTP password to delete for {username}");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete SMTP password: {e}");
            Err(e.into())
        }
    }
}
