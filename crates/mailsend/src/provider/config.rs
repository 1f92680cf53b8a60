//! Transport configuration map.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Well-known configuration keys.
pub mod keys {
    /// Relay hostname.
    pub const HOST: &str = "mail.smtp.host";
    /// Relay port.
    pub const PORT: &str = "mail.smtp.port";
    /// Whether to authenticate (`true`/`false`).
    pub const AUTH: &str = "mail.smtp.auth";
    /// Space-separated SASL mechanisms (`PLAIN`, `LOGIN`, `XOAUTH2`).
    pub const AUTH_MECHANISMS: &str = "mail.smtp.auth.mechanisms";
    /// Implicit TLS on connect.
    pub const SSL_ENABLE: &str = "mail.smtp.ssl.enable";
    /// Upgrade with STARTTLS after connect.
    pub const STARTTLS_ENABLE: &str = "mail.smtp.starttls.enable";
    /// Socket timeout in milliseconds.
    pub const TIMEOUT: &str = "mail.smtp.timeout";
}

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }

    /// Default SMTP port for the security mode.
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::None => 25,
            Self::StartTls => 587,
            Self::Tls => 465,
        }
    }
}

/// SASL mechanism used to authenticate with the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMechanism {
    /// `AUTH PLAIN`.
    Plain,
    /// `AUTH LOGIN`.
    Login,
    /// `AUTH XOAUTH2`; the password is an OAuth2 access token.
    Xoauth2,
}

impl std::str::FromStr for AuthMechanism {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PLAIN" => Ok(Self::Plain),
            "LOGIN" => Ok(Self::Login),
            "XOAUTH2" => Ok(Self::Xoauth2),
            other => Err(Error::Config(format!("unknown auth mechanism: {other}"))),
        }
    }
}

/// Key/value settings consumed when opening a transport session.
///
/// Keys follow the `mail.smtp.*` naming in [`keys`]. Unknown keys are kept
/// and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportConfig {
    properties: BTreeMap<String, String>,
}

impl TransportConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the updated configuration.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Relay hostname.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is missing or blank.
    pub fn host(&self) -> Result<&str> {
        match self.get(keys::HOST).map(str::trim) {
            Some(host) if !host.is_empty() => Ok(host),
            _ => Err(Error::Config(format!("{} is not set", keys::HOST))),
        }
    }

    /// Relay port; defaults to the security mode's standard port.
    ///
    /// # Errors
    ///
    /// Returns an error if the port is not a number in 1-65535.
    pub fn port(&self) -> Result<u16> {
        let Some(raw) = self.get(keys::PORT) else {
            return Ok(self.security().default_port());
        };
        match raw.trim().parse::<u16>() {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(Error::Config(format!(
                "{} must be 1-65535, got {raw:?}",
                keys::PORT
            ))),
        }
    }

    /// Security mode. Implicit TLS wins over STARTTLS when both are enabled.
    #[must_use]
    pub fn security(&self) -> Security {
        if self.flag(keys::SSL_ENABLE) {
            Security::Tls
        } else if self.flag(keys::STARTTLS_ENABLE) {
            Security::StartTls
        } else {
            Security::None
        }
    }

    /// Whether credentials are sent to the relay.
    #[must_use]
    pub fn auth_required(&self) -> bool {
        self.flag(keys::AUTH)
    }

    /// Socket timeout, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a whole number of milliseconds.
    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.get(keys::TIMEOUT)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| {
                        Error::Config(format!("{} must be milliseconds, got {raw:?}", keys::TIMEOUT))
                    })
            })
            .transpose()
    }

    /// Configured SASL mechanisms; empty means the transport's defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a mechanism name is not recognized.
    pub fn mechanisms(&self) -> Result<Vec<AuthMechanism>> {
        self.get(keys::AUTH_MECHANISMS)
            .unwrap_or_default()
            .split_whitespace()
            .map(str::parse)
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for TransportConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    #[test]
    fn security_resolution() {
        let config = TransportConfig::new();
        assert_eq!(config.security(), Security::None);

        let config = TransportConfig::new().with(keys::STARTTLS_ENABLE, "true");
        assert_eq!(config.security(), Security::StartTls);

        let config = config.with(keys::SSL_ENABLE, "TRUE");
        assert_eq!(config.security(), Security::Tls);

        let config = TransportConfig::new().with(keys::SSL_ENABLE, "false");
        assert_eq!(config.security(), Security::None);
    }

    #[test]
    fn host_required() {
        assert!(matches!(TransportConfig::new().host(), Err(Error::Config(_))));
        let config = TransportConfig::new().with(keys::HOST, "  ");
        assert!(config.host().is_err());
        let config = TransportConfig::new().with(keys::HOST, " smtp.example.com ");
        assert_eq!(config.host().unwrap(), "smtp.example.com");
    }

    #[test]
    fn port_parsing() {
        let config = TransportConfig::new().with(keys::PORT, "2525");
        assert_eq!(config.port().unwrap(), 2525);

        assert!(TransportConfig::new().with(keys::PORT, "0").port().is_err());
        assert!(TransportConfig::new().with(keys::PORT, "70000").port().is_err());
        assert!(TransportConfig::new().with(keys::PORT, "smtp").port().is_err());
    }

    #[test]
    fn port_defaults_follow_security() {
        assert_eq!(TransportConfig::new().port().unwrap(), 25);
        let tls = TransportConfig::new().with(keys::SSL_ENABLE, "true");
        assert_eq!(tls.port().unwrap(), 465);
        let starttls = TransportConfig::new().with(keys::STARTTLS_ENABLE, "true");
        assert_eq!(starttls.port().unwrap(), 587);
    }

    #[test]
    fn timeout_parsing() {
        assert_eq!(TransportConfig::new().timeout().unwrap(), None);
        let config = TransportConfig::new().with(keys::TIMEOUT, "1500");
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_millis(1500)));
        assert!(TransportConfig::new().with(keys::TIMEOUT, "soon").timeout().is_err());
    }

    #[test]
    fn mechanisms_parsing() {
        assert!(TransportConfig::new().mechanisms().unwrap().is_empty());
        let config = TransportConfig::new().with(keys::AUTH_MECHANISMS, "xoauth2 PLAIN");
        assert_eq!(
            config.mechanisms().unwrap(),
            vec![AuthMechanism::Xoauth2, AuthMechanism::Plain]
        );
        let config = TransportConfig::new().with(keys::AUTH_MECHANISMS, "CRAM-MD5");
        assert!(config.mechanisms().is_err());
    }

    #[test]
    fn auth_flag() {
        assert!(!TransportConfig::new().auth_required());
        assert!(TransportConfig::new().with(keys::AUTH, "true").auth_required());
    }

    #[test]
    fn serializes_as_flat_map() {
        let config: TransportConfig = [(keys::HOST, "smtp.example.com"), (keys::PORT, "25")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"mail.smtp.host":"smtp.example.com","mail.smtp.port":"25"}"#
        );
        let back: TransportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn display_names() {
        assert_eq!(Security::None.display_name(), "None (insecure)");
        assert_eq!(Security::Tls.display_name(), "SSL/TLS");
        assert_eq!(Security::StartTls.display_name(), "STARTTLS");
    }
}
