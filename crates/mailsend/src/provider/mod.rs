//! Mail provider presets.
//!
//! A [`MailProvider`] supplies the [`TransportConfig`] a
//! [`MailSender`](crate::MailSender) opens its session with. Adding a provider
//! means implementing the trait, never touching the sender.

mod config;

pub use config::{AuthMechanism, Security, TransportConfig, keys};

use crate::error::{Error, Result};

/// Source of transport configuration for one mail service.
pub trait MailProvider {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Produces the configuration map for a transport session.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot produce a usable configuration.
    fn properties(&self) -> Result<TransportConfig>;
}

/// Gmail over SMTP with implicit TLS on port 465.
#[derive(Debug, Clone, Copy, Default)]
pub struct GmailProvider;

impl GmailProvider {
    /// Gmail's outbound relay.
    pub const HOST: &'static str = "smtp.gmail.com";
    /// SMTP-over-SSL port.
    pub const PORT: u16 = 465;
}

impl MailProvider for GmailProvider {
    fn name(&self) -> &str {
        "Gmail"
    }

    fn properties(&self) -> Result<TransportConfig> {
        Ok(TransportConfig::new()
            .with(keys::HOST, Self::HOST)
            .with(keys::PORT, Self::PORT.to_string())
            .with(keys::AUTH, "true")
            .with(keys::SSL_ENABLE, "true")
            .with(keys::STARTTLS_ENABLE, "true"))
    }
}

/// Any password-authenticated SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProvider {
    /// Display name.
    pub name: String,
    /// Relay hostname.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
}

impl SmtpProvider {
    /// Creates a provider using the standard port for `security`.
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>, security: Security) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: security.default_port(),
            security,
        }
    }

    /// Overrides the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl MailProvider for SmtpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> Result<TransportConfig> {
        if self.host.trim().is_empty() {
            return Err(Error::Config(format!("{}: SMTP host is required", self.name)));
        }
        if self.port == 0 {
            return Err(Error::Config(format!("{}: SMTP port must be 1-65535", self.name)));
        }
        Ok(TransportConfig::new()
            .with(keys::HOST, self.host.trim())
            .with(keys::PORT, self.port.to_string())
            .with(keys::AUTH, "true")
            .with(keys::SSL_ENABLE, (self.security == Security::Tls).to_string())
            .with(
                keys::STARTTLS_ENABLE,
                (self.security == Security::StartTls).to_string(),
            ))
    }
}

impl MailProvider for TransportConfig {
    fn name(&self) -> &str {
        "Custom"
    }

    fn properties(&self) -> Result<TransportConfig> {
        self.host()?;
        self.port()?;
        Ok(self.clone())
    }
}

/// Looks up relay settings for well-known providers by address domain.
#[must_use]
pub fn provider_for_address(email: &str) -> Option<SmtpProvider> {
    let domain = email.rsplit_once('@')?.1.to_lowercase();
    let provider = match domain.as_str() {
        "gmail.com" | "googlemail.com" => {
            SmtpProvider::new("Gmail", GmailProvider::HOST, Security::Tls)
        }
        "outlook.com" | "hotmail.com" | "live.com" => {
            SmtpProvider::new("Outlook", "smtp.office365.com", Security::StartTls)
        }
        "yahoo.com" | "ymail.com" => {
            SmtpProvider::new("Yahoo", "smtp.mail.yahoo.com", Security::Tls)
        }
        "icloud.com" | "me.com" | "mac.com" => {
            SmtpProvider::new("iCloud", "smtp.mail.me.com", Security::StartTls)
        }
        _ => return None,
    };
    Some(provider)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    #[test]
    fn gmail_properties() {
        let config = GmailProvider.properties().unwrap();
        assert_eq!(config.host().unwrap(), "smtp.gmail.com");
        assert_eq!(config.port().unwrap(), 465);
        assert_eq!(config.security(), Security::Tls);
        assert!(config.auth_required());
        assert_eq!(config.get(keys::STARTTLS_ENABLE), Some("true"));
        assert_eq!(GmailProvider.name(), "Gmail");
    }

    #[test]
    fn smtp_provider_properties() {
        let provider = SmtpProvider::new("Work", "mail.example.com", Security::StartTls);
        assert_eq!(provider.port, 587);

        let config = provider.clone().with_port(2525).properties().unwrap();
        assert_eq!(config.host().unwrap(), "mail.example.com");
        assert_eq!(config.port().unwrap(), 2525);
        assert_eq!(config.security(), Security::StartTls);
    }

    #[test]
    fn smtp_provider_rejects_blank_host() {
        let provider = SmtpProvider::new("Broken", " ", Security::Tls);
        assert!(matches!(provider.properties(), Err(Error::Config(_))));

        let provider = SmtpProvider::new("Broken", "mail.example.com", Security::Tls).with_port(0);
        assert!(provider.properties().is_err());
    }

    #[test]
    fn raw_config_as_provider() {
        let config = TransportConfig::new().with(keys::HOST, "relay.local");
        assert_eq!(config.properties().unwrap(), config);
        assert!(TransportConfig::new().properties().is_err());
    }

    #[test]
    fn dyn_provider() {
        let providers: Vec<Box<dyn MailProvider>> = vec![
            Box::new(GmailProvider),
            Box::new(SmtpProvider::new("Other", "smtp.other.net", Security::None)),
        ];
        let hosts: Vec<String> = providers
            .iter()
            .map(|p| p.properties().unwrap().host().unwrap().to_string())
            .collect();
        assert_eq!(hosts, vec!["smtp.gmail.com", "smtp.other.net"]);
    }

    #[test]
    fn lookup_by_address() {
        let gmail = provider_for_address("someone@GMAIL.com").unwrap();
        assert_eq!(gmail.host, "smtp.gmail.com");
        assert_eq!(gmail.port, 465);

        let outlook = provider_for_address("someone@hotmail.com").unwrap();
        assert_eq!(outlook.security, Security::StartTls);
        assert_eq!(outlook.port, 587);

        assert_eq!(provider_for_address("someone@yahoo.com").unwrap().name, "Yahoo");
        assert_eq!(provider_for_address("someone@me.com").unwrap().name, "iCloud");
        assert!(provider_for_address("someone@example.org").is_none());
        assert!(provider_for_address("not-an-email").is_none());
    }
}
