//! Sending composed mail through an authenticated transport.

use std::future::Future;
use std::sync::{Arc, Weak};

use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::compose;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::model::Mail;
use crate::provider::{AuthMechanism, GmailProvider, MailProvider, Security, TransportConfig};

/// Final hop that delivers a composed message to the outbound relay.
pub trait MailTransport: Send + Sync + 'static {
    /// Delivers `message`. Success means the relay accepted it.
    fn deliver(&self, message: Message) -> impl Future<Output = Result<()>> + Send;
}

/// SMTP transport backed by `lettre`.
pub type SmtpRelay = AsyncSmtpTransport<Tokio1Executor>;

impl MailTransport for SmtpRelay {
    async fn deliver(&self, message: Message) -> Result<()> {
        let response = self.send(message).await?;
        debug!("Relay answered {}", response.code());
        Ok(())
    }
}

/// Receives the outcome of [`MailSender::send_mail_async`].
pub trait SendListener: Send + Sync {
    /// The relay accepted the message.
    fn on_success(&self);

    /// Composing or sending failed.
    fn on_error(&self, error: Error);
}

/// Builds the SMTP transport described by `config`.
///
/// No connection is made until the first send.
///
/// # Errors
///
/// Returns an error if the configuration is incomplete or TLS parameters
/// cannot be built for the host.
pub fn smtp_relay(config: &TransportConfig, username: &str, password: &str) -> Result<SmtpRelay> {
    let host = config.host()?;
    let port = config.port()?;
    let timeout = config.timeout()?;
    let mechanisms = config.mechanisms()?;

    let builder = match config.security() {
        Security::Tls => SmtpRelay::relay(host)?,
        Security::StartTls => SmtpRelay::starttls_relay(host)?,
        Security::None => SmtpRelay::builder_dangerous(host),
    };

    let mut builder = builder.port(port);
    if timeout.is_some() {
        builder = builder.timeout(timeout);
    }
    if config.auth_required() {
        builder = builder.credentials(Credentials::new(username.to_string(), password.to_string()));
        if !mechanisms.is_empty() {
            builder = builder.authentication(mechanisms.into_iter().map(mechanism).collect());
        }
    }

    Ok(builder.build())
}

const fn mechanism(mechanism: AuthMechanism) -> Mechanism {
    match mechanism {
        AuthMechanism::Plain => Mechanism::Plain,
        AuthMechanism::Login => Mechanism::Login,
        AuthMechanism::Xoauth2 => Mechanism::Xoauth2,
    }
}

/// Long-lived mail sender bound to one account.
///
/// Cloning is cheap; clones share the same transport.
pub struct MailSender<T = SmtpRelay> {
    username: String,
    config: TransportConfig,
    transport: Arc<T>,
}

impl<T> Clone for MailSender<T> {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> std::fmt::Debug for MailSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSender")
            .field("username", &self.username)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MailSender<SmtpRelay> {
    /// Creates a sender for a Gmail account.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be configured.
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self> {
        Self::with_provider(username, password, &GmailProvider)
    }

    /// Creates a sender using `provider`'s relay settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider configuration is invalid.
    pub fn with_provider<P>(username: impl Into<String>, password: &str, provider: &P) -> Result<Self>
    where
        P: MailProvider + ?Sized,
    {
        let username = username.into();
        let config = provider.properties()?;
        let transport = smtp_relay(&config, &username, password)?;
        debug!(
            "Configured {} transport {}:{} ({})",
            provider.name(),
            config.host()?,
            config.port()?,
            config.security().display_name()
        );
        Ok(Self::with_transport(username, config, transport))
    }
}

impl<T: MailTransport> MailSender<T> {
    /// Creates a sender over an already built transport.
    #[must_use]
    pub fn with_transport(username: impl Into<String>, config: TransportConfig, transport: T) -> Self {
        Self {
            username: username.into(),
            config,
            transport: Arc::new(transport),
        }
    }

    /// Account the sender authenticates as.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Transport configuration captured at construction.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Composes `mail` and sends it, returning once the relay has answered.
    ///
    /// # Errors
    ///
    /// Returns an address, attachment, message or transport error. Composition
    /// errors are reported before any network activity.
    pub async fn send_mail(&self, mail: &Mail) -> Result<()> {
        let message = compose::build_message(mail).await?;
        match self.transport.deliver(message).await {
            Ok(()) => {
                info!("Mail \"{}\" accepted for {}", mail.subject(), self.username);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to send mail \"{}\": {e}", mail.subject());
                Err(e)
            }
        }
    }

    /// Sends `mail` on a background task and reports back through `dispatcher`.
    ///
    /// Returns immediately. Once the send finishes, one completion is posted
    /// to the dispatcher's queue; running it calls exactly one of
    /// [`SendListener::on_success`] or [`SendListener::on_error`]. Only a weak
    /// reference to `listener` is kept, so if it has been dropped by then the
    /// outcome is discarded silently.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn send_mail_async<L>(
        &self,
        mail: Mail,
        listener: &Arc<L>,
        dispatcher: &Dispatcher,
    ) -> JoinHandle<()>
    where
        L: SendListener + 'static,
    {
        let sender = self.clone();
        let listener: Weak<L> = Arc::downgrade(listener);
        let dispatcher = dispatcher.clone();

        tokio::spawn(async move {
            let result = sender.send_mail(&mail).await;
            let posted = dispatcher.post(move || {
                let Some(listener) = listener.upgrade() else {
                    return;
                };
                match result {
                    Ok(()) => listener.on_success(),
                    Err(e) => listener.on_error(e),
                }
            });
            if posted {
                debug!("Posted send result for \"{}\"", mail.subject());
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::provider::{SmtpProvider, keys};

    fn smtp_config(security: &str) -> TransportConfig {
        TransportConfig::new()
            .with(keys::HOST, "smtp.example.com")
            .with(keys::AUTH, "true")
            .with(security, "true")
    }

    #[test]
    fn relay_requires_host() {
        let err = smtp_relay(&TransportConfig::new(), "u", "p").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn relay_rejects_bad_mechanism() {
        let config = smtp_config(keys::STARTTLS_ENABLE).with(keys::AUTH_MECHANISMS, "NTLM");
        assert!(matches!(smtp_relay(&config, "u", "p"), Err(Error::Config(_))));
    }

    #[test]
    fn mechanism_mapping() {
        assert_eq!(mechanism(AuthMechanism::Plain), Mechanism::Plain);
        assert_eq!(mechanism(AuthMechanism::Login), Mechanism::Login);
        assert_eq!(mechanism(AuthMechanism::Xoauth2), Mechanism::Xoauth2);
    }

    #[test]
    fn provider_errors_surface() {
        let provider = SmtpProvider::new("Nowhere", "", Security::Tls);
        assert!(matches!(
            MailSender::with_provider("me@example.com", "pw", &provider),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn plaintext_relay_builds() {
        let config = TransportConfig::new()
            .with(keys::HOST, "localhost")
            .with(keys::PORT, "2525");
        let sender = MailSender::with_provider("me@example.com", "pw", &config).unwrap();
        assert_eq!(sender.username(), "me@example.com");
        assert_eq!(sender.config().port().unwrap(), 2525);
    }
}
