//! # mailsend
//!
//! Compose MIME email and send it over SMTP with provider settings already
//! filled in.
//!
//! The crate only builds the message and hands it to `lettre`; the SMTP
//! exchange, TLS and MIME encoding all happen there.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailsend::{Mail, MailSender, Recipient};
//!
//! #[tokio::main]
//! async fn main() -> mailsend::Result<()> {
//!     let password = mailsend::credentials::get_password("me@gmail.com")?.unwrap_or_default();
//!     let sender = MailSender::new("me@gmail.com", &password)?;
//!
//!     let mail = Mail::builder()
//!         .sender("me@gmail.com")
//!         .recipient(Recipient::new("you@example.com"))
//!         .subject("Hello")
//!         .text("Ciao")
//!         .html("<h1>Ciao</h1>")
//!         .build();
//!
//!     sender.send_mail(&mail).await
//! }
//! ```
//!
//! ## Background sends
//!
//! [`MailSender::send_mail_async`] runs the send on a Tokio task and posts the
//! outcome to a [`dispatch::CallbackQueue`] owned by the caller. Listeners are
//! held weakly: drop the listener and the outcome is discarded.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod credentials;
pub mod dispatch;
mod error;
pub mod model;
pub mod provider;
mod sender;

pub use dispatch::{CallbackQueue, Dispatcher};
pub use error::{Error, Result};
pub use model::{Attachment, Mail, MailBuilder, Recipient, RecipientType};
pub use provider::{
    GmailProvider, MailProvider, Security, SmtpProvider, TransportConfig, provider_for_address,
};
pub use sender::{MailSender, MailTransport, SendListener, SmtpRelay, smtp_relay};
