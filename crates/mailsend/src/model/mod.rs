//! Mail value types.
//!
//! A [`Mail`] is assembled once through [`MailBuilder`] and is immutable
//! afterwards. Nothing here validates addresses or bodies; those errors are
//! reported when the mail is composed for sending.

mod attachment;
mod mail;
mod recipient;

pub use attachment::Attachment;
pub use mail::{Mail, MailBuilder};
pub use recipient::{Recipient, RecipientType};
