//! Mail aggregate and its builder.

use serde::{Deserialize, Serialize};

use super::{Attachment, Recipient};

/// A message ready to be composed and sent.
///
/// Built with [`Mail::builder`]. Fields are read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mail {
    sender: String,
    subject: String,
    text: Option<String>,
    html: Option<String>,
    recipients: Vec<Recipient>,
    attachments: Vec<Attachment>,
}

impl Mail {
    /// Starts a new builder.
    #[must_use]
    pub fn builder() -> MailBuilder {
        MailBuilder::default()
    }

    /// Sender address, unparsed.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Plain-text body.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// HTML body.
    #[must_use]
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Recipients in insertion order.
    #[must_use]
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Attachments in insertion order.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns true if neither a text nor an HTML body is set.
    #[must_use]
    pub const fn has_no_body(&self) -> bool {
        self.text.is_none() && self.html.is_none()
    }
}

/// Fluent builder for [`Mail`].
///
/// Setters replace, `recipient`/`attachment` append. Nothing is validated.
#[derive(Debug, Clone, Default)]
pub struct MailBuilder {
    mail: Mail,
}

impl MailBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender address.
    #[must_use]
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.mail.sender = sender.into();
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.mail.subject = subject.into();
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.mail.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.mail.html = Some(html.into());
        self
    }

    /// Appends a recipient.
    #[must_use]
    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.mail.recipients.push(recipient);
        self
    }

    /// Appends an attachment.
    #[must_use]
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.mail.attachments.push(attachment);
        self
    }

    /// Finishes the mail.
    #[must_use]
    pub fn build(self) -> Mail {
        self.mail
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::needless_collect,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::model::RecipientType;
    use proptest::prelude::*;

    #[test]
    fn empty_builder() {
        let mail = Mail::builder().build();
        assert_eq!(mail.sender(), "");
        assert_eq!(mail.subject(), "");
        assert!(mail.has_no_body());
        assert!(mail.recipients().is_empty());
        assert!(mail.attachments().is_empty());
    }

    #[test]
    fn sample_mail() {
        let mail = Mail::builder()
            .sender("me@gmail.com")
            .recipient(Recipient::new("you@example.com"))
            .text("Ciao")
            .html("<h1 style=\"color:red;\">Ciao</h1>")
            .build();

        assert_eq!(mail.sender(), "me@gmail.com");
        assert_eq!(mail.text(), Some("Ciao"));
        assert_eq!(mail.html(), Some("<h1 style=\"color:red;\">Ciao</h1>"));
        assert_eq!(mail.recipients().len(), 1);
        assert!(!mail.has_no_body());
    }

    #[test]
    fn setters_replace() {
        let mail = Mail::builder().subject("first").subject("second").build();
        assert_eq!(mail.subject(), "second");
    }

    fn recipient_strategy() -> impl Strategy<Value = Recipient> {
        (
            "[a-z]{1,8}@[a-z]{1,8}\\.com",
            prop_oneof![
                Just(RecipientType::To),
                Just(RecipientType::Cc),
                Just(RecipientType::Bcc)
            ],
        )
            .prop_map(|(address, kind)| Recipient::with_type(address, kind))
    }

    proptest! {
        #[test]
        fn build_preserves_fields(
            sender in ".*",
            subject in ".*",
            text in proptest::option::of(".*"),
            html in proptest::option::of(".*"),
            recipients in proptest::collection::vec(recipient_strategy(), 0..8),
            files in proptest::collection::vec(("[a-z/]{1,16}", "[a-z]{1,8}\\.txt"), 0..5),
        ) {
            let mut builder = Mail::builder().sender(sender.clone()).subject(subject.clone());
            if let Some(text) = &text {
                builder = builder.text(text.clone());
            }
            if let Some(html) = &html {
                builder = builder.html(html.clone());
            }
            for r in &recipients {
                builder = builder.recipient(r.clone());
            }
            let attachments: Vec<Attachment> = files
                .iter()
                .map(|(path, name)| Attachment::new(path.as_str(), name.as_str()))
                .collect();
            for a in &attachments {
                builder = builder.attachment(a.clone());
            }

            let mail = builder.build();
            prop_assert_eq!(mail.sender(), sender.as_str());
            prop_assert_eq!(mail.subject(), subject.as_str());
            prop_assert_eq!(mail.text(), text.as_deref());
            prop_assert_eq!(mail.html(), html.as_deref());
            prop_assert_eq!(mail.recipients(), recipients.as_slice());
            prop_assert_eq!(mail.attachments(), attachments.as_slice());
        }
    }
}
