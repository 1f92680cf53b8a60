//! Mapping a [`Mail`] onto a transport-layer message.
//!
//! Parts are added in a fixed order: text, html, then attachments, all inside
//! a plain `multipart/mixed` container.

use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as AttachmentPart, Mailbox, MultiPart, SinglePart};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Attachment, Mail, RecipientType};

/// Builds the message for `mail`.
///
/// The sender is parsed before anything else, and every attachment is read
/// before the message is handed back, so a failure here never reaches the
/// network.
///
/// # Errors
///
/// - [`Error::Address`] for a malformed sender or recipient
/// - [`Error::Attachment`] if an attachment file cannot be read
/// - [`Error::Message`] if the message cannot be assembled (no recipients)
pub async fn build_message(mail: &Mail) -> Result<Message> {
    let sender: Mailbox = mail.sender().parse()?;

    let mut builder = Message::builder()
        .from(sender.clone())
        .sender(sender)
        .subject(mail.subject());

    for recipient in mail.recipients() {
        let mailbox: Mailbox = recipient.address().parse()?;
        builder = match recipient.kind() {
            RecipientType::To => builder.to(mailbox),
            RecipientType::Cc => builder.cc(mailbox),
            RecipientType::Bcc => builder.bcc(mailbox),
        };
    }

    let body = build_body(mail).await?;
    debug!(
        "Composed message with {} recipient(s) and {} attachment(s)",
        mail.recipients().len(),
        mail.attachments().len()
    );
    Ok(builder.multipart(body)?)
}

/// Assembles the multipart body container.
///
/// # Errors
///
/// Returns an error if an attachment cannot be read.
pub async fn build_body(mail: &Mail) -> Result<MultiPart> {
    let mut body = MultiPart::mixed().build();

    if let Some(text) = mail.text() {
        body = body.singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text.to_string()),
        );
    }

    if let Some(html) = mail.html() {
        body = body.singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html.to_string()),
        );
    }

    for attachment in mail.attachments() {
        body = body.singlepart(attachment_part(attachment).await?);
    }

    Ok(body)
}

async fn attachment_part(attachment: &Attachment) -> Result<SinglePart> {
    let content = tokio::fs::read(attachment.path())
        .await
        .map_err(|source| Error::Attachment {
            path: attachment.path().to_path_buf(),
            source,
        })?;
    let content_type = content_type_for(attachment.filename());
    Ok(AttachmentPart::new(attachment.filename().to_string()).body(content, content_type))
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Guesses the content type from the filename extension, falling back to
/// `application/octet-stream`.
fn content_type_for(filename: &str) -> ContentType {
    let guessed = mime_guess::from_path(filename).first_or_octet_stream();
    ContentType::parse(guessed.essence_str())
        .or_else(|_| ContentType::parse(OCTET_STREAM))
        .unwrap_or(ContentType::TEXT_PLAIN)
}
