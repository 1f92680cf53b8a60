//! Shared test doubles.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use lettre::Message;
use mailsend::{Error, MailTransport, Result, SendListener};

/// Transport that records messages instead of talking to a relay.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Message>>,
    /// Subjects that the fake relay rejects.
    reject_subjects: Vec<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(subject: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_subjects: vec![subject.to_string()],
        }
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl MailTransport for RecordingTransport {
    async fn deliver(&self, message: Message) -> Result<()> {
        let subject = message
            .headers()
            .get_raw("Subject")
            .unwrap_or_default()
            .to_string();
        if self.reject_subjects.contains(&subject) {
            return Err(Error::transport(format!("550 rejected: {subject}")));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Listener that counts callbacks.
#[derive(Default)]
pub struct CountingListener {
    pub successes: AtomicUsize,
    pub errors: AtomicUsize,
    pub last_error: Mutex<Option<String>>,
}

impl CountingListener {
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

impl SendListener for CountingListener {
    fn on_success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, error: Error) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        *self.last_error.lock().unwrap() = Some(error.to_string());
    }
}

/// Listener whose callback count lives outside it, so callbacks stay
/// observable after the listener itself is dropped.
pub struct SharedCounterListener {
    hits: Arc<AtomicUsize>,
}

impl SharedCounterListener {
    pub fn new(hits: &Arc<AtomicUsize>) -> Self {
        Self {
            hits: Arc::clone(hits),
        }
    }
}

impl SendListener for SharedCounterListener {
    fn on_success(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, _error: Error) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}
