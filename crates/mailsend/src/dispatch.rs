//! Delivery of background results back onto the caller's task.
//!
//! Background sends never call listeners directly. They post a completion
//! through a [`Dispatcher`], and the owner of the matching [`CallbackQueue`]
//! runs it on its own task, the way a UI thread drains its event loop.
//!
//! ```ignore
//! let (dispatcher, mut queue) = mailsend::dispatch::channel();
//! sender.send_mail_async(mail, &listener, &dispatcher);
//! queue.dispatch_next().await;
//! ```

use tokio::sync::mpsc;

/// A unit of work to run on the caller's task.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Creates a connected dispatcher/queue pair.
#[must_use]
pub fn channel() -> (Dispatcher, CallbackQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Dispatcher { tx }, CallbackQueue { rx })
}

/// Sending half, cloned into background tasks.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Completion>,
}

impl Dispatcher {
    /// Queues `completion` for the caller.
    ///
    /// Returns `false` if the queue has been dropped; the completion is
    /// discarded in that case.
    pub fn post(&self, completion: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(completion)).is_ok()
    }

    /// Returns `true` once the receiving queue is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the caller's execution context.
#[derive(Debug)]
pub struct CallbackQueue {
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl CallbackQueue {
    /// Waits for the next completion and runs it.
    ///
    /// Returns `false` when every [`Dispatcher`] has been dropped and the
    /// queue is empty.
    pub async fn dispatch_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(completion) => {
                completion();
                true
            }
            None => false,
        }
    }

    /// Runs every completion that is already queued, without waiting.
    ///
    /// Returns how many were run.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(completion) = self.rx.try_recv() {
            completion();
            count += 1;
        }
        count
    }

    /// Runs completions until every [`Dispatcher`] is dropped.
    pub async fn run(mut self) {
        while self.dispatch_next().await {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn runs_in_post_order() {
        let (dispatcher, mut queue) = channel();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            assert!(dispatcher.post(move || seen.lock().unwrap().push(i)));
        }

        assert_eq!(queue.dispatch_pending(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(queue.dispatch_pending(), 0);
    }

    #[tokio::test]
    async fn completions_wait_for_the_queue() {
        let (dispatcher, mut queue) = channel();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        dispatcher.post(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        // Nothing runs until the owner drains the queue.
        assert_eq!(count.load(Ordering::SeqCst), 0);

        assert!(queue.dispatch_next().await);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_queue_drops_completions() {
        let (dispatcher, queue) = channel();
        drop(queue);
        assert!(dispatcher.is_closed());
        assert!(!dispatcher.post(|| unreachable!()));
    }

    #[tokio::test]
    async fn run_ends_when_dispatchers_drop() {
        let (dispatcher, queue) = channel();
        let count = Arc::new(AtomicUsize::new(0));

        let worker = {
            let count = Arc::clone(&count);
            tokio::spawn(async move {
                for _ in 0..4 {
                    let count = Arc::clone(&count);
                    dispatcher.post(move || {
                        count.fetch_add(1, Ordering::SeqCst);
                    });
                }
            })
        };

        worker.await.unwrap();
        queue.run().await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }
}
