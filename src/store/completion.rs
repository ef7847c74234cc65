//! Where transaction results are delivered
//!
//! Transaction bodies always run on the store's background pool. The result
//! callback is handed to a [`CompletionExecutor`] chosen by the caller.

use std::sync::mpsc;

use tokio::runtime::Handle;

/// A result callback ready to run.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs result callbacks on a caller chosen context.
pub trait CompletionExecutor: Send + 'static {
    fn execute(&self, job: Job);
}

/// Runs the callback directly on the background thread that ran the transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl CompletionExecutor for Inline {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Runs the callback as a task on the given runtime.
impl CompletionExecutor for Handle {
    fn execute(&self, job: Job) {
        self.spawn(async move { job() });
    }
}

/// Sends the callback to whoever drains the channel, typically a UI or main loop.
///
/// The callback is dropped if the receiver is gone.
impl CompletionExecutor for mpsc::Sender<Job> {
    fn execute(&self, job: Job) {
        let _ = self.send(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_inline_runs_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        Inline.execute(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_defers_to_receiver() {
        let (sender, receiver) = mpsc::channel::<Job>();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        sender.execute(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let job = receiver.recv().unwrap();
        job();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_runtime_handle_spawns() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        Handle::current().execute(Box::new(move || {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.unwrap(), 42);
    }
}
