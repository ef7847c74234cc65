//! Awaitable transaction results

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::schema::DocumentStoreError;
use crate::transaction::{TransactionError, TransactionResult};

/// Single-shot result of a dispatched transaction.
///
/// Await it from async code or call [`blocking_wait`](Self::blocking_wait)
/// from a thread outside the runtime.
#[derive(Debug)]
pub struct TransactionHandle<T> {
    receiver: oneshot::Receiver<TransactionResult<T>>,
}

impl<T> TransactionHandle<T> {
    pub(crate) fn new(receiver: oneshot::Receiver<TransactionResult<T>>) -> Self {
        Self { receiver }
    }

    /// Blocks the current thread until the result arrives.
    ///
    /// Panics when called from within an async runtime.
    pub fn blocking_wait(self) -> TransactionResult<T> {
        self.receiver.blocking_recv().unwrap_or_else(|_| Err(terminated()))
    }
}

impl<T> Future for TransactionHandle<T> {
    type Output = TransactionResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(terminated())))
    }
}

fn terminated() -> TransactionError {
    DocumentStoreError::operation_failed("The transaction terminated without delivering a result.")
        .into()
}
