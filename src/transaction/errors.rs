//! # Transaction Errors

use std::error::Error as StdError;

use thiserror::Error;

use crate::schema::{BoxError, DocumentStoreError, ErrorKind};

/// Result type delivered for every transaction
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Transaction errors
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The action returned an error of its own, carried unwrapped
    #[error("Transaction action failed: {0}")]
    ActionFailed(#[source] BoxError),

    /// Encoding or decoding a document failed
    #[error("Document serialization failed: {0}")]
    SerializationFailed(#[source] BoxError),

    /// Committing the changes failed
    #[error("Saving transaction changes failed: {0}")]
    SaveFailed(#[source] DocumentStoreError),

    #[error(transparent)]
    Store(#[from] DocumentStoreError),
}

impl TransactionError {
    /// Wraps an error returned by a transaction action.
    ///
    /// Store and transaction errors raised inside the action pass through as
    /// they are; anything else becomes `ActionFailed`.
    pub fn action(error: BoxError) -> Self {
        let error = match error.downcast::<TransactionError>() {
            Ok(error) => return *error,
            Err(error) => error,
        };
        match error.downcast::<DocumentStoreError>() {
            Ok(error) => TransactionError::Store(*error),
            Err(error) => TransactionError::ActionFailed(error),
        }
    }

    /// Returns the action's own error, if it is of type `E`
    pub fn action_error<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            TransactionError::ActionFailed(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns the store error, if any
    pub fn store_error(&self) -> Option<&DocumentStoreError> {
        match self {
            TransactionError::Store(error) | TransactionError::SaveFailed(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the store error kind, if any
    pub fn kind(&self) -> Option<ErrorKind> {
        self.store_error().map(DocumentStoreError::kind)
    }
}
