//! The document store
//!
//! Opening a store validates its configuration and descriptors, generates the
//! engine schema and creates it. Transactions are then dispatched onto the
//! runtime's blocking pool, one session each, and their results delivered
//! either through a [`TransactionHandle`] or through a callback on a
//! [`CompletionExecutor`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use super::completion::{CompletionExecutor, Inline};
use super::config::StoreConfig;
use super::handle::TransactionHandle;
use super::model::schema_description;
use crate::engine::PersistenceEngine;
use crate::observability::{Logger, TracingLogger};
use crate::schema::{
    validate, AnyDocumentDescriptor, BoxError, DocumentStoreError, StoreResult,
    ValidatedDescriptors,
};
use crate::transaction::{
    Capability, CommitAction, ReadTransaction, ReadWriteTransaction, TransactionError,
    TransactionExecutor, TransactionResult,
};

/// Collaborators injected when opening a store.
pub struct StoreOptions {
    pub logger: Arc<dyn Logger>,
    /// Runtime whose blocking pool runs transactions, the current one if unset
    pub runtime: Option<Handle>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            logger: Arc::new(TracingLogger),
            runtime: None,
        }
    }
}

impl StoreOptions {
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            ..Self::default()
        }
    }
}

/// A typed document store over a persistence engine.
///
/// Cheap to clone; clones share the engine and descriptors.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    config: StoreConfig,
    engine: Arc<dyn PersistenceEngine>,
    descriptors: Arc<ValidatedDescriptors>,
    logger: Arc<dyn Logger>,
    runtime: Handle,
}

impl Store {
    /// Opens a store logging through `tracing` on the current runtime.
    pub fn open(
        config: StoreConfig,
        descriptors: Vec<AnyDocumentDescriptor>,
        engine: Arc<dyn PersistenceEngine>,
    ) -> StoreResult<Self> {
        Self::open_with(config, descriptors, engine, StoreOptions::default())
    }

    pub fn open_with(
        config: StoreConfig,
        descriptors: Vec<AnyDocumentDescriptor>,
        engine: Arc<dyn PersistenceEngine>,
        options: StoreOptions,
    ) -> StoreResult<Self> {
        let logger = options.logger;
        config.validate()?;
        let descriptors = validate(descriptors, logger.as_ref())?;

        let runtime = match options.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|err| {
                DocumentStoreError::operation_failed(
                    "A store must be opened within a tokio runtime or be given one.",
                )
                .with_source(err)
            })?,
        };

        let schema = schema_description(&config.identifier, &descriptors, logger.as_ref());
        if let Err(err) = engine.create_schema(&schema) {
            let error = DocumentStoreError::operation_failed(format!(
                "Failed to create the schema of store `{}`.",
                config.identifier
            ))
            .with_source(err);
            let message = error.to_string();
            logger.error(
                "STORE_OPEN_FAILED",
                &[("error", &message), ("identifier", &config.identifier)],
            );
            return Err(error);
        }

        let count = descriptors.len().to_string();
        logger.info(
            "STORE_OPENED",
            &[("descriptors", &count), ("identifier", &config.identifier)],
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                config,
                engine,
                descriptors: Arc::new(descriptors),
                logger,
                runtime,
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn descriptors(&self) -> &ValidatedDescriptors {
        &self.inner.descriptors
    }

    /// Runs `actions` in a read-only transaction. Changes are never saved.
    pub fn read<T, F>(&self, actions: F) -> TransactionHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut ReadTransaction<'_>) -> Result<T, BoxError> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.read_with(Inline, deliver(sender), actions);
        TransactionHandle::new(receiver)
    }

    /// Runs `actions` in a read-write transaction, saving if it says so.
    pub fn write<F>(&self, actions: F) -> TransactionHandle<()>
    where
        F: FnOnce(&mut ReadWriteTransaction<'_>) -> Result<CommitAction, BoxError> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.write_with(Inline, deliver(sender), actions);
        TransactionHandle::new(receiver)
    }

    /// Like [`write`](Self::write), but also returns a value.
    pub fn read_write<T, F>(&self, actions: F) -> TransactionHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut ReadWriteTransaction<'_>) -> Result<(CommitAction, T), BoxError>
            + Send
            + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.read_write_with(Inline, deliver(sender), actions);
        TransactionHandle::new(receiver)
    }

    /// Callback form of [`read`](Self::read); `on_result` runs on `executor`.
    pub fn read_with<T, E, H, F>(&self, executor: E, on_result: H, actions: F)
    where
        T: Send + 'static,
        E: CompletionExecutor,
        H: FnOnce(TransactionResult<T>) + Send + 'static,
        F: FnOnce(&mut ReadTransaction<'_>) -> Result<T, BoxError> + Send + 'static,
    {
        self.dispatch(
            Capability::Read,
            executor,
            on_result,
            move |transaction: &mut TransactionExecutor| {
                let mut transaction = ReadTransaction::new(transaction);
                actions(&mut transaction).map(|value| (CommitAction::DiscardChanges, value))
            },
        );
    }

    /// Callback form of [`write`](Self::write).
    pub fn write_with<E, H, F>(&self, executor: E, on_result: H, actions: F)
    where
        E: CompletionExecutor,
        H: FnOnce(TransactionResult<()>) + Send + 'static,
        F: FnOnce(&mut ReadWriteTransaction<'_>) -> Result<CommitAction, BoxError> + Send + 'static,
    {
        self.dispatch(
            Capability::ReadWrite,
            executor,
            on_result,
            move |transaction: &mut TransactionExecutor| {
                let mut transaction = ReadWriteTransaction::new(transaction);
                actions(&mut transaction).map(|action| (action, ()))
            },
        );
    }

    /// Callback form of [`read_write`](Self::read_write).
    pub fn read_write_with<T, E, H, F>(&self, executor: E, on_result: H, actions: F)
    where
        T: Send + 'static,
        E: CompletionExecutor,
        H: FnOnce(TransactionResult<T>) + Send + 'static,
        F: FnOnce(&mut ReadWriteTransaction<'_>) -> Result<(CommitAction, T), BoxError>
            + Send
            + 'static,
    {
        self.dispatch(
            Capability::ReadWrite,
            executor,
            on_result,
            move |transaction: &mut TransactionExecutor| {
                let mut transaction = ReadWriteTransaction::new(transaction);
                actions(&mut transaction)
            },
        );
    }

    fn dispatch<T, E, H, F>(&self, capability: Capability, executor: E, on_result: H, body: F)
    where
        T: Send + 'static,
        E: CompletionExecutor,
        H: FnOnce(TransactionResult<T>) + Send + 'static,
        F: FnOnce(&mut TransactionExecutor) -> Result<(CommitAction, T), BoxError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.inner.runtime.spawn_blocking(move || {
            let result = inner.run(capability, body);
            executor.execute(Box::new(move || on_result(result)));
        });
    }
}

impl StoreInner {
    fn run<T, F>(&self, capability: Capability, body: F) -> TransactionResult<T>
    where
        F: FnOnce(&mut TransactionExecutor) -> Result<(CommitAction, T), BoxError>,
    {
        let session = self.engine.open_session().map_err(|err| {
            let error = DocumentStoreError::operation_failed("Failed to open a transaction.")
                .with_source(err);
            let message = error.to_string();
            self.logger.error("TRANSACTION_OPEN_FAILED", &[("error", &message)]);
            error
        })?;

        let mut transaction = TransactionExecutor::new(
            session,
            Arc::clone(&self.descriptors),
            Arc::clone(&self.logger),
            capability,
        );
        if self.config.pin_snapshots {
            transaction.pin_snapshot();
        }

        let id = transaction.id().to_string();
        let kind = format!("{:?}", capability);
        self.logger.debug(
            "TRANSACTION_STARTED",
            &[("capability", &kind), ("transaction", &id)],
        );

        let (action, value) = body(&mut transaction).map_err(|err| {
            let error = TransactionError::action(err);
            let message = error.to_string();
            self.logger.debug(
                "TRANSACTION_ACTION_FAILED",
                &[("error", &message), ("transaction", &id)],
            );
            error
        })?;
        transaction.commit(action)?;

        let action = format!("{:?}", action);
        self.logger.debug(
            "TRANSACTION_FINISHED",
            &[("action", &action), ("transaction", &id)],
        );
        Ok(value)
    }
}

fn deliver<T: Send + 'static>(
    sender: oneshot::Sender<TransactionResult<T>>,
) -> impl FnOnce(TransactionResult<T>) + Send + 'static {
    move |result| {
        let _ = sender.send(result);
    }
}
