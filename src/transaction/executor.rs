//! Transaction executor
//!
//! Runs count, fetch, delete and insert against one engine session, applies
//! decode recovery and governs the final commit.
//!
//! States: `Open` → `Committing` → `Closed`. No state is re-entered.
//!
//! Every operation first checks that the document type is registered with the
//! store, without touching the engine otherwise.

use std::sync::Arc;

use uuid::Uuid;

use super::compile;
use super::errors::{TransactionError, TransactionResult};
use crate::engine::{
    AttributeValue, Attributes, ComparisonOperator, EngineError, FetchSpec, Filter, Operand,
    RecordHandle, Session,
};
use crate::observability::Logger;
use crate::query::Query;
use crate::schema::{
    AnyDocumentDescriptor, AnyIndex, DeserializationError, Document, DocumentStoreError,
    Resolution, StorableValue, StoreResult, ValidatedDescriptors, DOCUMENT_DATA_ATTRIBUTE,
    DOCUMENT_IDENTIFIER_ATTRIBUTE,
};

/// Whether the caller signals the changes to be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitAction {
    SaveChanges,
    DiscardChanges,
}

/// How an insert treats an existing document with the same identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InsertMode {
    /// Insert, replacing any document with the same identifier
    #[default]
    AddOrReplace,
    /// Only replace an existing document, never add a new one
    ReplaceOnly,
    /// Only add, never replace an existing document
    AddOnly,
}

/// Operations a transaction is allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    ReadWrite,
}

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Open,
    Committing,
    Closed,
}

/// Executes operations for exactly one transaction.
pub struct TransactionExecutor {
    session: Box<dyn Session>,
    descriptors: Arc<ValidatedDescriptors>,
    logger: Arc<dyn Logger>,
    id: Uuid,
    capability: Capability,
    state: TransactionState,
}

impl TransactionExecutor {
    pub fn new(
        session: Box<dyn Session>,
        descriptors: Arc<ValidatedDescriptors>,
        logger: Arc<dyn Logger>,
        capability: Capability,
    ) -> Self {
        Self {
            session,
            descriptors,
            logger,
            id: Uuid::new_v4(),
            capability,
            state: TransactionState::Open,
        }
    }

    /// Returns the id used to correlate log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Pins the read snapshot. Failure only degrades isolation, so it is logged.
    pub fn pin_snapshot(&mut self) {
        if let Err(err) = self.session.pin_snapshot() {
            let id = self.id.to_string();
            let error = err.to_string();
            self.logger.warn(
                "TRANSACTION_PIN_FAILED",
                &[("transaction", &id), ("error", &error)],
            );
        }
    }

    /// Counts matching records, ignoring skip and limit
    pub fn count<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<usize> {
        self.ensure_open()?;
        let descriptor = self.ensure_registered::<D>()?;
        let spec = compile::count_spec(query);
        self.session
            .count(&spec)
            .map_err(|err| self.operation_failed("count", descriptor.name(), err).into())
    }

    /// Fetches and decodes matching documents
    pub fn fetch<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<Vec<D>> {
        self.ensure_open()?;
        let descriptor = self.ensure_registered::<D>()?;
        let spec = compile::fetch_spec(query, false);
        let records = match self.session.fetch(&spec) {
            Ok(records) => records,
            Err(err) => return Err(self.operation_failed("fetch", descriptor.name(), err).into()),
        };

        let mut documents = Vec::with_capacity(records.len());
        for record in records {
            let decoded = match record.attribute(DOCUMENT_DATA_ATTRIBUTE).and_then(AttributeValue::as_binary) {
                Some(data) => D::decode(data),
                None => {
                    let corruption = DocumentStoreError::data_corruption(
                        descriptor.name(),
                        format!("attribute `{}` is missing or not binary", DOCUMENT_DATA_ATTRIBUTE),
                    );
                    self.log_error("DOCUMENT_DATA_CORRUPT", descriptor.name(), &corruption);
                    Err(DeserializationError::skip(corruption))
                }
            };

            let err = match decoded {
                Ok(document) => {
                    documents.push(document);
                    continue;
                }
                Err(err) => err,
            };

            self.log_recovery(descriptor.name(), &err);
            match err.resolution() {
                Resolution::SkipDocument => {}
                Resolution::DeleteDocument => self.delete_unreadable(descriptor.name(), record.handle)?,
                Resolution::AbortOperation => {
                    return Err(TransactionError::SerializationFailed(err.into_source()));
                }
            }
        }

        Ok(documents)
    }

    /// Deletes matching records without decoding them
    pub fn delete<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<usize> {
        self.ensure_open()?;
        let descriptor = self.ensure_registered::<D>()?;
        self.ensure_writable("delete")?;
        let handles = self.matching_handles(descriptor.name(), &compile::fetch_spec(query, true))?;
        for handle in &handles {
            self.delete_handle(descriptor.name(), *handle)?;
        }
        Ok(handles.len())
    }

    /// Deletes the document with the same identifier as `document`
    pub fn delete_document<D: Document>(&mut self, document: &D) -> TransactionResult<bool> {
        self.ensure_open()?;
        let descriptor = self.ensure_registered::<D>()?;
        self.ensure_writable("delete a document")?;
        let identifier = D::descriptor().identifier().ok_or_else(|| {
            DocumentStoreError::index_not_registered(descriptor.name(), DOCUMENT_IDENTIFIER_ATTRIBUTE)
        })?;
        let value = resolve_required(identifier, document, descriptor.name())?;
        let handles = self.handles_with_identifier(descriptor.name(), value)?;
        for handle in &handles {
            self.delete_handle(descriptor.name(), *handle)?;
        }
        Ok(!handles.is_empty())
    }

    /// Inserts a document, returns whether it was written
    pub fn insert<D: Document>(&mut self, document: &D, mode: InsertMode) -> TransactionResult<bool> {
        self.ensure_open()?;
        let descriptor = self.ensure_registered::<D>()?;
        self.ensure_writable("insert")?;
        let name = descriptor.name();

        let data = document.encode().map_err(TransactionError::SerializationFailed)?;
        let mut attributes = Attributes::new();
        attributes.insert(DOCUMENT_DATA_ATTRIBUTE.to_string(), AttributeValue::Binary(data));

        let existing = match D::descriptor().identifier() {
            Some(identifier) => {
                let value = resolve_required(identifier, document, name)?;
                attributes.insert(identifier.name().to_string(), AttributeValue::Value(value.clone()));
                self.handles_with_identifier(name, value)?
            }
            None => Vec::new(),
        };

        for index in D::descriptor().indices() {
            match index.resolve(document) {
                Some(value) => {
                    attributes.insert(index.name().to_string(), AttributeValue::Value(value));
                }
                None if index.storage_information().is_optional => {}
                None => return Err(missing_value(name, index.name())),
            }
        }

        let write = match mode {
            InsertMode::AddOrReplace => true,
            InsertMode::ReplaceOnly => !existing.is_empty(),
            InsertMode::AddOnly => existing.is_empty(),
        };
        if !write {
            return Ok(false);
        }

        for handle in &existing {
            self.delete_handle(name, *handle)?;
        }
        if let Err(err) = self.session.insert(name, attributes) {
            return Err(self.operation_failed("insert", name, err).into());
        }
        Ok(true)
    }

    /// Finishes the transaction, saving changes when asked and present
    pub fn commit(&mut self, action: CommitAction) -> TransactionResult<()> {
        self.ensure_open()?;
        if action == CommitAction::DiscardChanges || self.capability == Capability::Read {
            self.state = TransactionState::Closed;
            return Ok(());
        }

        self.state = TransactionState::Committing;
        let saved = if self.session.has_changes() {
            self.session.save()
        } else {
            Ok(())
        };
        self.state = TransactionState::Closed;

        saved.map_err(|err| {
            let error = DocumentStoreError::operation_failed(
                "Failed to save changes from a transaction to the store.",
            )
            .with_source(err);
            let id = self.id.to_string();
            let message = error.to_string();
            self.logger.error(
                "TRANSACTION_SAVE_FAILED",
                &[("error", &message), ("transaction", &id)],
            );
            TransactionError::SaveFailed(error)
        })
    }

    fn ensure_open(&self) -> StoreResult<()> {
        match self.state {
            TransactionState::Open => Ok(()),
            _ => Err(DocumentStoreError::operation_failed(
                "The transaction is no longer open.",
            )),
        }
    }

    fn ensure_writable(&self, operation: &str) -> StoreResult<()> {
        match self.capability {
            Capability::ReadWrite => Ok(()),
            Capability::Read => Err(DocumentStoreError::operation_failed(format!(
                "Cannot {} in a read-only transaction.",
                operation
            ))),
        }
    }

    fn ensure_registered<D: Document>(&self) -> StoreResult<AnyDocumentDescriptor> {
        let descriptor = D::descriptor().erase();
        if self.descriptors.contains(&descriptor) {
            Ok(descriptor)
        } else {
            Err(DocumentStoreError::not_registered(descriptor.name()))
        }
    }

    fn matching_handles(
        &mut self,
        document: &str,
        spec: &FetchSpec,
    ) -> TransactionResult<Vec<RecordHandle>> {
        match self.session.fetch(spec) {
            Ok(records) => Ok(records.into_iter().map(|record| record.handle).collect()),
            Err(err) => Err(self.operation_failed("fetch", document, err).into()),
        }
    }

    fn handles_with_identifier(
        &mut self,
        document: &str,
        value: StorableValue,
    ) -> TransactionResult<Vec<RecordHandle>> {
        let mut spec = FetchSpec::all(document);
        spec.filter = Some(Filter::Comparison {
            left: Operand::Attribute(DOCUMENT_IDENTIFIER_ATTRIBUTE.to_string()),
            op: ComparisonOperator::EqualTo,
            right: Operand::Constant(value),
        });
        spec.keys_only = true;
        self.matching_handles(document, &spec)
    }

    fn delete_handle(&mut self, document: &str, handle: RecordHandle) -> TransactionResult<()> {
        match self.session.delete(handle) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.operation_failed("delete", document, err).into()),
        }
    }

    fn delete_unreadable(&mut self, document: &str, handle: RecordHandle) -> TransactionResult<()> {
        if self.capability == Capability::Read {
            let id = self.id.to_string();
            let record = handle.value().to_string();
            self.logger.warn(
                "DELETE_RESOLUTION_DISCARDED",
                &[("document", document), ("record", &record), ("transaction", &id)],
            );
            return Ok(());
        }
        self.delete_handle(document, handle)
    }

    fn operation_failed(&self, operation: &str, document: &str, err: EngineError) -> DocumentStoreError {
        let error = DocumentStoreError::operation_failed(format!(
            "Failed to {} `{}` documents.",
            operation, document
        ))
        .with_source(err);
        self.log_error("TRANSACTION_OPERATION_FAILED", document, &error);
        error
    }

    fn log_error(&self, event: &str, document: &str, error: &DocumentStoreError) {
        let id = self.id.to_string();
        let message = error.to_string();
        self.logger.error(
            event,
            &[("document", document), ("error", &message), ("transaction", &id)],
        );
    }

    fn log_recovery(&self, document: &str, err: &DeserializationError) {
        let id = self.id.to_string();
        let resolution = err.resolution().to_string();
        let cause = err.cause().to_string();
        self.logger.warn(
            "DOCUMENT_DECODE_FAILED",
            &[
                ("document", document),
                ("error", &cause),
                ("resolution", &resolution),
                ("transaction", &id),
            ],
        );
    }
}

fn resolve_required<D>(
    index: &AnyIndex<D>,
    document: &D,
    descriptor: &str,
) -> TransactionResult<StorableValue> {
    index
        .resolve(document)
        .ok_or_else(|| missing_value(descriptor, index.name()))
}

fn missing_value(descriptor: &str, index: &str) -> TransactionError {
    TransactionError::SerializationFailed(Box::new(DocumentStoreError::operation_failed(format!(
        "Index `{}` of `{}` resolved to no value but is not optional.",
        index, descriptor
    ))))
}
