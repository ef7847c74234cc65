//! Read and read-write views on a transaction
//!
//! One executor backs both. `Store::read` hands out a [`ReadTransaction`],
//! `Store::write` and `Store::read_write` a [`ReadWriteTransaction`]. Neither
//! may be kept beyond the action it was handed to.

use super::errors::TransactionResult;
use super::executor::{InsertMode, TransactionExecutor};
use crate::query::Query;
use crate::schema::Document;

/// Operations available in every transaction.
pub trait Readable {
    /// Number of documents matching the query; skip and limit are ignored
    fn count<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<usize>;

    /// Documents matching the query, decoded
    fn fetch<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<Vec<D>>;
}

/// Operations that change the store, saved only on `CommitAction::SaveChanges`.
pub trait Writable: Readable {
    /// Inserts a document; returns whether it was written
    fn insert<D: Document>(&mut self, document: &D, mode: InsertMode) -> TransactionResult<bool>;

    /// Deletes every document matching the query; returns the number deleted
    fn delete<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<usize>;

    /// Deletes the document with the same identifier; returns whether one existed
    fn delete_document<D: Document>(&mut self, document: &D) -> TransactionResult<bool>;

    /// Inserts a document, replacing any with the same identifier
    fn add<D: Document>(&mut self, document: &D) -> TransactionResult<bool> {
        self.insert(document, InsertMode::AddOrReplace)
    }
}

/// Transaction handed to read actions.
pub struct ReadTransaction<'a> {
    executor: &'a mut TransactionExecutor,
}

impl<'a> ReadTransaction<'a> {
    pub fn new(executor: &'a mut TransactionExecutor) -> Self {
        Self { executor }
    }

    /// Returns the id used in log lines
    pub fn id(&self) -> uuid::Uuid {
        self.executor.id()
    }
}

impl Readable for ReadTransaction<'_> {
    fn count<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<usize> {
        self.executor.count(query)
    }

    fn fetch<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<Vec<D>> {
        self.executor.fetch(query)
    }
}

/// Transaction handed to write and read-write actions.
pub struct ReadWriteTransaction<'a> {
    executor: &'a mut TransactionExecutor,
}

impl<'a> ReadWriteTransaction<'a> {
    pub fn new(executor: &'a mut TransactionExecutor) -> Self {
        Self { executor }
    }

    /// Returns the id used in log lines
    pub fn id(&self) -> uuid::Uuid {
        self.executor.id()
    }
}

impl Readable for ReadWriteTransaction<'_> {
    fn count<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<usize> {
        self.executor.count(query)
    }

    fn fetch<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<Vec<D>> {
        self.executor.fetch(query)
    }
}

impl Writable for ReadWriteTransaction<'_> {
    fn insert<D: Document>(&mut self, document: &D, mode: InsertMode) -> TransactionResult<bool> {
        self.executor.insert(document, mode)
    }

    fn delete<D: Document>(&mut self, query: &Query<D>) -> TransactionResult<usize> {
        self.executor.delete(query)
    }

    fn delete_document<D: Document>(&mut self, document: &D) -> TransactionResult<bool> {
        self.executor.delete_document(document)
    }
}
