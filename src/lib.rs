//! docstore - A typed document store over a pluggable persistence engine
//!
//! Documents declare their indices through descriptors, are queried with
//! typed predicates and are read and written inside isolated transactions.

pub mod engine;
pub mod observability;
pub mod query;
pub mod schema;
pub mod store;
pub mod transaction;

pub use observability::init_tracing;
pub use query::{Expression, Predicate, Query, SortKey};
pub use schema::{
    Document, DocumentDescriptor, DocumentStoreError, ErrorKind, Identifier, Index, Resolution,
    StoreResult,
};
pub use store::{CommitAction, Store, StoreConfig, StoreOptions, TransactionHandle};
pub use transaction::{InsertMode, Readable, TransactionError, TransactionResult, Writable};
