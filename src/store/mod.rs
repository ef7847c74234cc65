//! Store subsystem for docstore
//!
//! - [`StoreConfig`]: identifier and snapshot pinning, loadable from JSON
//! - [`schema_description`]: engine schema derived from the descriptors
//! - [`Store`]: opens over a [`PersistenceEngine`](crate::engine::PersistenceEngine)
//!   and schedules transactions
//! - [`TransactionHandle`] and [`CompletionExecutor`]: the two ways results
//!   come back

mod completion;
mod config;
mod document_store;
mod handle;
mod model;

pub use completion::{CompletionExecutor, Inline, Job};
pub use config::StoreConfig;
pub use document_store::{Store, StoreOptions};
pub use handle::TransactionHandle;
pub use model::schema_description;

pub use crate::transaction::CommitAction;
