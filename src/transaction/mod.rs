//! Transaction subsystem for docstore
//!
//! A transaction is bound to one engine session and one validated descriptor
//! set. Callers see it through two capabilities:
//! - [`Readable`]: count, fetch
//! - [`Writable`]: insert, delete, delete_document, plus `Readable`
//!
//! Decode failures are recovered per document according to the decoder's
//! [`Resolution`](crate::schema::Resolution); everything else aborts the
//! transaction.

mod capability;
mod compile;
mod errors;
mod executor;

pub use capability::{ReadTransaction, ReadWriteTransaction, Readable, Writable};
pub use compile::{count_spec, fetch_spec};
pub use errors::{TransactionError, TransactionResult};
pub use executor::{Capability, CommitAction, InsertMode, TransactionExecutor, TransactionState};
