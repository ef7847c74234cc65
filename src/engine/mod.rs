//! Persistence engine boundary
//!
//! The store consumes an engine through two traits:
//! - [`PersistenceEngine`]: schema creation and session factory
//! - [`Session`]: snapshot pinning, fetch, count, insert, delete, save
//!
//! [`memory::MemoryEngine`] is the in-process implementation.

mod errors;
pub mod memory;
mod spec;
mod traits;

pub use errors::{EngineError, EngineResult};
pub use memory::MemoryEngine;
pub use spec::{
    AttributeDescription, AttributeType, AttributeValue, Attributes, ComparisonOperator,
    CountSpec, EntityDescription, FetchSpec, Filter, Operand, RawRecord, RecordHandle,
    SchemaDescription, SortDirection, SortSpec,
};
pub use traits::{PersistenceEngine, Session};
