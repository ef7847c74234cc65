//! Persistence engine and session traits

use super::errors::EngineResult;
use super::spec::{Attributes, CountSpec, FetchSpec, RawRecord, RecordHandle, SchemaDescription};

/// Backend that physically stores records and executes compiled requests.
pub trait PersistenceEngine: Send + Sync {
    /// Creates or replaces the schema. Called once when a store opens.
    fn create_schema(&self, schema: &SchemaDescription) -> EngineResult<()>;

    /// Opens an isolated session.
    fn open_session(&self) -> EngineResult<Box<dyn Session>>;
}

/// A unit of work against the engine, used by exactly one transaction.
///
/// Inserts and deletes are visible to this session immediately and to other
/// sessions only after `save`.
pub trait Session: Send {
    /// Pins the currently committed state as the read snapshot.
    fn pin_snapshot(&mut self) -> EngineResult<()>;

    fn fetch(&mut self, spec: &FetchSpec) -> EngineResult<Vec<RawRecord>>;

    fn count(&mut self, spec: &CountSpec) -> EngineResult<usize>;

    fn insert(&mut self, entity: &str, attributes: Attributes) -> EngineResult<RecordHandle>;

    fn delete(&mut self, handle: RecordHandle) -> EngineResult<()>;

    /// Returns whether there are unsaved inserts or deletes.
    fn has_changes(&self) -> bool;

    /// Commits pending changes. Conflicting writes are overwritten.
    fn save(&mut self) -> EngineResult<()>;
}
