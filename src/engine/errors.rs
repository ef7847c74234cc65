//! # Engine Errors

use thiserror::Error;

/// Errors reported by a persistence engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no schema has been created")]
    SchemaMissing,

    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    #[error("entity `{entity}` has no attribute `{attribute}`")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("attribute `{attribute}` of `{entity}` expects {expected}, got {actual}")]
    AttributeType {
        entity: String,
        attribute: String,
        expected: String,
        actual: String,
    },

    #[error("non-optional attribute `{attribute}` of `{entity}` is missing")]
    MissingAttribute { entity: String, attribute: String },

    #[error("record {0} does not exist")]
    UnknownRecord(u64),

    #[error("invalid like pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("engine state lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Backend(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
