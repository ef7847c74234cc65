//! Schema subsystem for docstore
//!
//! Documents are opaque to the store. A descriptor declares what the store can
//! see of them: a name, an optional identifier and typed indices.
//!
//! # Design Principles
//!
//! - Closed set of storable types
//! - Index accessors are pure functions of the document
//! - Descriptors are validated once, when a store opens
//! - Every validation issue is reported at once

mod descriptor;
mod document;
mod errors;
mod types;
mod validator;

pub use descriptor::{
    AnyDocumentDescriptor, AnyIndex, DocumentDescriptor, Identifier, Index, PropertyName,
    StorageInformation, ValidationIssue, DOCUMENT_DATA_ATTRIBUTE, DOCUMENT_IDENTIFIER_ATTRIBUTE,
    RESERVED_PREFIX,
};
pub use document::{decode_json, encode_json, DeserializationError, Document, Resolution};
pub use errors::{BoxError, DocumentStoreError, ErrorKind, Severity, StoreResult};
pub use types::{IndexableValue, StorableValue, StorageType};
pub use validator::{duplicates, issues, validate, ValidatedDescriptors};
