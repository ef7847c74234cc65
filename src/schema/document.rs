//! The `Document` contract between callers and the store
//!
//! The store never looks inside a document. Callers supply:
//! - a descriptor naming the type and its indices
//! - an encoder producing the stored payload
//! - a decoder that reports a `Resolution` when it cannot read a payload

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;

use super::descriptor::DocumentDescriptor;
use super::errors::BoxError;

/// A type that can be stored in and retrieved from the store.
pub trait Document: Sized + Send + 'static {
    /// Descriptor that identifies the document type and its indices.
    fn descriptor() -> &'static DocumentDescriptor<Self>;

    /// Encodes the document into its stored payload.
    ///
    /// Failing here aborts the insert in progress.
    fn encode(&self) -> Result<Vec<u8>, BoxError>;

    /// Decodes a stored payload back into a document.
    ///
    /// Every payload produced by `encode` should decode. On failure return a
    /// `DeserializationError` with the preferred `Resolution`.
    fn decode(data: &[u8]) -> Result<Self, DeserializationError>;
}

/// Recovery policy for a payload that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Leave the record untouched and omit it from the results
    SkipDocument,
    /// Omit it from the results and delete the record.
    ///
    /// The deletion only persists when a read-write transaction saves.
    DeleteDocument,
    /// Fail the whole operation with the decode error
    AbortOperation,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::SkipDocument => write!(f, "skipDocument"),
            Resolution::DeleteDocument => write!(f, "deleteDocument"),
            Resolution::AbortOperation => write!(f, "abortOperation"),
        }
    }
}

/// Failure to decode a document, with the preferred resolution.
#[derive(Debug)]
pub struct DeserializationError {
    resolution: Resolution,
    source: BoxError,
}

impl DeserializationError {
    /// Create the error
    pub fn new(resolution: Resolution, source: impl Into<BoxError>) -> Self {
        Self {
            resolution,
            source: source.into(),
        }
    }

    /// Skip the document, leaving it in storage
    pub fn skip(source: impl Into<BoxError>) -> Self {
        Self::new(Resolution::SkipDocument, source)
    }

    /// Delete the document
    pub fn delete(source: impl Into<BoxError>) -> Self {
        Self::new(Resolution::DeleteDocument, source)
    }

    /// Abort the operation
    pub fn abort(source: impl Into<BoxError>) -> Self {
        Self::new(Resolution::AbortOperation, source)
    }

    /// Returns the preferred resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns the underlying decode error
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Consumes the error, returning the underlying decode error
    pub fn into_source(self) -> BoxError {
        self.source
    }
}

impl fmt::Display for DeserializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (resolution: {})", self.source, self.resolution)
    }
}

impl StdError for DeserializationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Errors without an explicit resolution abort the operation.
impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::abort(err)
    }
}

/// Encodes a serde document as JSON.
pub fn encode_json<T: Serialize>(document: &T) -> Result<Vec<u8>, BoxError> {
    Ok(serde_json::to_vec(document)?)
}

/// Decodes a JSON payload, failing with the given resolution.
pub fn decode_json<T: DeserializeOwned>(
    data: &[u8],
    resolution: Resolution,
) -> Result<T, DeserializationError> {
    serde_json::from_slice(data).map_err(|err| DeserializationError::new(resolution, err))
}
