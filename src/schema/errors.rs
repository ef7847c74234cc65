//! Store error types
//!
//! Error kinds:
//! - DOCSTORE_STORE_IDENTIFIER_INVALID (REJECT)
//! - DOCSTORE_DOCUMENT_DESCRIPTION_INVALID (REJECT)
//! - DOCSTORE_DOCUMENT_DESCRIPTION_NOT_REGISTERED (REJECT)
//! - DOCSTORE_INDEX_NOT_REGISTERED (REJECT)
//! - DOCSTORE_OPERATION_FAILED (ERROR)
//! - DOCSTORE_DOCUMENT_DATA_CORRUPTION (ERROR)

use std::error::Error as StdError;
use std::fmt;

/// Boxed error used for caller supplied logic and engine causes.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller contract violated, nothing was touched
    Reject,
    /// Operation failed while talking to the engine or reading data
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Kind of error the store encountered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Given store identifier is invalid
    StoreIdentifierInvalid = 1,
    /// One or more document descriptors are invalid
    DocumentDescriptionInvalid,
    /// Operation on a document whose descriptor is not registered with the store
    DocumentDescriptionNotRegistered,
    /// Expression or sort key references a field the descriptor does not declare
    IndexNotRegistered,
    /// The engine or the library failed to perform the operation
    OperationFailed,
    /// Stored document data could not be read
    DocumentDataCorruption,
}

impl ErrorKind {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::StoreIdentifierInvalid => "DOCSTORE_STORE_IDENTIFIER_INVALID",
            ErrorKind::DocumentDescriptionInvalid => "DOCSTORE_DOCUMENT_DESCRIPTION_INVALID",
            ErrorKind::DocumentDescriptionNotRegistered => {
                "DOCSTORE_DOCUMENT_DESCRIPTION_NOT_REGISTERED"
            }
            ErrorKind::IndexNotRegistered => "DOCSTORE_INDEX_NOT_REGISTERED",
            ErrorKind::OperationFailed => "DOCSTORE_OPERATION_FAILED",
            ErrorKind::DocumentDataCorruption => "DOCSTORE_DOCUMENT_DATA_CORRUPTION",
        }
    }

    /// Returns the stable numeric id
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Returns the severity level for this kind
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::OperationFailed | ErrorKind::DocumentDataCorruption => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error in direct relation with the store, with full context.
#[derive(Debug)]
pub struct DocumentStoreError {
    /// Error kind
    kind: ErrorKind,
    /// Human-readable message
    message: String,
    /// Underlying, more technical cause
    source: Option<BoxError>,
}

impl DocumentStoreError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Create an invalid store identifier error
    pub fn store_identifier_invalid(identifier: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::StoreIdentifierInvalid,
            format!("`{}` is an invalid store identifier, {}.", identifier, reason),
        )
    }

    /// Create an aggregate descriptor validation error listing every issue
    pub fn description_invalid(issues: &[String]) -> Self {
        Self::new(
            ErrorKind::DocumentDescriptionInvalid,
            format!(
                "One or more document descriptors are invalid:\n - {}",
                issues.join("\n - ")
            ),
        )
    }

    /// Create a not registered error for the named descriptor
    pub fn not_registered(document: &str) -> Self {
        Self::new(
            ErrorKind::DocumentDescriptionNotRegistered,
            format!(
                "The document descriptor `{}` is not registered with the store this transaction belongs to, \
                 pass every descriptor that is used to `Store::open`.",
                document
            ),
        )
    }

    /// Create an error for a reference to an undeclared index
    pub fn index_not_registered(document: &str, index: &str) -> Self {
        Self::new(
            ErrorKind::IndexNotRegistered,
            format!(
                "`{}` is not an index or identifier of the document descriptor `{}`.",
                index, document
            ),
        )
    }

    /// Create an operation failed error
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OperationFailed, message)
    }

    /// Create a document data corruption error
    pub fn data_corruption(document: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::DocumentDataCorruption,
            format!("Stored data of a `{}` document is unreadable: {}", document, reason),
        )
    }

    /// Returns the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DocumentStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DocumentStoreError #{} [{}]: {}",
            self.kind.id(),
            self.kind.code(),
            self.message
        )?;
        if let Some(ref source) = self.source {
            write!(f, " - {}", source)?;
        }
        Ok(())
    }
}

impl StdError for DocumentStoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, DocumentStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ErrorKind::StoreIdentifierInvalid.id(), 1);
        assert_eq!(ErrorKind::DocumentDescriptionInvalid.id(), 2);
        assert_eq!(ErrorKind::DocumentDescriptionNotRegistered.id(), 3);
        assert_eq!(
            ErrorKind::DocumentDescriptionNotRegistered.code(),
            "DOCSTORE_DOCUMENT_DESCRIPTION_NOT_REGISTERED"
        );
        assert_eq!(ErrorKind::OperationFailed.code(), "DOCSTORE_OPERATION_FAILED");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(ErrorKind::DocumentDescriptionInvalid.severity(), Severity::Reject);
        assert_eq!(ErrorKind::IndexNotRegistered.severity(), Severity::Reject);
        assert_eq!(ErrorKind::OperationFailed.severity(), Severity::Error);
        assert_eq!(ErrorKind::DocumentDataCorruption.severity(), Severity::Error);
    }

    #[test]
    fn test_aggregate_message_lists_every_issue() {
        let err = DocumentStoreError::description_invalid(&[
            "first issue".to_string(),
            "second issue".to_string(),
        ]);
        assert_eq!(err.kind(), ErrorKind::DocumentDescriptionInvalid);
        assert_eq!(
            err.message(),
            "One or more document descriptors are invalid:\n - first issue\n - second issue"
        );
    }

    #[test]
    fn test_display_includes_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = DocumentStoreError::operation_failed("save failed").with_source(io);
        let display = err.to_string();
        assert!(display.starts_with("DocumentStoreError #5 [DOCSTORE_OPERATION_FAILED]"));
        assert!(display.ends_with(" - disk full"));
        assert!(StdError::source(&err).is_some());
    }
}
