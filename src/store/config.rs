//! Store configuration
//!
//! Loadable from JSON:
//!
//! ```json
//! { "identifier": "main", "pin_snapshots": true }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::schema::{DocumentStoreError, StoreResult};

/// Configuration of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Name of the store, passed to the engine with the schema
    pub identifier: String,
    /// Pin a read snapshot when each transaction opens
    #[serde(default = "default_pin_snapshots")]
    pub pin_snapshots: bool,
}

fn default_pin_snapshots() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            identifier: "DocumentStore".to_string(),
            pin_snapshots: true,
        }
    }
}

impl StoreConfig {
    /// Create config for the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Parse config from JSON.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            DocumentStoreError::operation_failed("Store configuration is not valid JSON.")
                .with_source(err)
        })
    }

    /// Load config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            DocumentStoreError::operation_failed(format!(
                "Failed to read store configuration from {}.",
                path.display()
            ))
            .with_source(err)
        })?;
        Self::from_json(&json)
    }

    /// Check the identifier is usable.
    pub fn validate(&self) -> StoreResult<()> {
        if self.identifier.is_empty() {
            return Err(DocumentStoreError::store_identifier_invalid(
                &self.identifier,
                "identifiers may not be empty",
            ));
        }
        if self.identifier.contains(['/', '\\']) {
            return Err(DocumentStoreError::store_identifier_invalid(
                &self.identifier,
                "identifiers may not contain path separators",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.identifier, "DocumentStore");
        assert!(config.pin_snapshots);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_defaults_pinning() {
        let config = StoreConfig::from_json(r#"{"identifier": "main"}"#).unwrap();
        assert_eq!(config, StoreConfig::new("main"));

        let config = StoreConfig::from_json(r#"{"identifier": "main", "pin_snapshots": false}"#).unwrap();
        assert!(!config.pin_snapshots);
    }

    #[test]
    fn test_invalid_json() {
        assert!(StoreConfig::from_json("{").is_err());
    }

    #[test]
    fn test_invalid_identifiers() {
        for identifier in ["", "a/b", "a\\b"] {
            let err = StoreConfig::new(identifier).validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StoreIdentifierInvalid);
        }
    }
}
