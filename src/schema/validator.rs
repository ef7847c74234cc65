//! Descriptor set validation
//!
//! Checks, accumulating every issue before reporting:
//! - descriptor names are non-empty and unprefixed
//! - index names are non-empty, unprefixed and unique per descriptor
//! - descriptor names are unique across the set
//!
//! Any violation yields one `DocumentDescriptionInvalid` error listing every
//! issue, one per line. Success yields `ValidatedDescriptors`, which only this
//! module can construct.

use std::collections::BTreeSet;

use super::descriptor::{AnyDocumentDescriptor, ValidationIssue};
use super::errors::{DocumentStoreError, StoreResult};
use crate::observability::Logger;

/// Returns every item that occurs more than once, each reported once, sorted.
pub fn duplicates<'a, I>(items: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    let mut duplicated = BTreeSet::new();
    for item in items {
        if !seen.insert(item) {
            duplicated.insert(item);
        }
    }
    duplicated.into_iter().collect()
}

/// Collects every issue of a descriptor set without failing.
pub fn issues(descriptors: &[AnyDocumentDescriptor]) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = descriptors
        .iter()
        .flat_map(AnyDocumentDescriptor::validate)
        .collect();

    for duplicate in duplicates(descriptors.iter().map(AnyDocumentDescriptor::name)) {
        issues.push(format!(
            "Multiple DocumentDescriptors with `{}` as name were registered, every DocumentDescriptor name must be unique.",
            duplicate
        ));
    }

    issues
}

/// Validates a descriptor set for use by one store.
pub fn validate(
    descriptors: Vec<AnyDocumentDescriptor>,
    logger: &dyn Logger,
) -> StoreResult<ValidatedDescriptors> {
    let count = descriptors.len().to_string();
    logger.debug("DESCRIPTORS_VALIDATING", &[("count", &count)]);

    let issues = issues(&descriptors);
    if !issues.is_empty() {
        let issue_count = issues.len().to_string();
        logger.warn(
            "DESCRIPTORS_INVALID",
            &[("count", &count), ("issues", &issue_count)],
        );
        return Err(DocumentStoreError::description_invalid(&issues));
    }

    Ok(ValidatedDescriptors { descriptors })
}

/// A descriptor set that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDescriptors {
    descriptors: Vec<AnyDocumentDescriptor>,
}

impl ValidatedDescriptors {
    /// Returns whether this exact descriptor is registered
    pub fn contains(&self, descriptor: &AnyDocumentDescriptor) -> bool {
        self.get(descriptor.name()) == Some(descriptor)
    }

    /// Looks up a registered descriptor by name
    pub fn get(&self, name: &str) -> Option<&AnyDocumentDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// Iterates over the descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &AnyDocumentDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{LogLevel, NoLogger, RecordingLogger};
    use crate::schema::descriptor::{DocumentDescriptor, Index};
    use crate::schema::document::{decode_json, encode_json, DeserializationError, Document, Resolution};
    use crate::schema::errors::{BoxError, ErrorKind};
    use serde::{Deserialize, Serialize};
    use std::sync::LazyLock;

    #[derive(Serialize, Deserialize)]
    struct User {
        age: i64,
    }

    impl Document for User {
        fn descriptor() -> &'static DocumentDescriptor<Self> {
            static DESCRIPTOR: LazyLock<DocumentDescriptor<User>> = LazyLock::new(|| {
                DocumentDescriptor::new("User", vec![Index::new("age", |u: &User| u.age).erase()])
            });
            &DESCRIPTOR
        }

        fn encode(&self) -> Result<Vec<u8>, BoxError> {
            encode_json(self)
        }

        fn decode(data: &[u8]) -> Result<Self, DeserializationError> {
            decode_json(data, Resolution::AbortOperation)
        }
    }

    fn descriptor(name: &str, indices: &[&str]) -> AnyDocumentDescriptor {
        DocumentDescriptor::<User>::new(
            name,
            indices
                .iter()
                .map(|index| Index::new(*index, |u: &User| u.age).erase())
                .collect(),
        )
        .erase()
    }

    #[test]
    fn test_duplicates_reported_once_sorted() {
        assert_eq!(duplicates(["b", "a", "b", "a", "b", "c"]), vec!["a", "b"]);
        assert!(duplicates(["a", "b"]).is_empty());
    }

    #[test]
    fn test_valid_descriptor() {
        assert!(issues(&[User::descriptor().erase()]).is_empty());
        let validated = validate(vec![User::descriptor().erase()], &NoLogger).unwrap();
        assert!(validated.contains(&User::descriptor().erase()));
        assert_eq!(validated.len(), 1);
    }

    #[test]
    fn test_reserved_prefix_is_single_issue() {
        let issues = issues(&[descriptor("_User", &[])]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("`_User`"));
        assert!(issues[0].contains("`_`"));
    }

    #[test]
    fn test_empty_names_rejected() {
        assert_eq!(issues(&[descriptor("", &[])]).len(), 1);
        assert_eq!(issues(&[descriptor("User", &[""])]).len(), 1);
    }

    #[test]
    fn test_index_rules() {
        let issues = issues(&[descriptor("User", &["age", "age", "_name"])]);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_duplicate_descriptor_names() {
        let issues = issues(&[descriptor("User", &[]), descriptor("User", &["age"])]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("Multiple DocumentDescriptors"));
    }

    #[test]
    fn test_every_issue_is_aggregated() {
        let logger = RecordingLogger::new();
        let err = validate(
            vec![
                descriptor("_A", &["x", "x"]),
                descriptor("B", &[""]),
                descriptor("B", &[]),
            ],
            &logger,
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DocumentDescriptionInvalid);
        assert_eq!(err.message().matches("\n - ").count(), 4);
        assert_eq!(logger.at_level(LogLevel::Warn).len(), 1);
    }

    #[test]
    fn test_contains_requires_same_shape() {
        let validated = validate(vec![descriptor("User", &["age"])], &NoLogger).unwrap();
        assert!(validated.contains(&descriptor("User", &["age"])));
        assert!(!validated.contains(&descriptor("User", &["height"])));
        assert!(!validated.contains(&descriptor("Post", &["age"])));
    }
}
