//! Document descriptors and their indices
//!
//! A descriptor names one document type and declares every value of it that
//! can be filtered or ordered on. Descriptor names and index names are the
//! stable keys used by the persistence engine; renaming them produces a
//! disjoint set of records.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::document::Document;
use super::types::{IndexableValue, StorableValue, StorageType};

/// Prefix reserved for attributes defined by the library itself.
///
/// User defined descriptor and index names may not start with it.
pub const RESERVED_PREFIX: &str = "_";

/// Attribute holding the encoded document payload.
pub const DOCUMENT_DATA_ATTRIBUTE: &str = "_DocumentStore_documentData";

/// Attribute holding the document identifier.
pub const DOCUMENT_IDENTIFIER_ATTRIBUTE: &str = "_DocumentStore_documentIdentifier";

/// Validation issue, one human readable line.
pub type ValidationIssue = String;

/// Name of a stored property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyName {
    /// Attribute owned by the library, exempt from naming rules
    LibraryDefined(&'static str),
    /// Attribute named by the caller
    UserDefined(String),
}

impl PropertyName {
    /// Returns the attribute name used in the engine
    pub fn as_str(&self) -> &str {
        match self {
            PropertyName::LibraryDefined(name) => name,
            PropertyName::UserDefined(name) => name,
        }
    }

    /// Checks the naming rules for user defined names
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let name = match self {
            PropertyName::LibraryDefined(_) => return Vec::new(),
            PropertyName::UserDefined(name) => name,
        };

        if name.is_empty() {
            return vec!["Index names may not be empty.".to_string()];
        }

        if name.starts_with(RESERVED_PREFIX) {
            return vec![format!(
                "`{}` is an invalid index name, names may not start with `{}`.",
                name, RESERVED_PREFIX
            )];
        }

        Vec::new()
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single index is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageInformation {
    /// Attribute name
    pub property_name: PropertyName,
    /// Storage format of the values
    pub storage_type: StorageType,
    /// Whether documents may lack a value
    pub is_optional: bool,
}

type Resolver<D, V> = Arc<dyn Fn(&D) -> Option<V> + Send + Sync>;

/// Typed index for a document, used to filter and order in queries.
///
/// The resolver must be a pure function of the document content.
pub struct Index<D, V> {
    info: StorageInformation,
    resolver: Resolver<D, V>,
}

impl<D: Document, V: IndexableValue> Index<D, V> {
    /// Create an index every document has a value for
    pub fn new(name: impl Into<String>, resolver: impl Fn(&D) -> V + Send + Sync + 'static) -> Self {
        Self {
            info: StorageInformation {
                property_name: PropertyName::UserDefined(name.into()),
                storage_type: V::STORAGE_TYPE,
                is_optional: false,
            },
            resolver: Arc::new(move |document| Some(resolver(document))),
        }
    }

    /// Create an index documents may lack a value for
    pub fn optional(
        name: impl Into<String>,
        resolver: impl Fn(&D) -> Option<V> + Send + Sync + 'static,
    ) -> Self {
        Self {
            info: StorageInformation {
                property_name: PropertyName::UserDefined(name.into()),
                storage_type: V::STORAGE_TYPE,
                is_optional: true,
            },
            resolver: Arc::new(resolver),
        }
    }

    /// Returns the index name
    pub fn name(&self) -> &str {
        self.info.property_name.as_str()
    }

    /// Returns the storage information
    pub fn storage_information(&self) -> &StorageInformation {
        &self.info
    }

    /// Resolves the index value of a document
    pub fn resolve(&self, document: &D) -> Option<V> {
        (self.resolver)(document)
    }

    /// Erases the value type so indices can be listed in a descriptor
    pub fn erase(&self) -> AnyIndex<D> {
        let resolver = Arc::clone(&self.resolver);
        AnyIndex {
            info: self.info.clone(),
            resolver: Arc::new(move |document| resolver(document).map(IndexableValue::into_storable)),
        }
    }
}

impl<D, V> Clone for Index<D, V> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<D, V> fmt::Debug for Index<D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index").field("info", &self.info).finish()
    }
}

/// Identifier of a document, unique per document type.
///
/// Stored under [`DOCUMENT_IDENTIFIER_ATTRIBUTE`] and never optional.
pub struct Identifier<D, V> {
    index: Index<D, V>,
}

impl<D: Document, V: IndexableValue> Identifier<D, V> {
    /// Create an identifier
    pub fn new(resolver: impl Fn(&D) -> V + Send + Sync + 'static) -> Self {
        Self {
            index: Index {
                info: StorageInformation {
                    property_name: PropertyName::LibraryDefined(DOCUMENT_IDENTIFIER_ATTRIBUTE),
                    storage_type: V::STORAGE_TYPE,
                    is_optional: false,
                },
                resolver: Arc::new(move |document| Some(resolver(document))),
            },
        }
    }

    /// Returns the attribute name
    pub fn name(&self) -> &str {
        self.index.name()
    }

    /// Returns the storage information
    pub fn storage_information(&self) -> &StorageInformation {
        &self.index.info
    }

    /// Erases the value type
    pub fn erase(&self) -> AnyIndex<D> {
        self.index.erase()
    }
}

impl<D, V> Clone for Identifier<D, V> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
        }
    }
}

/// Type erased index of a document.
pub struct AnyIndex<D> {
    info: StorageInformation,
    resolver: Arc<dyn Fn(&D) -> Option<StorableValue> + Send + Sync>,
}

impl<D> AnyIndex<D> {
    /// Returns the attribute name
    pub fn name(&self) -> &str {
        self.info.property_name.as_str()
    }

    /// Returns the storage information
    pub fn storage_information(&self) -> &StorageInformation {
        &self.info
    }

    /// Resolves the value of this index for a document
    pub fn resolve(&self, document: &D) -> Option<StorableValue> {
        (self.resolver)(document)
    }
}

impl<D> Clone for AnyIndex<D> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<D> fmt::Debug for AnyIndex<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyIndex").field("info", &self.info).finish()
    }
}

impl<D: Document, V: IndexableValue> From<Index<D, V>> for AnyIndex<D> {
    fn from(index: Index<D, V>) -> Self {
        index.erase()
    }
}

impl<D: Document, V: IndexableValue> From<&Index<D, V>> for AnyIndex<D> {
    fn from(index: &Index<D, V>) -> Self {
        index.erase()
    }
}

/// Description of a document type: its name, identifier and indices.
pub struct DocumentDescriptor<D> {
    name: String,
    identifier: Option<AnyIndex<D>>,
    indices: Vec<AnyIndex<D>>,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> DocumentDescriptor<D> {
    /// Create a descriptor without an identifier
    pub fn new(name: impl Into<String>, indices: Vec<AnyIndex<D>>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            indices,
            _document: PhantomData,
        }
    }

    /// Create a descriptor with an identifier
    pub fn with_identifier<V: IndexableValue>(
        name: impl Into<String>,
        identifier: Identifier<D, V>,
        indices: Vec<AnyIndex<D>>,
    ) -> Self {
        Self {
            name: name.into(),
            identifier: Some(identifier.erase()),
            indices,
            _document: PhantomData,
        }
    }

    /// Returns the descriptor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier, if declared
    pub fn identifier(&self) -> Option<&AnyIndex<D>> {
        self.identifier.as_ref()
    }

    /// Returns the indices in declaration order
    pub fn indices(&self) -> &[AnyIndex<D>] {
        &self.indices
    }

    /// Finds the identifier or index stored under the given attribute name
    pub fn find(&self, attribute: &str) -> Option<&AnyIndex<D>> {
        self.identifier
            .iter()
            .chain(self.indices.iter())
            .find(|index| index.name() == attribute)
    }

    /// Erases the document type
    pub fn erase(&self) -> AnyDocumentDescriptor {
        AnyDocumentDescriptor {
            name: self.name.clone(),
            identifier: self.identifier.as_ref().map(|i| i.info.clone()),
            indices: self.indices.iter().map(|i| i.info.clone()).collect(),
        }
    }
}

impl<D> fmt::Debug for DocumentDescriptor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentDescriptor")
            .field("name", &self.name)
            .field("identifier", &self.identifier)
            .field("indices", &self.indices)
            .finish()
    }
}

/// Type erased document descriptor, as registered with a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyDocumentDescriptor {
    name: String,
    identifier: Option<StorageInformation>,
    indices: Vec<StorageInformation>,
}

impl AnyDocumentDescriptor {
    /// Returns the descriptor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the identifier storage information, if declared
    pub fn identifier(&self) -> Option<&StorageInformation> {
        self.identifier.as_ref()
    }

    /// Returns the storage information of every index
    pub fn indices(&self) -> &[StorageInformation] {
        &self.indices
    }

    /// Collects every issue with this descriptor on its own
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.name.is_empty() {
            issues.push("DocumentDescriptor names may not be empty.".to_string());
        }

        if self.name.starts_with(RESERVED_PREFIX) {
            issues.push(format!(
                "`{}` is an invalid DocumentDescriptor name, names may not start with `{}`.",
                self.name, RESERVED_PREFIX
            ));
        }

        for duplicate in super::validator::duplicates(
            self.indices.iter().map(|info| info.property_name.as_str()),
        ) {
            issues.push(format!(
                "DocumentDescriptor `{}` has multiple indices with `{}` as name, every index name must be unique.",
                self.name, duplicate
            ));
        }

        for info in &self.indices {
            for issue in info.property_name.validate() {
                issues.push(format!("DocumentDescriptor `{}`: {}", self.name, issue));
            }
        }

        issues
    }
}

impl<D: Document> From<&DocumentDescriptor<D>> for AnyDocumentDescriptor {
    fn from(descriptor: &DocumentDescriptor<D>) -> Self {
        descriptor.erase()
    }
}
