//! Requests and records exchanged with a persistence engine
//!
//! These types are the engine's native query representation. Callers build
//! them through `query` and `transaction`, never directly.

use std::collections::BTreeMap;
use std::fmt;

use crate::schema::{StorableValue, StorageType};

/// Storage format of an entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Indexed primitive value
    Storage(StorageType),
    /// Opaque bytes, used for the document payload
    Binary,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Storage(storage_type) => write!(f, "{}", storage_type),
            AttributeType::Binary => write!(f, "binary"),
        }
    }
}

/// One attribute of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescription {
    pub name: String,
    pub attribute_type: AttributeType,
    pub indexed: bool,
    pub optional: bool,
}

/// One entity, generated from one document descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescription {
    pub name: String,
    pub attributes: Vec<AttributeDescription>,
}

impl EntityDescription {
    /// Finds an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeDescription> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Full schema handed to `PersistenceEngine::create_schema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescription {
    /// Store identifier the schema belongs to
    pub identifier: String,
    pub entities: Vec<EntityDescription>,
}

impl SchemaDescription {
    /// Finds an entity by name
    pub fn entity(&self, name: &str) -> Option<&EntityDescription> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Value of one attribute of a stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Value(StorableValue),
    Binary(Vec<u8>),
}

impl AttributeValue {
    /// Returns the indexed value, if this is one
    pub fn as_value(&self) -> Option<&StorableValue> {
        match self {
            AttributeValue::Value(value) => Some(value),
            AttributeValue::Binary(_) => None,
        }
    }

    /// Returns the raw bytes, if this is a binary attribute
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            AttributeValue::Binary(data) => Some(data),
            AttributeValue::Value(_) => None,
        }
    }
}

/// Attributes of a record by name. Absent optional attributes have no entry.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    /// String match with `?` for one character and `*` for any run of characters
    Like,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOperator::EqualTo => "==",
            ComparisonOperator::NotEqualTo => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqualTo => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqualTo => ">=",
            ComparisonOperator::Like => "LIKE",
        };
        f.write_str(symbol)
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(StorableValue),
    Attribute(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(value) => write!(f, "{}", value),
            Operand::Attribute(name) => f.write_str(name),
        }
    }
}

/// Boolean filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Comparison {
        left: Operand,
        op: ComparisonOperator,
        right: Operand,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Comparison { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Filter::And(filters) => write_joined(f, filters, " AND "),
            Filter::Or(filters) => write_joined(f, filters, " OR "),
            Filter::Not(filter) => write!(f, "NOT ({})", filter),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, filters: &[Filter], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", filter)?;
    }
    f.write_str(")")
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Order on one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub attribute: String,
    pub direction: SortDirection,
}

/// Fetch request. Sorting is applied before offset and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSpec {
    pub entity: String,
    pub filter: Option<Filter>,
    pub sort: Vec<SortSpec>,
    pub offset: usize,
    pub limit: Option<usize>,
    /// Return handles only, without attributes
    pub keys_only: bool,
}

impl FetchSpec {
    /// Fetch every record of an entity
    pub fn all(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: None,
            sort: Vec::new(),
            offset: 0,
            limit: None,
            keys_only: false,
        }
    }
}

/// Count request.
#[derive(Debug, Clone, PartialEq)]
pub struct CountSpec {
    pub entity: String,
    pub filter: Option<Filter>,
}

/// Opaque handle to a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordHandle(u64);

impl RecordHandle {
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A record as returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub handle: RecordHandle,
    pub attributes: Attributes,
}

impl RawRecord {
    /// Returns the value of an attribute
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_display() {
        let filter = Filter::And(vec![
            Filter::Comparison {
                left: Operand::Attribute("age".into()),
                op: ComparisonOperator::GreaterThan,
                right: Operand::Constant(StorableValue::Int(18)),
            },
            Filter::Not(Box::new(Filter::Comparison {
                left: Operand::Attribute("name".into()),
                op: ComparisonOperator::Like,
                right: Operand::Constant(StorableValue::String("A*".into())),
            })),
        ]);
        assert_eq!(filter.to_string(), "(age > 18 AND NOT (name LIKE \"A*\"))");
    }

    #[test]
    fn test_fetch_all_defaults() {
        let spec = FetchSpec::all("User");
        assert_eq!(spec.entity, "User");
        assert!(spec.filter.is_none());
        assert_eq!(spec.offset, 0);
        assert_eq!(spec.limit, None);
        assert!(!spec.keys_only);
    }

    #[test]
    fn test_attribute_value_accessors() {
        let value = AttributeValue::Value(StorableValue::Bool(true));
        assert!(value.as_value().is_some());
        assert!(value.as_binary().is_none());

        let binary = AttributeValue::Binary(vec![1, 2]);
        assert_eq!(binary.as_binary(), Some(&[1u8, 2][..]));
    }
}
