//! Storable value types
//!
//! The closed set of primitive types that can be stored in an index:
//! - bool: Boolean
//! - int: 64-bit signed integer
//! - double: 64-bit floating point
//! - string: UTF-8 string
//! - timestamp: UTC point in time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Storage format of an indexed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Boolean storage
    Bool,
    /// 64-bit signed integer storage
    Int,
    /// 64-bit floating point storage
    Double,
    /// UTF-8 string storage
    String,
    /// UTC timestamp storage
    Timestamp,
}

impl StorageType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            StorageType::Bool => "bool",
            StorageType::Int => "int",
            StorageType::Double => "double",
            StorageType::String => "string",
            StorageType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A value as it is handed to and received from the persistence engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum StorableValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
}

impl StorableValue {
    /// Returns the storage type this value is tagged with
    pub fn storage_type(&self) -> StorageType {
        match self {
            StorableValue::Bool(_) => StorageType::Bool,
            StorableValue::Int(_) => StorageType::Int,
            StorableValue::Double(_) => StorageType::Double,
            StorableValue::String(_) => StorageType::String,
            StorableValue::Timestamp(_) => StorageType::Timestamp,
        }
    }

    /// Compares two values of the same storage type.
    ///
    /// Returns `None` for values of different types and for NaN doubles.
    pub fn compare(&self, other: &StorableValue) -> Option<Ordering> {
        match (self, other) {
            (StorableValue::Bool(a), StorableValue::Bool(b)) => Some(a.cmp(b)),
            (StorableValue::Int(a), StorableValue::Int(b)) => Some(a.cmp(b)),
            (StorableValue::Double(a), StorableValue::Double(b)) => a.partial_cmp(b),
            (StorableValue::String(a), StorableValue::String(b)) => Some(a.cmp(b)),
            (StorableValue::Timestamp(a), StorableValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the string contents if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StorableValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for StorableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorableValue::Bool(v) => write!(f, "{}", v),
            StorableValue::Int(v) => write!(f, "{}", v),
            StorableValue::Double(v) => write!(f, "{}", v),
            StorableValue::String(v) => write!(f, "{:?}", v),
            StorableValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// A Rust type that can be used as the value of an index.
pub trait IndexableValue: Clone + Send + Sync + 'static {
    /// Storage type used for values of this type
    const STORAGE_TYPE: StorageType;

    /// Converts into the engine representation
    fn into_storable(self) -> StorableValue;
}

impl IndexableValue for bool {
    const STORAGE_TYPE: StorageType = StorageType::Bool;

    fn into_storable(self) -> StorableValue {
        StorableValue::Bool(self)
    }
}

impl IndexableValue for i64 {
    const STORAGE_TYPE: StorageType = StorageType::Int;

    fn into_storable(self) -> StorableValue {
        StorableValue::Int(self)
    }
}

impl IndexableValue for f64 {
    const STORAGE_TYPE: StorageType = StorageType::Double;

    fn into_storable(self) -> StorableValue {
        StorableValue::Double(self)
    }
}

impl IndexableValue for String {
    const STORAGE_TYPE: StorageType = StorageType::String;

    fn into_storable(self) -> StorableValue {
        StorableValue::String(self)
    }
}

impl IndexableValue for DateTime<Utc> {
    const STORAGE_TYPE: StorageType = StorageType::Timestamp;

    fn into_storable(self) -> StorableValue {
        StorableValue::Timestamp(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_storage_type_names() {
        assert_eq!(StorageType::Bool.type_name(), "bool");
        assert_eq!(StorageType::Int.type_name(), "int");
        assert_eq!(StorageType::Double.type_name(), "double");
        assert_eq!(StorageType::String.type_name(), "string");
        assert_eq!(StorageType::Timestamp.type_name(), "timestamp");
    }

    #[test]
    fn test_every_value_maps_to_one_storage_type() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(true.into_storable().storage_type(), bool::STORAGE_TYPE);
        assert_eq!(7i64.into_storable().storage_type(), i64::STORAGE_TYPE);
        assert_eq!(1.5f64.into_storable().storage_type(), f64::STORAGE_TYPE);
        assert_eq!("a".to_string().into_storable().storage_type(), String::STORAGE_TYPE);
        assert_eq!(now.into_storable().storage_type(), StorageType::Timestamp);
    }

    #[test]
    fn test_compare_same_type() {
        assert_eq!(
            StorableValue::Int(1).compare(&StorableValue::Int(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            StorableValue::String("b".into()).compare(&StorableValue::String("a".into())),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_mixed_types_is_undefined() {
        assert_eq!(StorableValue::Int(1).compare(&StorableValue::Double(1.0)), None);
        assert_eq!(StorableValue::Double(f64::NAN).compare(&StorableValue::Double(1.0)), None);
    }

    #[test]
    fn test_storage_type_serde() {
        let json = serde_json::to_string(&StorageType::Timestamp).unwrap();
        assert_eq!(json, "\"timestamp\"");
    }
}
