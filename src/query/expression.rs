//! Typed expressions: constants and references to declared fields
//!
//! A field reference is only constructed when the document's descriptor
//! declares that exact field, so a predicate can never name an attribute the
//! engine does not store.

use std::fmt;
use std::marker::PhantomData;

use crate::engine::Operand;
use crate::schema::{
    Document, DocumentStoreError, Identifier, Index, IndexableValue, StorageInformation,
    StoreResult,
};

/// A constant or a reference to an index or identifier of `D`, of value type `V`.
pub struct Expression<D, V> {
    operand: Operand,
    _types: PhantomData<fn() -> (D, V)>,
}

impl<D: Document, V: IndexableValue> Expression<D, V> {
    /// Constant value
    pub fn constant(value: V) -> Self {
        Self::from_operand(Operand::Constant(value.into_storable()))
    }

    /// Reference to an index declared by the descriptor of `D`
    pub fn index(index: &Index<D, V>) -> StoreResult<Self> {
        Self::field(index.storage_information())
    }

    /// Reference to the identifier declared by the descriptor of `D`
    pub fn identifier(identifier: &Identifier<D, V>) -> StoreResult<Self> {
        Self::field(identifier.storage_information())
    }

    fn field(info: &StorageInformation) -> StoreResult<Self> {
        let descriptor = D::descriptor();
        let name = info.property_name.as_str();
        match descriptor.find(name) {
            Some(declared) if declared.storage_information() == info => {
                Ok(Self::from_operand(Operand::Attribute(name.to_string())))
            }
            _ => Err(DocumentStoreError::index_not_registered(descriptor.name(), name)),
        }
    }

    fn from_operand(operand: Operand) -> Self {
        Self {
            operand,
            _types: PhantomData,
        }
    }
}

impl<D, V> Expression<D, V> {
    pub(crate) fn into_operand(self) -> Operand {
        self.operand
    }
}

impl<D, V> Clone for Expression<D, V> {
    fn clone(&self) -> Self {
        Self {
            operand: self.operand.clone(),
            _types: PhantomData,
        }
    }
}

impl<D, V> fmt::Debug for Expression<D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expression").field(&self.operand).finish()
    }
}

impl<D, V> PartialEq for Expression<D, V> {
    fn eq(&self, other: &Self) -> bool {
        self.operand == other.operand
    }
}
