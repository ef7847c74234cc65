//! Sort keys on declared fields

use std::fmt;
use std::marker::PhantomData;

use super::expression::Expression;
use crate::engine::{Operand, SortDirection, SortSpec};
use crate::schema::{Document, DocumentStoreError, Identifier, Index, IndexableValue, StoreResult};

/// Order on one index of `D`.
pub struct SortKey<D> {
    spec: SortSpec,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> SortKey<D> {
    /// Orders on a field expression, `None` for a constant
    pub fn new<V: IndexableValue>(expression: Expression<D, V>, direction: SortDirection) -> Option<Self> {
        match expression.into_operand() {
            Operand::Attribute(attribute) => Some(Self {
                spec: SortSpec {
                    attribute,
                    direction,
                },
                _document: PhantomData,
            }),
            Operand::Constant(_) => None,
        }
    }

    fn on_field<V: IndexableValue>(
        expression: StoreResult<Expression<D, V>>,
        name: &str,
        direction: SortDirection,
    ) -> StoreResult<Self> {
        Self::new(expression?, direction)
            .ok_or_else(|| DocumentStoreError::index_not_registered(D::descriptor().name(), name))
    }
}

impl<D> SortKey<D> {
    pub fn attribute(&self) -> &str {
        &self.spec.attribute
    }

    pub fn direction(&self) -> SortDirection {
        self.spec.direction
    }

    pub(crate) fn spec(&self) -> &SortSpec {
        &self.spec
    }
}

impl<D> Clone for SortKey<D> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            _document: PhantomData,
        }
    }
}

impl<D> fmt::Debug for SortKey<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SortKey").field(&self.spec).finish()
    }
}

impl<D> PartialEq for SortKey<D> {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}

impl<D: Document, V: IndexableValue> Index<D, V> {
    /// Ascending order on this index
    pub fn ascending(&self) -> StoreResult<SortKey<D>> {
        SortKey::on_field(Expression::index(self), self.name(), SortDirection::Ascending)
    }

    /// Descending order on this index
    pub fn descending(&self) -> StoreResult<SortKey<D>> {
        SortKey::on_field(Expression::index(self), self.name(), SortDirection::Descending)
    }
}

impl<D: Document, V: IndexableValue> Identifier<D, V> {
    /// Ascending order on the identifier
    pub fn ascending(&self) -> StoreResult<SortKey<D>> {
        SortKey::on_field(Expression::identifier(self), self.name(), SortDirection::Ascending)
    }

    /// Descending order on the identifier
    pub fn descending(&self) -> StoreResult<SortKey<D>> {
        SortKey::on_field(Expression::identifier(self), self.name(), SortDirection::Descending)
    }
}
