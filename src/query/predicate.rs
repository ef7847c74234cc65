//! Predicate algebra
//!
//! Comparisons between two expressions of the same value type, combined with
//! and, or and not. Predicates are immutable values; combining them builds a
//! new tree.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, Not};

use super::expression::Expression;
use crate::engine::{ComparisonOperator, Filter};
use crate::schema::{Document, Identifier, Index, IndexableValue, StoreResult};

/// Boolean filter over documents of type `D`.
pub struct Predicate<D> {
    filter: Filter,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> Predicate<D> {
    fn comparison<V: IndexableValue>(
        left: Expression<D, V>,
        op: ComparisonOperator,
        right: Expression<D, V>,
    ) -> Self {
        Self::from_filter(Filter::Comparison {
            left: left.into_operand(),
            op,
            right: right.into_operand(),
        })
    }

    pub fn equal_to<V: IndexableValue>(left: Expression<D, V>, right: Expression<D, V>) -> Self {
        Self::comparison(left, ComparisonOperator::EqualTo, right)
    }

    pub fn not_equal_to<V: IndexableValue>(left: Expression<D, V>, right: Expression<D, V>) -> Self {
        Self::comparison(left, ComparisonOperator::NotEqualTo, right)
    }

    pub fn less_than<V: IndexableValue>(left: Expression<D, V>, right: Expression<D, V>) -> Self {
        Self::comparison(left, ComparisonOperator::LessThan, right)
    }

    pub fn less_than_or_equal_to<V: IndexableValue>(
        left: Expression<D, V>,
        right: Expression<D, V>,
    ) -> Self {
        Self::comparison(left, ComparisonOperator::LessThanOrEqualTo, right)
    }

    pub fn greater_than<V: IndexableValue>(left: Expression<D, V>, right: Expression<D, V>) -> Self {
        Self::comparison(left, ComparisonOperator::GreaterThan, right)
    }

    pub fn greater_than_or_equal_to<V: IndexableValue>(
        left: Expression<D, V>,
        right: Expression<D, V>,
    ) -> Self {
        Self::comparison(left, ComparisonOperator::GreaterThanOrEqualTo, right)
    }

    /// String match; `?` matches one character, `*` any run of characters.
    pub fn like(left: Expression<D, String>, right: Expression<D, String>) -> Self {
        Self::comparison(left, ComparisonOperator::Like, right)
    }

    /// Both predicates hold
    pub fn and(self, other: Predicate<D>) -> Self {
        Self::from_filter(Filter::And(vec![self.filter, other.filter]))
    }

    /// Either predicate holds
    pub fn or(self, other: Predicate<D>) -> Self {
        Self::from_filter(Filter::Or(vec![self.filter, other.filter]))
    }

    /// Logical NOT
    pub fn negate(self) -> Self {
        Self::from_filter(Filter::Not(Box::new(self.filter)))
    }

    /// ANDs onto an optional predicate; an absent left side is the identity.
    pub fn and_optional(left: Option<Predicate<D>>, right: Predicate<D>) -> Self {
        match left {
            Some(left) => left.and(right),
            None => right,
        }
    }
}

impl<D> Predicate<D> {
    fn from_filter(filter: Filter) -> Self {
        Self {
            filter,
            _document: PhantomData,
        }
    }

    /// Returns the compiled engine filter
    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}

impl<D> Clone for Predicate<D> {
    fn clone(&self) -> Self {
        Self::from_filter(self.filter.clone())
    }
}

impl<D> fmt::Debug for Predicate<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.filter).finish()
    }
}

impl<D> fmt::Display for Predicate<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filter)
    }
}

impl<D> PartialEq for Predicate<D> {
    fn eq(&self, other: &Self) -> bool {
        self.filter == other.filter
    }
}

impl<D: Document> Not for Predicate<D> {
    type Output = Predicate<D>;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl<D: Document> BitAnd for Predicate<D> {
    type Output = Predicate<D>;

    fn bitand(self, rhs: Predicate<D>) -> Self::Output {
        self.and(rhs)
    }
}

impl<D: Document> BitOr for Predicate<D> {
    type Output = Predicate<D>;

    fn bitor(self, rhs: Predicate<D>) -> Self::Output {
        self.or(rhs)
    }
}

/// Comparisons of an index against a constant.
///
/// Each fails with `IndexNotRegistered` when the descriptor of `D` does not
/// declare the index.
impl<D: Document, V: IndexableValue> Index<D, V> {
    pub fn equal_to(&self, value: V) -> StoreResult<Predicate<D>> {
        Ok(Predicate::equal_to(Expression::index(self)?, Expression::constant(value)))
    }

    pub fn not_equal_to(&self, value: V) -> StoreResult<Predicate<D>> {
        Ok(Predicate::not_equal_to(Expression::index(self)?, Expression::constant(value)))
    }

    pub fn less_than(&self, value: V) -> StoreResult<Predicate<D>> {
        Ok(Predicate::less_than(Expression::index(self)?, Expression::constant(value)))
    }

    pub fn less_than_or_equal_to(&self, value: V) -> StoreResult<Predicate<D>> {
        Ok(Predicate::less_than_or_equal_to(
            Expression::index(self)?,
            Expression::constant(value),
        ))
    }

    pub fn greater_than(&self, value: V) -> StoreResult<Predicate<D>> {
        Ok(Predicate::greater_than(Expression::index(self)?, Expression::constant(value)))
    }

    pub fn greater_than_or_equal_to(&self, value: V) -> StoreResult<Predicate<D>> {
        Ok(Predicate::greater_than_or_equal_to(
            Expression::index(self)?,
            Expression::constant(value),
        ))
    }
}

impl<D: Document> Index<D, String> {
    /// String match against a pattern with `?` and `*` wildcards
    pub fn like(&self, pattern: impl Into<String>) -> StoreResult<Predicate<D>> {
        Ok(Predicate::like(
            Expression::index(self)?,
            Expression::constant(pattern.into()),
        ))
    }
}

impl<D: Document, V: IndexableValue> Identifier<D, V> {
    /// Matches the document with the given identifier
    pub fn equal_to(&self, value: V) -> StoreResult<Predicate<D>> {
        Ok(Predicate::equal_to(
            Expression::identifier(self)?,
            Expression::constant(value),
        ))
    }
}
