//! Query subsystem for docstore
//!
//! Typed building blocks compiled into engine filters:
//! - [`Expression`]: constant or declared field of one document type
//! - [`Predicate`]: comparisons combined with and, or, not
//! - [`SortKey`]: direction on one declared field
//! - [`Query`]: predicate, sort keys, skip and limit
//!
//! Referencing a field the descriptor does not declare fails with
//! `IndexNotRegistered` at construction.

mod builder;
mod expression;
mod predicate;
mod sort;

pub use crate::engine::{ComparisonOperator, SortDirection};
pub use builder::Query;
pub use expression::Expression;
pub use predicate::Predicate;
pub use sort::SortKey;
