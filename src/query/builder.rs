//! Immutable query over one document type
//!
//! A query is a declarative specification, not a pipeline: only the
//! accumulated values matter, never the order of builder calls. Sorting is
//! always applied before skip and limit.
//!
//! - `filtering` ANDs onto the current predicate
//! - `ordered` replaces the sort keys, `then_ordered` appends
//! - `skipping` accumulates, `limiting` only tightens

use std::fmt;

use super::predicate::Predicate;
use super::sort::SortKey;
use crate::schema::Document;
use crate::transaction::{Readable, TransactionResult, Writable};

/// Filter, sort and paging specification for documents of type `D`.
pub struct Query<D> {
    predicate: Option<Predicate<D>>,
    sort_keys: Vec<SortKey<D>>,
    skip: usize,
    limit: Option<usize>,
}

impl<D: Document> Query<D> {
    /// Query matching every document of type `D`
    pub fn new() -> Self {
        Self {
            predicate: None,
            sort_keys: Vec::new(),
            skip: 0,
            limit: None,
        }
    }

    /// Only documents that also match the predicate
    pub fn filtering(&self, predicate: Predicate<D>) -> Self {
        Self {
            predicate: Some(Predicate::and_optional(self.predicate.clone(), predicate)),
            ..self.clone()
        }
    }

    /// Only documents that do not match the predicate
    pub fn excluding(&self, predicate: Predicate<D>) -> Self {
        self.filtering(predicate.negate())
    }

    /// Orders by a single key, discarding earlier keys
    pub fn ordered(&self, sort_key: SortKey<D>) -> Self {
        Self {
            sort_keys: vec![sort_key],
            ..self.clone()
        }
    }

    /// Adds a key after the existing ones
    pub fn then_ordered(&self, sort_key: SortKey<D>) -> Self {
        let mut sort_keys = self.sort_keys.clone();
        sort_keys.push(sort_key);
        Self {
            sort_keys,
            ..self.clone()
        }
    }

    /// Skips `n` more documents
    pub fn skipping(&self, n: usize) -> Self {
        Self {
            skip: self.skip.saturating_add(n),
            ..self.clone()
        }
    }

    /// Returns at most `n` documents, never raising an earlier limit.
    ///
    /// `limiting(0)` matches no documents; it never means "unlimited".
    /// `count_in` ignores the limit either way.
    pub fn limiting(&self, n: usize) -> Self {
        Self {
            limit: Some(self.limit.map_or(n, |limit| limit.min(n))),
            ..self.clone()
        }
    }

    /// Limits to the first document
    pub fn first(&self) -> Self {
        self.limiting(1)
    }

    /// Counts matching documents in a transaction, ignoring skip and limit
    pub fn count_in<T: Readable>(&self, transaction: &mut T) -> TransactionResult<usize> {
        transaction.count(self)
    }

    /// Fetches matching documents in a transaction
    pub fn all_in<T: Readable>(&self, transaction: &mut T) -> TransactionResult<Vec<D>> {
        transaction.fetch(self)
    }

    /// Fetches the first matching document in a transaction
    pub fn first_in<T: Readable>(&self, transaction: &mut T) -> TransactionResult<Option<D>> {
        Ok(transaction.fetch(&self.first())?.into_iter().next())
    }

    /// Deletes matching documents in a transaction
    pub fn delete_in<T: Writable>(&self, transaction: &mut T) -> TransactionResult<usize> {
        transaction.delete(self)
    }
}

impl<D> Query<D> {
    pub fn predicate(&self) -> Option<&Predicate<D>> {
        self.predicate.as_ref()
    }

    pub fn sort_keys(&self) -> &[SortKey<D>] {
        &self.sort_keys
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl<D: Document> Default for Query<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for Query<D> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            sort_keys: self.sort_keys.clone(),
            skip: self.skip,
            limit: self.limit,
        }
    }
}

impl<D> fmt::Debug for Query<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("predicate", &self.predicate)
            .field("sort_keys", &self.sort_keys)
            .field("skip", &self.skip)
            .field("limit", &self.limit)
            .finish()
    }
}

impl<D> PartialEq for Query<D> {
    fn eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate
            && self.sort_keys == other.sort_keys
            && self.skip == other.skip
            && self.limit == other.limit
    }
}
