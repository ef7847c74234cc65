//! Commit identities, read views and version chains
//!
//! Visibility rule, given a read view `R` and a record's versions:
//! 1. Consider only versions with `commit_id <= R.upper_bound`
//! 2. Take the one with the largest commit id
//! 3. If it is a tombstone, the record is invisible

use crate::engine::spec::Attributes;

/// A totally ordered commit identity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CommitId(u64);

impl CommitId {
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the identity of the commit after this one
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// A stable snapshot boundary for reads.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ReadView {
    read_upper_bound: CommitId,
}

impl ReadView {
    #[inline]
    pub fn new(upper_bound: CommitId) -> Self {
        Self {
            read_upper_bound: upper_bound,
        }
    }

    #[inline]
    pub fn upper_bound(&self) -> CommitId {
        self.read_upper_bound
    }
}

/// Committed history of one record. `None` marks a tombstone.
#[derive(Clone, Debug, Default)]
pub struct VersionChain {
    versions: Vec<(CommitId, Option<Attributes>)>,
}

impl VersionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a version with document attributes
    pub fn push(&mut self, commit_id: CommitId, attributes: Attributes) {
        self.versions.push((commit_id, Some(attributes)));
    }

    /// Appends a tombstone
    pub fn push_tombstone(&mut self, commit_id: CommitId) {
        self.versions.push((commit_id, None));
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Returns the attributes visible under the view, if any
    pub fn visible(&self, view: ReadView) -> Option<&Attributes> {
        let upper_bound = view.upper_bound();
        self.versions
            .iter()
            .filter(|(commit_id, _)| *commit_id <= upper_bound)
            .max_by_key(|(commit_id, _)| *commit_id)
            .and_then(|(_, attributes)| attributes.as_ref())
    }
}
