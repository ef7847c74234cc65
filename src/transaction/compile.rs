//! Query compilation into engine requests

use crate::engine::{CountSpec, FetchSpec};
use crate::query::Query;
use crate::schema::Document;

/// Compiles a fetch of every field, or of record handles only
pub fn fetch_spec<D: Document>(query: &Query<D>, keys_only: bool) -> FetchSpec {
    FetchSpec {
        entity: D::descriptor().name().to_string(),
        filter: query.predicate().map(|p| p.filter().clone()),
        sort: query.sort_keys().iter().map(|key| key.spec().clone()).collect(),
        offset: query.skip(),
        limit: query.limit(),
        keys_only,
    }
}

/// Compiles a count. Sort keys, skip and limit do not apply.
pub fn count_spec<D: Document>(query: &Query<D>) -> CountSpec {
    CountSpec {
        entity: D::descriptor().name().to_string(),
        filter: query.predicate().map(|p| p.filter().clone()),
    }
}
