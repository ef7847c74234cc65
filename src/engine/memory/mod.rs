//! In-process persistence engine
//!
//! Records live in version chains keyed by record handle. Every save commits
//! at the next commit id; sessions read either a pinned snapshot or the latest
//! committed state, plus their own unsaved changes.
//!
//! Conflicting writes from concurrent sessions overwrite each other: deleting
//! an already deleted record succeeds and simply appends another tombstone.

mod filters;
mod sorter;
mod version;

pub use filters::{like_regex, CompiledFilter};
pub use version::{CommitId, ReadView, VersionChain};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use super::errors::{EngineError, EngineResult};
use super::spec::{
    AttributeType, AttributeValue, Attributes, CountSpec, EntityDescription, FetchSpec, Filter,
    RawRecord, RecordHandle, SchemaDescription,
};
use super::traits::{PersistenceEngine, Session};

#[derive(Debug)]
struct StoredRecord {
    entity: String,
    chain: VersionChain,
}

#[derive(Debug)]
struct EngineState {
    schema: Option<SchemaDescription>,
    records: BTreeMap<RecordHandle, StoredRecord>,
    head: CommitId,
}

/// In-memory engine with snapshot isolation.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    state: Arc<RwLock<EngineState>>,
    next_record: Arc<AtomicU64>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(EngineState {
                schema: None,
                records: BTreeMap::new(),
                head: CommitId::new(0),
            })),
            next_record: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Returns the schema, if one has been created
    pub fn schema(&self) -> Option<SchemaDescription> {
        self.state.read().ok().and_then(|state| state.schema.clone())
    }

    /// Returns the identity of the latest commit
    pub fn head(&self) -> CommitId {
        self.state
            .read()
            .map(|state| state.head)
            .unwrap_or(CommitId::new(0))
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceEngine for MemoryEngine {
    fn create_schema(&self, schema: &SchemaDescription) -> EngineResult<()> {
        let mut state = self.state.write().map_err(|_| EngineError::Poisoned)?;
        state.schema = Some(schema.clone());
        Ok(())
    }

    fn open_session(&self) -> EngineResult<Box<dyn Session>> {
        Ok(Box::new(MemorySession {
            state: Arc::clone(&self.state),
            next_record: Arc::clone(&self.next_record),
            view: None,
            inserted: BTreeMap::new(),
            deleted: BTreeSet::new(),
        }))
    }
}

/// Session of a [`MemoryEngine`].
#[derive(Debug)]
pub struct MemorySession {
    state: Arc<RwLock<EngineState>>,
    next_record: Arc<AtomicU64>,
    view: Option<ReadView>,
    inserted: BTreeMap<RecordHandle, (String, Attributes)>,
    deleted: BTreeSet<RecordHandle>,
}

impl MemorySession {
    fn read_state(&self) -> EngineResult<RwLockReadGuard<'_, EngineState>> {
        self.state.read().map_err(|_| EngineError::Poisoned)
    }

    /// Collects every record of the entity visible to this session that
    /// matches the filter, in handle order.
    fn matching(&self, entity: &str, filter: Option<&Filter>) -> EngineResult<Vec<RawRecord>> {
        let state = self.read_state()?;
        entity_description(&state, entity)?;

        let filter = filter.map(CompiledFilter::compile).transpose()?;
        let view = self.view.unwrap_or_else(|| ReadView::new(state.head));

        let committed = state
            .records
            .iter()
            .filter(|(handle, record)| record.entity == entity && !self.deleted.contains(*handle))
            .filter_map(|(handle, record)| {
                record.chain.visible(view).map(|attributes| (*handle, attributes))
            });
        let pending = self
            .inserted
            .iter()
            .filter(|(_, (e, _))| e == entity)
            .map(|(handle, (_, attributes))| (*handle, attributes));

        let mut records: Vec<RawRecord> = committed
            .chain(pending)
            .filter(|(_, attributes)| filter.as_ref().map_or(true, |f| f.matches(attributes)))
            .map(|(handle, attributes)| RawRecord {
                handle,
                attributes: attributes.clone(),
            })
            .collect();
        records.sort_by_key(|record| record.handle);
        Ok(records)
    }
}

impl Session for MemorySession {
    fn pin_snapshot(&mut self) -> EngineResult<()> {
        let head = self.read_state()?.head;
        self.view = Some(ReadView::new(head));
        Ok(())
    }

    fn fetch(&mut self, spec: &FetchSpec) -> EngineResult<Vec<RawRecord>> {
        let mut records = self.matching(&spec.entity, spec.filter.as_ref())?;
        sorter::sort(&mut records, &spec.sort);

        let limit = spec.limit.unwrap_or(usize::MAX);
        let mut records: Vec<RawRecord> = records.into_iter().skip(spec.offset).take(limit).collect();
        if spec.keys_only {
            for record in &mut records {
                record.attributes.clear();
            }
        }
        Ok(records)
    }

    fn count(&mut self, spec: &CountSpec) -> EngineResult<usize> {
        Ok(self.matching(&spec.entity, spec.filter.as_ref())?.len())
    }

    fn insert(&mut self, entity: &str, attributes: Attributes) -> EngineResult<RecordHandle> {
        {
            let state = self.read_state()?;
            check_attributes(entity_description(&state, entity)?, &attributes)?;
        }
        let handle = RecordHandle::new(self.next_record.fetch_add(1, Ordering::SeqCst));
        self.inserted.insert(handle, (entity.to_string(), attributes));
        Ok(handle)
    }

    fn delete(&mut self, handle: RecordHandle) -> EngineResult<()> {
        if self.inserted.remove(&handle).is_some() {
            return Ok(());
        }
        // Records deleted by a concurrent commit are tombstoned again on save.
        if !self.read_state()?.records.contains_key(&handle) {
            return Err(EngineError::UnknownRecord(handle.value()));
        }
        self.deleted.insert(handle);
        Ok(())
    }

    fn has_changes(&self) -> bool {
        !self.inserted.is_empty() || !self.deleted.is_empty()
    }

    fn save(&mut self) -> EngineResult<()> {
        if !self.has_changes() {
            return Ok(());
        }

        let shared = Arc::clone(&self.state);
        let mut state = shared.write().map_err(|_| EngineError::Poisoned)?;
        let commit_id = state.head.next();

        for handle in std::mem::take(&mut self.deleted) {
            if let Some(record) = state.records.get_mut(&handle) {
                record.chain.push_tombstone(commit_id);
            }
        }
        for (handle, (entity, attributes)) in std::mem::take(&mut self.inserted) {
            let mut chain = VersionChain::new();
            chain.push(commit_id, attributes);
            state.records.insert(handle, StoredRecord { entity, chain });
        }

        state.head = commit_id;
        if self.view.is_some() {
            self.view = Some(ReadView::new(commit_id));
        }
        Ok(())
    }
}

fn entity_description<'a>(state: &'a EngineState, entity: &str) -> EngineResult<&'a EntityDescription> {
    state
        .schema
        .as_ref()
        .ok_or(EngineError::SchemaMissing)?
        .entity(entity)
        .ok_or_else(|| EngineError::UnknownEntity(entity.to_string()))
}

fn check_attributes(entity: &EntityDescription, attributes: &Attributes) -> EngineResult<()> {
    for (name, value) in attributes {
        let description = entity.attribute(name).ok_or_else(|| EngineError::UnknownAttribute {
            entity: entity.name.clone(),
            attribute: name.clone(),
        })?;
        let actual = match value {
            AttributeValue::Value(value) => AttributeType::Storage(value.storage_type()),
            AttributeValue::Binary(_) => AttributeType::Binary,
        };
        if actual != description.attribute_type {
            return Err(EngineError::AttributeType {
                entity: entity.name.clone(),
                attribute: name.clone(),
                expected: description.attribute_type.to_string(),
                actual: actual.to_string(),
            });
        }
    }

    for description in entity.attributes.iter().filter(|a| !a.optional) {
        if !attributes.contains_key(&description.name) {
            return Err(EngineError::MissingAttribute {
                entity: entity.name.clone(),
                attribute: description.name.clone(),
            });
        }
    }

    Ok(())
}
