//! Store Scenario Tests
//!
//! End-to-end behaviour through `Store` over the in-memory engine:
//! - Descriptor validation
//! - Predicate filtering
//! - Decode recovery (skip and delete)
//! - Ordering, skip and limit
//! - Identifier based replace and delete

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use docstore::engine::{AttributeValue, Attributes, MemoryEngine, PersistenceEngine, Session};
use docstore::observability::{LogLevel, RecordingLogger};
use docstore::schema::{
    decode_json, encode_json, BoxError, DeserializationError, StorableValue,
    DOCUMENT_DATA_ATTRIBUTE, DOCUMENT_IDENTIFIER_ATTRIBUTE,
};
use docstore::{
    CommitAction, Document, DocumentDescriptor, ErrorKind, Identifier, Index, InsertMode, Query,
    Readable, Resolution, Store, StoreConfig, StoreOptions, Writable,
};

// =============================================================================
// Documents
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: i64,
    name: String,
    age: i64,
}

static USER_ID: LazyLock<Identifier<User, i64>> = LazyLock::new(|| Identifier::new(|u: &User| u.id));
static AGE: LazyLock<Index<User, i64>> = LazyLock::new(|| Index::new("age", |u: &User| u.age));
static NAME: LazyLock<Index<User, String>> =
    LazyLock::new(|| Index::new("name", |u: &User| u.name.clone()));

impl Document for User {
    fn descriptor() -> &'static DocumentDescriptor<Self> {
        static DESCRIPTOR: LazyLock<DocumentDescriptor<User>> = LazyLock::new(|| {
            DocumentDescriptor::with_identifier("User", USER_ID.clone(), vec![AGE.erase(), NAME.erase()])
        });
        &DESCRIPTOR
    }

    fn encode(&self) -> Result<Vec<u8>, BoxError> {
        encode_json(self)
    }

    fn decode(data: &[u8]) -> Result<Self, DeserializationError> {
        decode_json(data, Resolution::SkipDocument)
    }
}

/// Unreadable cache entries are dropped instead of skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CachedPage {
    url: String,
}

impl Document for CachedPage {
    fn descriptor() -> &'static DocumentDescriptor<Self> {
        static DESCRIPTOR: LazyLock<DocumentDescriptor<CachedPage>> = LazyLock::new(|| {
            DocumentDescriptor::with_identifier(
                "CachedPage",
                Identifier::new(|p: &CachedPage| p.url.clone()),
                vec![],
            )
        });
        &DESCRIPTOR
    }

    fn encode(&self) -> Result<Vec<u8>, BoxError> {
        encode_json(self)
    }

    fn decode(data: &[u8]) -> Result<Self, DeserializationError> {
        decode_json(data, Resolution::DeleteDocument)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn open_store(engine: &MemoryEngine, logger: &RecordingLogger) -> Store {
    Store::open_with(
        StoreConfig::new("scenarios"),
        vec![User::descriptor().erase(), CachedPage::descriptor().erase()],
        Arc::new(engine.clone()),
        StoreOptions::with_logger(Arc::new(logger.clone())),
    )
    .unwrap()
}

fn user(id: i64, name: &str, age: i64) -> User {
    User {
        id,
        name: name.to_string(),
        age,
    }
}

/// Writes a record with an undecodable payload straight into the engine.
fn insert_garbage(engine: &MemoryEngine, entity: &str, identifier: StorableValue, extra: Vec<(&str, StorableValue)>) {
    let mut attributes = Attributes::new();
    attributes.insert(
        DOCUMENT_DATA_ATTRIBUTE.to_string(),
        AttributeValue::Binary(b"\xffnot a document".to_vec()),
    );
    attributes.insert(
        DOCUMENT_IDENTIFIER_ATTRIBUTE.to_string(),
        AttributeValue::Value(identifier),
    );
    for (name, value) in extra {
        attributes.insert(name.to_string(), AttributeValue::Value(value));
    }

    let mut session = engine.open_session().unwrap();
    session.insert(entity, attributes).unwrap();
    session.save().unwrap();
}

async fn add_users(store: &Store, users: Vec<User>) {
    store
        .write(move |tx| {
            for user in &users {
                tx.add(user)?;
            }
            Ok(CommitAction::SaveChanges)
        })
        .await
        .unwrap();
}

// =============================================================================
// Descriptor Validation
// =============================================================================

#[test]
fn test_valid_descriptor_has_no_issues() {
    let descriptor = DocumentDescriptor::<User>::new("User", vec![AGE.erase()]);
    assert!(descriptor.erase().validate().is_empty());
}

#[test]
fn test_reserved_prefix_is_single_issue() {
    let descriptor = DocumentDescriptor::<User>::new("_User", vec![]);
    let issues = descriptor.erase().validate();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].contains("_User"));
}

#[tokio::test]
async fn test_open_rejects_duplicate_descriptor_names() {
    let logger = RecordingLogger::new();
    let result = Store::open_with(
        StoreConfig::new("scenarios"),
        vec![
            User::descriptor().erase(),
            DocumentDescriptor::<User>::new("User", vec![]).erase(),
        ],
        Arc::new(MemoryEngine::new()),
        StoreOptions::with_logger(Arc::new(logger.clone())),
    );
    let err = result.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::DocumentDescriptionInvalid);
    assert_eq!(logger.events("DESCRIPTORS_INVALID").len(), 1);
}

// =============================================================================
// Filtering
// =============================================================================

#[tokio::test]
async fn test_fetch_with_predicate() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    let adults = Query::<User>::new().filtering(AGE.greater_than(18).unwrap());

    add_users(&store, vec![user(1, "Alice", 30)]).await;
    let query = adults.clone();
    let found = store.read(move |tx| Ok(query.all_in(tx)?)).await.unwrap();
    assert_eq!(found, vec![user(1, "Alice", 30)]);

    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(&store, vec![user(2, "Tim", 15)]).await;
    let found = store.read(move |tx| Ok(adults.all_in(tx)?)).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_like_and_negation() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(
        &store,
        vec![user(1, "Alice", 30), user(2, "Anna", 17), user(3, "Bob", 40)],
    )
    .await;

    let query = Query::<User>::new()
        .filtering(NAME.like("A*").unwrap())
        .excluding(AGE.less_than(18).unwrap());
    let found = store.read(move |tx| Ok(query.all_in(tx)?)).await.unwrap();
    assert_eq!(found, vec![user(1, "Alice", 30)]);
}

// =============================================================================
// Decode Recovery
// =============================================================================

#[tokio::test]
async fn test_skip_document_keeps_record() {
    let engine = MemoryEngine::new();
    let logger = RecordingLogger::new();
    let store = open_store(&engine, &logger);
    add_users(&store, vec![user(1, "Alice", 30), user(2, "Bob", 40)]).await;
    insert_garbage(
        &engine,
        "User",
        StorableValue::Int(3),
        vec![("age", StorableValue::Int(50)), ("name", StorableValue::String("Eve".into()))],
    );

    let (found, count) = store
        .read(|tx| {
            let query = Query::<User>::new();
            Ok((query.all_in(tx)?, query.count_in(tx)?))
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(count, 3);
    let warnings = logger.events("DOCUMENT_DECODE_FAILED");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, LogLevel::Warn);
    assert_eq!(warnings[0].field("resolution"), Some("skipDocument"));
}

#[tokio::test]
async fn test_delete_document_removes_record_on_save() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    store
        .write(|tx| {
            tx.add(&CachedPage { url: "/a".into() })?;
            Ok(CommitAction::SaveChanges)
        })
        .await
        .unwrap();
    insert_garbage(&engine, "CachedPage", StorableValue::String("/b".into()), vec![]);

    let first = store
        .read_write(|tx| {
            let pages = Query::<CachedPage>::new().all_in(tx)?;
            Ok((CommitAction::SaveChanges, pages))
        })
        .await
        .unwrap();
    assert_eq!(first, vec![CachedPage { url: "/a".into() }]);

    let remaining = store
        .read(|tx| Ok(Query::<CachedPage>::new().count_in(tx)?))
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn test_delete_resolution_discarded_in_read() {
    let engine = MemoryEngine::new();
    let logger = RecordingLogger::new();
    let store = open_store(&engine, &logger);
    insert_garbage(&engine, "CachedPage", StorableValue::String("/b".into()), vec![]);

    let found = store
        .read(|tx| Ok(Query::<CachedPage>::new().all_in(tx)?))
        .await
        .unwrap();
    assert!(found.is_empty());
    assert_eq!(logger.events("DELETE_RESOLUTION_DISCARDED").len(), 1);

    let count = store
        .read(|tx| Ok(Query::<CachedPage>::new().count_in(tx)?))
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// =============================================================================
// Ordering and Paging
// =============================================================================

#[tokio::test]
async fn test_order_skip_limit() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(
        &store,
        vec![user(1, "A", 30), user(2, "B", 10), user(3, "C", 20), user(4, "D", 40)],
    )
    .await;

    let query = Query::<User>::new()
        .ordered(AGE.ascending().unwrap())
        .skipping(2)
        .limiting(1);
    let found = store.read(move |tx| Ok(query.all_in(tx)?)).await.unwrap();
    assert_eq!(found, vec![user(1, "A", 30)]);
}

#[tokio::test]
async fn test_secondary_sort_key_breaks_ties() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(
        &store,
        vec![user(1, "Cleo", 20), user(2, "Abe", 20), user(3, "Bea", 10)],
    )
    .await;

    let query = Query::<User>::new()
        .ordered(AGE.descending().unwrap())
        .then_ordered(NAME.ascending().unwrap());
    let names: Vec<String> = store
        .read(move |tx| Ok(query.all_in(tx)?))
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Abe", "Cleo", "Bea"]);
}

#[tokio::test]
async fn test_first_in() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(&store, vec![user(1, "A", 30), user(2, "B", 10)]).await;

    let youngest = store
        .read(|tx| Ok(Query::<User>::new().ordered(AGE.ascending()?).first_in(tx)?))
        .await
        .unwrap();
    assert_eq!(youngest, Some(user(2, "B", 10)));
}

// =============================================================================
// Identifier Semantics
// =============================================================================

#[tokio::test]
async fn test_add_replaces_same_identifier() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(&store, vec![user(1, "Alice", 30)]).await;
    add_users(&store, vec![user(1, "Alice", 31)]).await;

    let found = store
        .read(|tx| Ok(tx.fetch(&Query::<User>::new().filtering(USER_ID.equal_to(1)?))?))
        .await
        .unwrap();
    assert_eq!(found, vec![user(1, "Alice", 31)]);
}

#[tokio::test]
async fn test_insert_only_if_absent() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(&store, vec![user(1, "Alice", 30)]).await;

    let written = store
        .read_write(|tx| {
            let written = tx.insert(&user(1, "Mallory", 99), InsertMode::AddOnly)?;
            Ok((CommitAction::SaveChanges, written))
        })
        .await
        .unwrap();
    assert!(!written);
}

#[tokio::test]
async fn test_delete_by_query_and_document() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());
    add_users(
        &store,
        vec![user(1, "A", 30), user(2, "B", 10), user(3, "C", 20)],
    )
    .await;

    let deleted = store
        .read_write(|tx| {
            let minors = Query::<User>::new().filtering(AGE.less_than(18)?).delete_in(tx)?;
            let existed = tx.delete_document(&user(3, "C", 20))?;
            Ok((CommitAction::SaveChanges, (minors, existed)))
        })
        .await
        .unwrap();
    assert_eq!(deleted, (1, true));

    let left = store
        .read(|tx| Ok(Query::<User>::new().all_in(tx)?))
        .await
        .unwrap();
    assert_eq!(left, vec![user(1, "A", 30)]);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_all_land() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());

    let handles: Vec<_> = (0..8)
        .map(|id| {
            store.write(move |tx| {
                tx.add(&user(id, "worker", id))?;
                Ok(CommitAction::SaveChanges)
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let count = store
        .read(|tx| Ok(Query::<User>::new().count_in(tx)?))
        .await
        .unwrap();
    assert_eq!(count, 8);
}

#[tokio::test]
async fn test_snapshot_isolates_uncommitted_writes() {
    let engine = MemoryEngine::new();
    let store = open_store(&engine, &RecordingLogger::new());

    let seen_inside = store
        .read_write(|tx| {
            tx.add(&user(1, "A", 30))?;
            Ok((CommitAction::DiscardChanges, Query::<User>::new().count_in(tx)?))
        })
        .await
        .unwrap();
    assert_eq!(seen_inside, 1);

    let seen_after = store
        .read(|tx| Ok(Query::<User>::new().count_in(tx)?))
        .await
        .unwrap();
    assert_eq!(seen_after, 0);
}
