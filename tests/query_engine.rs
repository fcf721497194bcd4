//! Build-then-query Tests
//!
//! End-to-end checks over a database built into a temp directory:
//! - build output layout and index contents
//! - query results, sorting and pagination
//! - index lookups and record scans agree
//! - point lookups

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use shardb::build::{validate_database, BuildError, DatabaseBuilder};
use shardb::config::{BuildConfig, EngineConfig};
use shardb::executor::QueryEngine;
use shardb::index::{FieldIndex, PrimaryIndex};
use shardb::layout;
use shardb::loader::FsLoader;
use shardb::planner::{Filter, QueryOptions, SortKey};
use shardb::shard::SplitMetadata;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn users() -> Vec<Value> {
    vec![
        json!({"id": "u1", "age": 30, "status": "active"}),
        json!({"id": "u2", "age": 25, "status": "active"}),
        json!({"id": "u3", "age": 40, "status": "inactive"}),
    ]
}

fn catalog() -> Vec<Value> {
    vec![
        json!({"id": "p1", "price": 10, "tags": ["x", "sale"], "brand": {"name": "acme"}}),
        json!({"id": "p2", "price": 25, "tags": ["y"], "brand": {"name": "globex"}}),
        json!({"id": "p3", "price": 10, "tags": ["x"], "brand": {"name": "acme"}}),
        json!({"id": "p4", "price": 40, "tags": [], "brand": {"name": "initech"}}),
        json!({"id": "p5", "price": 25, "tags": ["x", "y"]}),
        json!({"id": "p6", "price": 10, "tags": ["max"], "brand": {"name": "globex"}}),
    ]
}

fn build(records: &[Value], root: &Path, config: BuildConfig) {
    DatabaseBuilder::new(config)
        .unwrap()
        .build(records, root)
        .unwrap();
}

async fn open(root: &Path) -> QueryEngine {
    QueryEngine::open(Arc::new(FsLoader::new(root)), EngineConfig::default())
        .await
        .unwrap()
}

fn ids(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// =============================================================================
// Build Tests
// =============================================================================

/// One shard per record and a two-entry status index.
#[test]
fn test_build_writes_shards_and_status_index() {
    let temp = TempDir::new().unwrap();
    build(&users(), temp.path(), BuildConfig::default());

    let split = SplitMetadata::read_from_dir(temp.path()).unwrap();
    assert_eq!(split.total_files, 3);
    for file in &split.files {
        assert!(temp.path().join(file.path()).exists());
    }

    let status: FieldIndex = read_json(&temp.path().join(layout::index_path("status")));
    assert_eq!(status.entries.len(), 2);
    assert_eq!(status.entries[0].value, json!("active"));
    assert_eq!(status.entries[0].record_ids, vec!["u1", "u2"]);
    assert_eq!(status.entries[1].value, json!("inactive"));
    assert_eq!(status.entries[1].record_ids, vec!["u3"]);

    let metadata: Value = read_json(&temp.path().join(layout::METADATA_FILE));
    assert_eq!(metadata["totalRecords"], 3);
}

/// Duplicate keys abort the build and name the key.
#[test]
fn test_duplicate_key_names_value() {
    let temp = TempDir::new().unwrap();
    let records = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "a"})];

    let err = DatabaseBuilder::new(BuildConfig::default())
        .unwrap()
        .build(&records, temp.path())
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicatePrimaryKey { .. }));
    assert!(err.to_string().contains("\"a\""));
    assert!(!temp.path().join(layout::METADATA_FILE).exists());
}

/// Primary index ids are unique and follow input order.
#[test]
fn test_primary_index_unique_and_ordered() {
    let temp = TempDir::new().unwrap();
    build(&catalog(), temp.path(), BuildConfig::default().with_batch_size(4));

    let primary: PrimaryIndex = read_json(&temp.path().join(layout::primary_index_path()));
    let expected = ids(&catalog());
    assert_eq!(primary.ids().collect::<Vec<_>>(), expected);

    let unique: HashSet<&str> = primary.ids().collect();
    assert_eq!(unique.len(), primary.len());
    assert!(validate_database(temp.path()).is_valid());
}

// =============================================================================
// Query Tests
// =============================================================================

/// EQUALS through the status index.
#[tokio::test]
async fn test_equals_via_index() {
    let temp = TempDir::new().unwrap();
    build(&users(), temp.path(), BuildConfig::default());
    let engine = open(temp.path()).await;

    let result = engine
        .execute_query(&[Filter::eq("status", json!("active"))], &QueryOptions::default())
        .await
        .unwrap();

    let found: HashSet<String> = ids(&result.records).into_iter().collect();
    assert_eq!(found, HashSet::from(["u1".to_string(), "u2".to_string()]));
    assert_eq!(result.total_count, 2);
    assert!(!result.has_more);
}

/// Numeric range with descending sort.
#[tokio::test]
async fn test_greater_than_sorted_desc() {
    let temp = TempDir::new().unwrap();
    build(&users(), temp.path(), BuildConfig::default());
    let engine = open(temp.path()).await;

    let options = QueryOptions::new().with_sort(SortKey::desc("age"));
    let result = engine
        .execute_query(&[Filter::gt("age", json!(26))], &options)
        .await
        .unwrap();

    assert_eq!(ids(&result.records), vec!["u3", "u1"]);
    assert_eq!(result.records[0]["age"], 40);
}

/// Missing ids are not errors.
#[tokio::test]
async fn test_get_record_missing_is_none() {
    let temp = TempDir::new().unwrap();
    build(&users(), temp.path(), BuildConfig::default());
    let engine = open(temp.path()).await;

    assert!(engine.get_record("missing").await.unwrap().is_none());
}

/// Every input record comes back unchanged by id.
#[tokio::test]
async fn test_get_record_round_trip_batched() {
    let temp = TempDir::new().unwrap();
    build(&catalog(), temp.path(), BuildConfig::default().with_batch_size(4));
    let engine = open(temp.path()).await;

    for record in catalog() {
        let id = record["id"].as_str().unwrap();
        assert_eq!(engine.get_record(id).await.unwrap(), Some(record.clone()));
    }
}

/// CONTAINS on an array field gives the same answer with or without its index.
#[tokio::test]
async fn test_contains_array_with_and_without_index() {
    let temp = TempDir::new().unwrap();
    build(&catalog(), temp.path(), BuildConfig::default());
    let filters = [Filter::contains("tags", json!("x"))];

    let indexed = open(temp.path())
        .await
        .execute_query(&filters, &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(ids(&indexed.records), vec!["p1", "p3", "p5"]);

    fs::remove_file(temp.path().join(layout::index_path("tags"))).unwrap();
    let engine = open(temp.path()).await;
    let scanned = engine
        .execute_query(&filters, &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&scanned.records), ids(&indexed.records));
    assert_eq!(engine.metrics().snapshot().index_fallbacks, 1);
}

/// Index lookups and scans agree for every operator.
#[tokio::test]
async fn test_index_and_scan_agree() {
    let indexed_dir = TempDir::new().unwrap();
    let scan_dir = TempDir::new().unwrap();
    build(&catalog(), indexed_dir.path(), BuildConfig::default());
    build(
        &catalog(),
        scan_dir.path(),
        BuildConfig::default().with_index_fields(Vec::<String>::new()),
    );
    let indexed = open(indexed_dir.path()).await;
    let scanned = open(scan_dir.path()).await;

    let queries = vec![
        Filter::eq("price", json!(10)),
        Filter::not_eq("brand.name", json!("acme")),
        Filter::gte("price", json!(25)),
        Filter::lt("price", json!(25)),
        Filter::is_in("brand.name", ["globex", "initech"]),
        Filter::contains("tags", json!("y")),
        Filter::starts_with("brand.name", "gl"),
        Filter::ends_with("tags", "ale"),
    ];

    for filter in queries {
        let filters = [filter];
        let a = indexed
            .execute_query(&filters, &QueryOptions::default())
            .await
            .unwrap();
        let b = scanned
            .execute_query(&filters, &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(ids(&a.records), ids(&b.records), "filter {:?}", filters[0]);
    }
    assert_eq!(scanned.metrics().snapshot().index_lookups, 0);
}

/// Multiple filters intersect.
#[tokio::test]
async fn test_filters_intersect() {
    let temp = TempDir::new().unwrap();
    build(&catalog(), temp.path(), BuildConfig::default());
    let engine = open(temp.path()).await;
    let options = QueryOptions::default();

    let cheap = engine
        .execute_query(&[Filter::eq("price", json!(10))], &options)
        .await
        .unwrap();
    let tagged = engine
        .execute_query(&[Filter::contains("tags", json!("x"))], &options)
        .await
        .unwrap();
    let both = engine
        .execute_query(
            &[Filter::eq("price", json!(10)), Filter::contains("tags", json!("x"))],
            &options,
        )
        .await
        .unwrap();

    let tagged_ids: HashSet<String> = ids(&tagged.records).into_iter().collect();
    let expected: Vec<String> = ids(&cheap.records)
        .into_iter()
        .filter(|id| tagged_ids.contains(id))
        .collect();
    assert_eq!(ids(&both.records), expected);
    assert_eq!(expected, vec!["p1", "p3"]);
}

/// Pages concatenate to the unpaginated result.
#[tokio::test]
async fn test_pages_concatenate() {
    let temp = TempDir::new().unwrap();
    build(&catalog(), temp.path(), BuildConfig::default().with_batch_size(2));
    let engine = open(temp.path()).await;
    let sorted = || {
        QueryOptions::new()
            .with_sort(SortKey::asc("price"))
            .with_sort(SortKey::desc("id"))
    };

    let full = engine
        .execute_query(&[], &sorted())
        .await
        .unwrap();
    assert_eq!(full.total_count, 6);

    let mut paged = Vec::new();
    for offset in (0..6).step_by(4) {
        let options = sorted()
            .with_limit(4)
            .with_offset(offset);
        let page = engine.execute_query(&[], &options).await.unwrap();
        assert_eq!(page.total_count, 6);
        assert_eq!(page.has_more, offset + 4 < 6);
        paged.extend(page.records);
    }

    assert_eq!(ids(&paged), ids(&full.records));
    assert_eq!(ids(&full.records)[..3], ["p6", "p3", "p1"]);
}

/// Ties keep input order.
#[tokio::test]
async fn test_sort_is_stable() {
    let temp = TempDir::new().unwrap();
    let records = vec![
        json!({"id": "a", "rank": 2}),
        json!({"id": "b", "rank": 1}),
        json!({"id": "c", "rank": 2}),
        json!({"id": "d", "rank": 1}),
        json!({"id": "e", "rank": 2}),
    ];
    build(&records, temp.path(), BuildConfig::default());
    let engine = open(temp.path()).await;

    let options = QueryOptions::new().with_sort(SortKey::asc("rank"));
    let result = engine.execute_query(&[], &options).await.unwrap();
    assert_eq!(ids(&result.records), vec!["b", "d", "a", "c", "e"]);
}

/// Offsets past the end give an empty page with the full count.
#[tokio::test]
async fn test_offset_past_end() {
    let temp = TempDir::new().unwrap();
    build(&users(), temp.path(), BuildConfig::default());
    let engine = open(temp.path()).await;

    let options = QueryOptions::new().with_offset(10).with_limit(5);
    let result = engine.execute_query(&[], &options).await.unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.total_count, 3);
    assert!(!result.has_more);
}

/// Filters on unknown fields match nothing.
#[tokio::test]
async fn test_unknown_field_matches_nothing() {
    let temp = TempDir::new().unwrap();
    build(&users(), temp.path(), BuildConfig::default());
    let engine = open(temp.path()).await;

    let result = engine
        .execute_query(&[Filter::eq("nickname", json!("x"))], &QueryOptions::default())
        .await
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.total_count, 0);
}

// =============================================================================
// Index File Naming Tests
// =============================================================================

/// Fields that differ only in characters outside the plain file-name set
/// each keep their own index.
#[tokio::test]
async fn test_similar_field_names_keep_separate_indexes() {
    let temp = TempDir::new().unwrap();
    let records = vec![
        json!({"id": "a", "a b": "x", "a_b": "y", "名前": "太郎", "氏名": "花子"}),
        json!({"id": "b", "a b": "x", "a_b": "z", "名前": "次郎", "氏名": "太郎"}),
    ];
    build(&records, temp.path(), BuildConfig::default());
    assert!(validate_database(temp.path()).is_valid());

    let space: FieldIndex = read_json(&temp.path().join(layout::index_path("a b")));
    assert_eq!(space.field, "a b");
    let underscore: FieldIndex = read_json(&temp.path().join(layout::index_path("a_b")));
    assert_eq!(underscore.field, "a_b");

    let engine = open(temp.path()).await;
    let queries = [
        (Filter::eq("a b", "x"), vec!["a", "b"]),
        (Filter::eq("a_b", "z"), vec!["b"]),
        (Filter::eq("名前", "太郎"), vec!["a"]),
        (Filter::eq("氏名", "太郎"), vec!["b"]),
    ];
    for (filter, expected) in queries {
        let result = engine
            .execute_query(&[filter], &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(ids(&result.records), expected);
    }

    let metrics = engine.metrics().snapshot();
    assert_eq!(metrics.index_lookups, 4);
    assert_eq!(metrics.index_fallbacks, 0);
}

/// A record field named like the primary index does not replace it.
#[tokio::test]
async fn test_field_named_primary_keeps_primary_index() {
    let temp = TempDir::new().unwrap();
    let records = vec![json!({"id": "a", "_primary": 1}), json!({"id": "b", "_primary": 2})];
    build(&records, temp.path(), BuildConfig::default());

    let primary: PrimaryIndex = read_json(&temp.path().join(layout::primary_index_path()));
    assert_eq!(primary.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    assert!(validate_database(temp.path()).is_valid());

    let engine = open(temp.path()).await;
    let by_id = engine
        .execute_query(&[Filter::eq("id", "a")], &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(ids(&by_id.records), vec!["a"]);

    let by_field = engine
        .execute_query(&[Filter::eq("_primary", 2)], &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(ids(&by_field.records), vec!["b"]);
    assert_eq!(engine.metrics().snapshot().index_fallbacks, 0);
}
