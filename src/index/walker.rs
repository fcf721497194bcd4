//! Field walk
//!
//! Visits every record and accumulates, per dot-joined field path, the
//! distinct scalar values observed there and the records that produced
//! them.
//!
//! - scalar at a path: one observation
//! - array at a path: each scalar element is an observation at the same
//!   path; object elements are walked with the array's path as prefix
//! - object at a path: walked with the path as prefix; the container path
//!   itself is never an observation

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use super::types::{FieldIndex, FieldIndexStats, FieldType, IndexEntry};

/// Observations for one distinct value
#[derive(Debug)]
struct ValueSlot {
    value: Value,
    record_ids: Vec<String>,
    /// Position of the record that last pushed an id, to keep ids unique
    last_record: usize,
}

/// Accumulated statistics for one field path
#[derive(Debug, Default)]
pub struct PathStats {
    /// Canonical JSON text -> slot
    values: HashMap<String, ValueSlot>,
    via_array: bool,
    saw_container: bool,
    records_seen: usize,
    last_record: Option<usize>,
}

impl PathStats {
    /// Number of distinct observed values
    pub fn unique_values(&self) -> usize {
        self.values.len()
    }

    /// Returns true when at least one scalar was observed
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Classification of the path
    pub fn field_type(&self) -> FieldType {
        if self.via_array {
            FieldType::Array
        } else if self.saw_container {
            FieldType::Nested
        } else {
            FieldType::Primitive
        }
    }

    /// Fraction of `total_records` that touched this path
    pub fn coverage(&self, total_records: usize) -> f64 {
        if total_records == 0 {
            0.0
        } else {
            self.records_seen as f64 / total_records as f64
        }
    }

    /// Converts the accumulated observations into an index.
    ///
    /// Entries are ordered by descending record count, ties by the value's
    /// JSON text.
    pub fn into_field_index(self, field: String, total_records: usize) -> FieldIndex {
        let coverage = self.coverage(total_records);

        let mut keyed: Vec<(String, ValueSlot)> = self.values.into_iter().collect();
        keyed.sort_by(|(ka, a), (kb, b)| {
            b.record_ids
                .len()
                .cmp(&a.record_ids.len())
                .then_with(|| ka.cmp(kb))
        });

        let entries: Vec<IndexEntry> = keyed
            .into_iter()
            .map(|(_, slot)| IndexEntry {
                value: slot.value,
                record_ids: slot.record_ids,
            })
            .collect();

        FieldIndex {
            field,
            metadata: FieldIndexStats {
                unique_values: entries.len(),
                total_records,
                coverage,
            },
            entries,
        }
    }

    fn touch(&mut self, position: usize) {
        if self.last_record != Some(position) {
            self.last_record = Some(position);
            self.records_seen += 1;
        }
    }
}

/// Walks records and collects per-path statistics
#[derive(Debug, Default)]
pub struct FieldWalker {
    paths: BTreeMap<String, PathStats>,
    total_records: usize,
}

impl FieldWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks one record. `position` must increase from call to call.
    pub fn observe_record(&mut self, position: usize, id: &str, record: &Value) {
        self.total_records += 1;
        if let Value::Object(map) = record {
            for (key, value) in map {
                self.visit(key.clone(), value, false, position, id);
            }
        }
    }

    fn visit(&mut self, path: String, value: &Value, via_array: bool, position: usize, id: &str) {
        match value {
            Value::Object(map) => {
                let stats = self.stats_mut(&path, position);
                stats.saw_container = true;
                stats.via_array |= via_array;
                for (key, child) in map {
                    self.visit(format!("{}.{}", path, key), child, via_array, position, id);
                }
            }
            Value::Array(items) => {
                self.stats_mut(&path, position).via_array = true;
                for item in items {
                    self.visit(path.clone(), item, true, position, id);
                }
            }
            scalar => {
                let stats = self.stats_mut(&path, position);
                stats.via_array |= via_array;
                observe(stats, scalar, position, id);
            }
        }
    }

    fn stats_mut(&mut self, path: &str, position: usize) -> &mut PathStats {
        let stats = self.paths.entry(path.to_string()).or_default();
        stats.touch(position);
        stats
    }

    /// Records walked so far
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Every discovered path, sorted
    pub fn fields(&self) -> Vec<String> {
        self.paths.keys().cloned().collect()
    }

    /// Finishes the walk, yielding `(path, stats)` sorted by path
    pub fn into_paths(self) -> impl Iterator<Item = (String, PathStats)> {
        self.paths.into_iter()
    }
}

fn observe(stats: &mut PathStats, value: &Value, position: usize, id: &str) {
    let key = value.to_string();
    let slot = stats.values.entry(key).or_insert_with(|| ValueSlot {
        value: value.clone(),
        record_ids: Vec::new(),
        last_record: usize::MAX,
    });
    if slot.last_record != position {
        slot.last_record = position;
        slot.record_ids.push(id.to_string());
    }
}
