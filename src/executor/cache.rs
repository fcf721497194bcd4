//! Engine-lifetime caches
//!
//! A built database never changes, so cached entries are never
//! invalidated. Two queries filling the same key at once only duplicate
//! I/O: both store the same immutable value.
//!
//! A poisoned lock still guards consistent data (every write is a single
//! insert), so poisoning is ignored.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::index::FieldIndex;

/// Field name -> loaded index.
///
/// Caches absent indexes too (`None`), so a field without an index file is
/// probed once. Load errors are not cached.
#[derive(Debug, Default)]
pub struct IndexCache {
    entries: RwLock<HashMap<String, Option<Arc<FieldIndex>>>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the field was never looked up; `Some(None)` when it was
    /// and no index exists
    pub fn get(&self, field: &str) -> Option<Option<Arc<FieldIndex>>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(field)
            .cloned()
    }

    pub fn insert(&self, field: &str, index: Option<Arc<FieldIndex>>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(field.to_string(), index);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record id -> loaded record, optionally bounded with FIFO eviction
#[derive(Debug)]
pub struct RecordCache {
    capacity: Option<usize>,
    inner: RwLock<RecordCacheInner>,
}

#[derive(Debug, Default)]
struct RecordCacheInner {
    records: HashMap<String, Arc<Value>>,
    insertion_order: VecDeque<String>,
}

impl RecordCache {
    /// Creates a cache; `None` never evicts
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            inner: RwLock::new(RecordCacheInner::default()),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Value>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .get(id)
            .cloned()
    }

    pub fn insert(&self, id: &str, record: Arc<Value>) {
        if self.capacity == Some(0) {
            return;
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.records.insert(id.to_string(), record).is_some() {
            return;
        }
        inner.insertion_order.push_back(id.to_string());

        if let Some(capacity) = self.capacity {
            while inner.records.len() > capacity {
                match inner.insertion_order.pop_front() {
                    Some(oldest) => {
                        inner.records.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
