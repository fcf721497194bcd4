//! Query engine
//!
//! Answers filtered, sorted, paginated queries against a built database
//! through any [`DataLoader`].
//!
//! Query flow:
//! 1. Plan: each filter gets `IndexLookup` or `FullScan`
//! 2. Resolve: each filter yields a candidate set, intersected with the
//!    running set; an empty set stops resolution early
//! 3. Load candidates concurrently, restore primary-index order
//! 4. Re-validate every candidate against every filter on the record itself
//! 5. Sort, then offset and limit
//!
//! Candidate sets hold primary-index positions, so record order never
//! depends on hash iteration or load completion order.
//!
//! Per-field and per-record failures degrade (full scan, record skipped)
//! and are logged at WARN. Only initialization and the primary index are
//! fatal.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::config::EngineConfig;
use crate::index::{DatabaseMetadata, FieldIndex, PrimaryEntry, PrimaryIndex};
use crate::loader::DataLoader;
use crate::observability::{log_event_with_fields, trace_event, EngineMetrics, Event};
use crate::planner::{Filter, QueryOptions, QueryPlan, QueryPlanner, ResolutionStrategy};
use crate::shard::SplitMetadata;

use super::cache::{IndexCache, RecordCache};
use super::errors::{EngineError, EngineResult};
use super::filters::PredicateFilter;
use super::result::QueryResult;
use super::sorter::ResultSorter;

type CandidateSet = BTreeSet<usize>;

/// Primary index plus an id -> position lookup
#[derive(Debug)]
struct PrimaryCatalog {
    index: PrimaryIndex,
    positions: HashMap<String, usize>,
}

impl PrimaryCatalog {
    fn new(index: PrimaryIndex) -> Self {
        let positions = index.positions();
        Self { index, positions }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn entry(&self, position: usize) -> Option<&PrimaryEntry> {
        self.index.entries.get(position)
    }

    fn all(&self) -> CandidateSet {
        (0..self.len()).collect()
    }
}

/// Read-only query engine over one built database
#[derive(Debug)]
pub struct QueryEngine {
    loader: Arc<dyn DataLoader>,
    config: EngineConfig,
    metadata: DatabaseMetadata,
    split: SplitMetadata,
    schema: Option<Value>,
    primary: OnceCell<PrimaryCatalog>,
    index_cache: IndexCache,
    record_cache: RecordCache,
    metrics: EngineMetrics,
}

impl QueryEngine {
    /// Loads metadata, manifest and optional schema, returning a ready engine.
    ///
    /// Missing or corrupt metadata or manifest is fatal. A missing schema is
    /// not; an unreadable one is logged and ignored.
    pub async fn open(loader: Arc<dyn DataLoader>, config: EngineConfig) -> EngineResult<Self> {
        config
            .validate()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        let location = loader.describe();
        log_event_with_fields(Event::EngineInit, &[("location", &location)]);

        let metadata = match loader.load_metadata().await {
            Ok(metadata) => metadata,
            Err(source) => {
                log_event_with_fields(
                    Event::EngineUnavailable,
                    &[("location", &location), ("reason", &source.to_string())],
                );
                return Err(EngineError::MetadataUnavailable { location, source });
            }
        };

        let split = match loader.load_split_metadata().await {
            Ok(split) => split,
            Err(source) => {
                log_event_with_fields(
                    Event::EngineUnavailable,
                    &[("location", &location), ("reason", &source.to_string())],
                );
                return Err(EngineError::ManifestUnavailable { location, source });
            }
        };

        let schema = match loader.load_schema().await {
            Ok(schema) => schema,
            Err(e) => {
                log_event_with_fields(Event::SchemaUnreadable, &[("reason", &e.to_string())]);
                None
            }
        };

        log_event_with_fields(
            Event::EngineReady,
            &[
                ("location", &location),
                ("records", &metadata.total_records.to_string()),
                ("indexes", &metadata.indexes.len().to_string()),
            ],
        );

        Ok(Self {
            record_cache: RecordCache::new(config.record_cache_capacity),
            loader,
            config,
            metadata,
            split,
            schema,
            primary: OnceCell::new(),
            index_cache: IndexCache::new(),
            metrics: EngineMetrics::new(),
        })
    }

    pub fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    pub fn split_metadata(&self) -> &SplitMetadata {
        &self.split
    }

    /// The database's `schema.json`, if it ships one
    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The plan `execute_query` would follow for `filters`
    pub fn plan(&self, filters: &[Filter]) -> QueryPlan {
        QueryPlanner::new(&self.metadata).plan(filters)
    }

    /// Returns the record with `id`, or `None` when the id is unknown or
    /// its shard cannot be read
    pub async fn get_record(&self, id: &str) -> EngineResult<Option<Value>> {
        let catalog = self.primary().await?;
        let Some(entry) = catalog.positions.get(id).and_then(|&p| catalog.entry(p)) else {
            return Ok(None);
        };

        Ok(self.load_entry(entry).await.map(|record| (*record).clone()))
    }

    /// Runs a query: every filter must match (AND), then sort and paginate
    pub async fn execute_query(
        &self,
        filters: &[Filter],
        options: &QueryOptions,
    ) -> EngineResult<QueryResult> {
        let started = Instant::now();
        self.metrics.increment_queries_executed();

        let catalog = self.primary().await?;
        let plan = self.plan(filters);
        let candidates = self.resolve_candidates(&plan, catalog).await;

        let positions: Vec<usize> = candidates.into_iter().collect();
        let loaded = self.load_positions(catalog, &positions).await;

        let loaded_count = loaded.len();
        let records: Vec<Value> = loaded
            .into_iter()
            .filter(|(_, record)| PredicateFilter::matches(record, filters))
            .map(|(_, record)| (*record).clone())
            .collect();
        self.metrics
            .add_revalidation_drops((loaded_count - records.len()) as u64);

        let sorted = ResultSorter::sort(records, &options.sort);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let result = QueryResult::paginate(sorted, options, elapsed_ms);

        trace_event(
            Event::QueryComplete,
            &[
                ("filters", &filters.len().to_string()),
                ("total", &result.total_count.to_string()),
                ("returned", &result.len().to_string()),
                ("elapsed_ms", &format!("{:.3}", elapsed_ms)),
            ],
        );
        Ok(result)
    }

    async fn primary(&self) -> EngineResult<&PrimaryCatalog> {
        self.primary
            .get_or_try_init(|| async {
                self.loader
                    .load_primary_index()
                    .await
                    .map(PrimaryCatalog::new)
                    .map_err(|source| EngineError::PrimaryIndexUnavailable {
                        location: self.loader.describe(),
                        source,
                    })
            })
            .await
    }

    async fn resolve_candidates(&self, plan: &QueryPlan, catalog: &PrimaryCatalog) -> CandidateSet {
        if plan.is_unfiltered() {
            return catalog.all();
        }

        let mut candidates: Option<CandidateSet> = None;
        for step in &plan.steps {
            let matched = match step.strategy {
                ResolutionStrategy::IndexLookup => match self.field_index(&step.filter.field).await {
                    Some(index) => {
                        self.metrics.increment_index_lookups();
                        lookup(&index, &step.filter, catalog)
                    }
                    None => {
                        self.metrics.increment_index_fallbacks();
                        self.scan(&step.filter, catalog, candidates.as_ref()).await
                    }
                },
                ResolutionStrategy::FullScan => {
                    self.scan(&step.filter, catalog, candidates.as_ref()).await
                }
            };

            let next = match candidates {
                None => matched,
                Some(current) => current.intersection(&matched).copied().collect(),
            };
            if next.is_empty() {
                return next;
            }
            candidates = Some(next);
        }

        candidates.unwrap_or_default()
    }

    /// Cached index for `field`; `None` when it is absent or unreadable
    async fn field_index(&self, field: &str) -> Option<Arc<FieldIndex>> {
        if let Some(cached) = self.index_cache.get(field) {
            self.metrics.increment_index_cache_hits();
            return cached;
        }

        match self.loader.load_index(field).await {
            Ok(Some(index)) if index.field != field => {
                log_event_with_fields(
                    Event::IndexUnreadable,
                    &[
                        ("field", field),
                        ("reason", &format!("file holds the index for '{}'", index.field)),
                    ],
                );
                self.index_cache.insert(field, None);
                None
            }
            Ok(Some(index)) => {
                let index = Arc::new(index);
                self.index_cache.insert(field, Some(Arc::clone(&index)));
                Some(index)
            }
            Ok(None) => {
                log_event_with_fields(Event::IndexMissing, &[("field", field)]);
                self.index_cache.insert(field, None);
                None
            }
            Err(e) => {
                log_event_with_fields(
                    Event::IndexUnreadable,
                    &[("field", field), ("reason", &e.to_string())],
                );
                None
            }
        }
    }

    /// Evaluates `filter` on loaded records; only `within` when a running
    /// candidate set exists, since anything outside it is intersected away
    async fn scan(
        &self,
        filter: &Filter,
        catalog: &PrimaryCatalog,
        within: Option<&CandidateSet>,
    ) -> CandidateSet {
        self.metrics.increment_full_scans();

        let positions: Vec<usize> = match within {
            Some(set) => set.iter().copied().collect(),
            None => (0..catalog.len()).collect(),
        };
        trace_event(
            Event::FullScan,
            &[("field", &filter.field), ("records", &positions.len().to_string())],
        );

        self.load_positions(catalog, &positions)
            .await
            .into_iter()
            .filter(|(_, record)| PredicateFilter::matches_filter(record, filter))
            .map(|(position, _)| position)
            .collect()
    }

    /// Loads records concurrently; unreadable ones are skipped. Output is
    /// in position order.
    async fn load_positions(
        &self,
        catalog: &PrimaryCatalog,
        positions: &[usize],
    ) -> Vec<(usize, Arc<Value>)> {
        let mut loaded: Vec<(usize, Arc<Value>)> = stream::iter(positions.iter().copied())
            .map(|position| async move {
                let entry = catalog.entry(position)?;
                self.load_entry(entry).await.map(|record| (position, record))
            })
            .buffer_unordered(self.config.scan_concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        loaded.sort_unstable_by_key(|(position, _)| *position);
        loaded
    }

    async fn load_entry(&self, entry: &PrimaryEntry) -> Option<Arc<Value>> {
        if let Some(record) = self.record_cache.get(&entry.id) {
            self.metrics.increment_record_cache_hits();
            return Some(record);
        }

        match self.loader.load_record(&entry.id, entry, &self.split).await {
            Ok(Some(record)) => {
                self.metrics.increment_records_loaded();
                let record = Arc::new(record);
                self.record_cache.insert(&entry.id, Arc::clone(&record));
                Some(record)
            }
            Ok(None) => {
                log_event_with_fields(
                    Event::RecordUnreadable,
                    &[("id", &entry.id), ("file", &entry.file), ("reason", "not found")],
                );
                None
            }
            Err(e) => {
                log_event_with_fields(
                    Event::RecordUnreadable,
                    &[("id", &entry.id), ("file", &entry.file), ("reason", &e.to_string())],
                );
                None
            }
        }
    }
}

/// Union of the record sets of every index entry the filter matches
fn lookup(index: &FieldIndex, filter: &Filter, catalog: &PrimaryCatalog) -> CandidateSet {
    index
        .entries
        .iter()
        .filter(|entry| PredicateFilter::matches_index_entry(&entry.value, filter.operator, &filter.value))
        .flat_map(|entry| entry.record_ids.iter())
        .filter_map(|id| catalog.positions.get(id).copied())
        .collect()
}
