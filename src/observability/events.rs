//! Observable events for shardb
//!
//! Events are explicit and typed. Build-side events cover the one-shot
//! generator; engine-side events cover initialization and query
//! resolution, including the recoverable degradations (index fallback,
//! unreadable shard).

use std::fmt;

/// Observable events in shardb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Build
    /// All shard files and the manifest were written
    ShardsWritten,
    /// One field index file was written
    IndexWritten,
    /// A field was not indexed (cardinality or allow-list)
    IndexSkipped,
    /// Database validation finished
    ValidateComplete,

    // Engine
    /// Engine initialization begins
    EngineInit,
    /// Metadata and manifest loaded, queries can run
    EngineReady,
    /// Metadata or manifest missing or corrupt, no query can run
    EngineUnavailable,
    /// `schema.json` exists but could not be parsed; the engine runs without it
    SchemaUnreadable,
    /// No index file exists for a filtered field
    IndexMissing,
    /// An index file exists but could not be read or parsed
    IndexUnreadable,
    /// A shard could not be read or did not contain the record
    RecordUnreadable,
    /// A filter is being resolved by loading and checking records
    FullScan,
    /// Query finished
    QueryComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ShardsWritten => "SHARDS_WRITTEN",
            Event::IndexWritten => "INDEX_WRITTEN",
            Event::IndexSkipped => "INDEX_SKIPPED",
            Event::ValidateComplete => "VALIDATE_COMPLETE",

            Event::EngineInit => "ENGINE_INIT_BEGIN",
            Event::EngineReady => "ENGINE_READY",
            Event::EngineUnavailable => "ENGINE_UNAVAILABLE",
            Event::SchemaUnreadable => "SCHEMA_UNREADABLE",
            Event::IndexMissing => "INDEX_MISSING",
            Event::IndexUnreadable => "INDEX_UNREADABLE",
            Event::RecordUnreadable => "RECORD_UNREADABLE",
            Event::FullScan => "FULL_SCAN",
            Event::QueryComplete => "QUERY_COMPLETE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::EngineUnavailable)
    }

    /// Returns true if this event reports a recovered degradation
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Event::SchemaUnreadable
                | Event::IndexMissing
                | Event::IndexUnreadable
                | Event::RecordUnreadable
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        let events = [
            Event::ShardsWritten,
            Event::IndexSkipped,
            Event::EngineInit,
            Event::EngineReady,
            Event::FullScan,
            Event::QueryComplete,
        ];
        for event in events {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_degraded_events() {
        assert!(Event::IndexMissing.is_degraded());
        assert!(Event::RecordUnreadable.is_degraded());
        assert!(!Event::FullScan.is_degraded());
        assert!(Event::EngineUnavailable.is_fatal());
        assert!(!Event::IndexMissing.is_fatal());
    }
}
