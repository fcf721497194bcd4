//! Observability subsystem for shardb
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Engine counters
//!
//! Observability is read-only: nothing here changes build output or
//! query results.

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log a lifecycle event at the severity it implies
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
///
/// Fatal events log at FATAL, degradations at WARN, everything else at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else if event.is_degraded() {
        Severity::Warn
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a lifecycle event at TRACE, for per-query chatter
pub fn trace_event(event: Event, fields: &[(&str, &str)]) {
    Logger::trace(event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::EngineInit);
        log_event(Event::EngineReady);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::IndexMissing, &[("field", "status")]);
        trace_event(Event::QueryComplete, &[("records", "2")]);
    }
}
