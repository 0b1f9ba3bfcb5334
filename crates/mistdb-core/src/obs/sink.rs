//! Metrics sink boundary.
//!
//! Cursor and session logic MUST NOT depend on any metrics backend
//! directly. All instrumentation flows through MetricsEvent and
//! MetricsSink; installing a sink is the session owner's choice.

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    PageFetched {
        collection: &'static str,
        rows: u64,
    },
    CountExecuted {
        collection: &'static str,
    },
    CacheHit {
        collection: &'static str,
    },
    CacheMiss {
        collection: &'static str,
    },
    CacheFault {
        collection: &'static str,
    },
    RowPersisted {
        collection: &'static str,
    },
    RowDeleted {
        collection: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

///
/// NoopSink
/// Discards every event; the default when no sink is installed.
///

pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _event: MetricsEvent) {}
}
