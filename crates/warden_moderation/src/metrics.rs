//! Counters for pipeline outcomes.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct WardenMetrics {
    inner: Arc<WardenMetricsInner>,
}

#[derive(Debug, Default)]
struct WardenMetricsInner {
    invites_seen: AtomicU64,
    dropped: AtomicU64,
    published: AtomicU64,
    enforced: AtomicU64,
    failed: AtomicU64,
    decode_failures: AtomicU64,
    notice_failures: AtomicU64,
    ledger_failures: AtomicU64,
    last_enforcement: parking_lot::Mutex<Option<DateTime<Local>>>,
}

impl WardenMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// An invite-class event entered the pipeline.
    pub fn record_invite(&self) {
        self.inner.invites_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// An event or bus message was dropped.
    pub fn record_dropped(&self) {
        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A record was published on the bus.
    pub fn record_published(&self) {
        self.inner.published.fetch_add(1, Ordering::Relaxed);
    }

    /// A kick went through.
    pub fn record_enforced(&self) {
        self.inner.enforced.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_enforcement.lock() = Some(Local::now());
    }

    /// An upstream call stopped the pipeline.
    pub fn record_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// A bus message failed to decode.
    pub fn record_decode_failure(&self) {
        self.inner.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A warning notice could not be sent.
    pub fn record_notice_failure(&self) {
        self.inner.notice_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A ledger append failed.
    pub fn record_ledger_failure(&self) {
        self.inner.ledger_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            invites_seen: load(&self.inner.invites_seen),
            dropped: load(&self.inner.dropped),
            published: load(&self.inner.published),
            enforced: load(&self.inner.enforced),
            failed: load(&self.inner.failed),
            decode_failures: load(&self.inner.decode_failures),
            notice_failures: load(&self.inner.notice_failures),
            ledger_failures: load(&self.inner.ledger_failures),
            last_enforcement: *self.inner.last_enforcement.lock(),
        }
    }
}

/// Serializable counter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Invite-class events seen.
    pub invites_seen: u64,
    /// Events and bus messages dropped.
    pub dropped: u64,
    /// Records published on the bus.
    pub published: u64,
    /// Kicks carried out.
    pub enforced: u64,
    /// Pipelines stopped by an upstream failure.
    pub failed: u64,
    /// Malformed bus messages.
    pub decode_failures: u64,
    /// Warning notices that could not be sent.
    pub notice_failures: u64,
    /// Ledger appends that failed.
    pub ledger_failures: u64,
    /// Time of the most recent kick.
    pub last_enforcement: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = WardenMetrics::new();
        let shared = metrics.clone();

        metrics.record_invite();
        metrics.record_invite();
        shared.record_enforced();
        shared.record_notice_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.invites_seen, 2);
        assert_eq!(snapshot.enforced, 1);
        assert_eq!(snapshot.notice_failures, 1);
        assert_eq!(snapshot.failed, 0);
        assert!(snapshot.last_enforcement.is_some());
    }
}
