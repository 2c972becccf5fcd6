//! Driver Counters
//!
//! Owned by the host and shared with the framing loop. Every increment is
//! mirrored to the `metrics` facade so an installed exporter sees it too.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Framing attempts
pub const READ_COUNT: &str = "uwb_count";
/// Rejected frames
pub const READ_ERRORS: &str = "uwb_err";
/// Published reports
pub const PUBLISHED: &str = "uwb_published";
/// Attempts that collected no bytes
pub const SILENT: &str = "uwb_silent";

/// Health counters for one driver instance
#[derive(Debug, Default)]
pub struct DriverCounters {
    reads: AtomicU64,
    errors: AtomicU64,
    published: AtomicU64,
    silent: AtomicU64,
}

impl DriverCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one framing attempt
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(READ_COUNT).increment(1);
    }

    /// Count one rejected frame
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(READ_ERRORS).increment(1);
    }

    /// Count one attempt in which the module sent nothing
    pub fn record_silent(&self) {
        self.silent.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(SILENT).increment(1);
    }

    /// Count one report handed to the sink
    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(PUBLISHED).increment(1);
    }

    /// Framing attempts so far
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Rejected frames so far
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Silent attempts so far
    pub fn silent(&self) -> u64 {
        self.silent.load(Ordering::Relaxed)
    }

    /// Published reports so far
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Copy of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            reads: self.reads(),
            errors: self.errors(),
            published: self.published(),
            silent: self.silent(),
        }
    }
}

/// Point-in-time copy of [`DriverCounters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub reads: u64,
    pub errors: u64,
    pub published: u64,
    pub silent: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let counters = DriverCounters::new();
        counters.record_read();
        counters.record_read();
        counters.record_error();
        counters.record_silent();
        counters.record_published();

        assert_eq!(
            counters.snapshot(),
            CounterSnapshot {
                reads: 2,
                errors: 1,
                published: 1,
                silent: 1,
            }
        );
    }
}
