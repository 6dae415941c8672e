//! Performance aggregation with explicit span recording.
//!
//! The execution loop calls [`PerformanceMonitor::record`] around each
//! coordinator invocation and around the whole run; the monitor never alters
//! control flow or return values. A disabled monitor is a no-op passthrough.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

/// Running aggregate for one operation name.
#[derive(Debug, Clone)]
struct OperationStats {
    calls: u64,
    errors: u64,
    total: Duration,
    min: Duration,
    max: Duration,
}

impl OperationStats {
    fn new() -> Self {
        Self {
            calls: 0,
            errors: 0,
            total: Duration::ZERO,
            min: Duration::MAX,
            max: Duration::ZERO,
        }
    }

    fn record(&mut self, duration: Duration, ok: bool) {
        self.calls += 1;
        if !ok {
            self.errors += 1;
        }
        self.total += duration;
        self.min = self.min.min(duration);
        self.max = self.max.max(duration);
    }
}

/// Point-in-time summary of one operation's aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSummary {
    /// Number of recorded calls.
    pub calls: u64,
    /// Number of calls recorded as failed.
    pub errors: u64,
    /// Shortest recorded duration.
    pub min: Duration,
    /// Longest recorded duration.
    pub max: Duration,
    /// Mean duration over all calls.
    pub avg: Duration,
    /// Fraction of calls that succeeded, in [0.0, 1.0].
    pub success_rate: f64,
}

/// Shared performance aggregates, safe for concurrent pipelines.
pub struct PerformanceMonitor {
    enabled: AtomicBool,
    stats: RwLock<HashMap<String, OperationStats>>,
}

impl PerformanceMonitor {
    /// Create an enabled monitor with no recorded operations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            stats: RwLock::new(HashMap::new()),
        }
    }

    /// Create a monitor that ignores every `record` call.
    #[must_use]
    pub fn disabled() -> Self {
        let monitor = Self::new();
        monitor.set_enabled(false);
        monitor
    }

    /// Toggle recording globally.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether `record` currently aggregates.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Record one span for `operation`.
    pub fn record(&self, operation: &str, duration: Duration, ok: bool) {
        if !self.is_enabled() {
            return;
        }
        let mut stats = self.stats.write();
        stats
            .entry(operation.to_string())
            .or_insert_with(OperationStats::new)
            .record(duration, ok);
    }

    /// Summary for one operation, if it has been recorded.
    #[must_use]
    pub fn summary(&self, operation: &str) -> Option<OperationSummary> {
        self.stats.read().get(operation).map(Self::summarize)
    }

    /// Summaries for every recorded operation, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, OperationSummary> {
        self.stats
            .read()
            .iter()
            .map(|(name, stats)| (name.clone(), Self::summarize(stats)))
            .collect()
    }

    /// Drop all aggregates.
    pub fn reset(&self) {
        self.stats.write().clear();
    }

    #[allow(clippy::cast_precision_loss)]
    fn summarize(stats: &OperationStats) -> OperationSummary {
        let calls = stats.calls.max(1);
        OperationSummary {
            calls: stats.calls,
            errors: stats.errors,
            min: if stats.calls == 0 { Duration::ZERO } else { stats.min },
            max: stats.max,
            avg: stats.total / u32::try_from(calls).unwrap_or(u32::MAX),
            success_rate: (stats.calls - stats.errors) as f64 / calls as f64,
        }
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_aggregates() {
        let monitor = PerformanceMonitor::new();
        monitor.record("combat", Duration::from_millis(10), true);
        monitor.record("combat", Duration::from_millis(30), true);
        monitor.record("combat", Duration::from_millis(20), false);

        let summary = monitor.summary("combat").unwrap();
        assert_eq!(summary.calls, 3);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.min, Duration::from_millis(10));
        assert_eq!(summary.max, Duration::from_millis(30));
        assert_eq!(summary.avg, Duration::from_millis(20));
        assert!((summary.success_rate - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_operation_has_no_summary() {
        let monitor = PerformanceMonitor::new();
        assert!(monitor.summary("ghost").is_none());
    }

    #[test]
    fn disabled_monitor_is_a_noop() {
        let monitor = PerformanceMonitor::disabled();
        monitor.record("combat", Duration::from_millis(5), true);
        assert!(monitor.summary("combat").is_none());
        assert!(!monitor.is_enabled());
    }

    #[test]
    fn reenabling_resumes_recording() {
        let monitor = PerformanceMonitor::disabled();
        monitor.record("a", Duration::from_millis(1), true);
        monitor.set_enabled(true);
        monitor.record("a", Duration::from_millis(1), true);
        assert_eq!(monitor.summary("a").unwrap().calls, 1);
    }

    #[test]
    fn snapshot_sorted_by_name() {
        let monitor = PerformanceMonitor::new();
        monitor.record("b", Duration::from_millis(1), true);
        monitor.record("a", Duration::from_millis(1), true);
        let names: Vec<String> = monitor.snapshot().keys().cloned().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn reset_clears_aggregates() {
        let monitor = PerformanceMonitor::new();
        monitor.record("a", Duration::from_millis(1), true);
        monitor.reset();
        assert!(monitor.snapshot().is_empty());
    }

    #[test]
    fn concurrent_updates() {
        use std::sync::Arc;

        let monitor = Arc::new(PerformanceMonitor::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = Arc::clone(&monitor);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        monitor.record("shared", Duration::from_micros(10), true);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(monitor.summary("shared").unwrap().calls, 800);
    }
}
