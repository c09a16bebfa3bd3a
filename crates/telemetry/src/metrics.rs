//! Internal metrics collection.
//!
//! Counters live in-process and are exposed as a JSON snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements without wrapping below zero.
    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Upper bounds in ms; deliveries include retry backoff, hence the long tail
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [10, 50, 100, 250, 500, 1000, 2500, 5000, 10000, 30000, 60000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the asset tracker.
#[derive(Debug, Default)]
pub struct Metrics {
    // Rate limiter
    pub requests_admitted: Counter,
    pub rate_limited_requests: Counter,
    pub rate_limit_buckets: Gauge,
    pub rate_limit_buckets_evicted: Counter,

    // Notification client
    pub notification_attempts: Counter,
    pub notifications_sent: Counter,
    pub notifications_failed: Counter,
    pub notifications_rejected: Counter,
    pub notification_latency_ms: Histogram,

    // Threshold policy and lifecycle events
    pub threshold_checks: Counter,
    pub threshold_notifications: Counter,
    pub threshold_check_errors: Counter,
    pub lifecycle_notifications: Counter,

    // Background dispatch
    pub dispatch_enqueued: Counter,
    pub dispatch_dropped: Counter,
    pub dispatch_timeouts: Counter,
    pub dispatch_queue_depth: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub requests_admitted: u64,
    pub rate_limited_requests: u64,
    pub rate_limit_buckets: u64,
    pub rate_limit_buckets_evicted: u64,
    pub notification_attempts: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
    pub notifications_rejected: u64,
    pub notification_latency_mean_ms: f64,
    /// `(upper_bound_ms, count)` pairs
    pub notification_latency_buckets: Vec<(u64, u64)>,
    pub threshold_checks: u64,
    pub threshold_notifications: u64,
    pub threshold_check_errors: u64,
    pub lifecycle_notifications: u64,
    pub dispatch_enqueued: u64,
    pub dispatch_dropped: u64,
    pub dispatch_timeouts: u64,
    pub dispatch_queue_depth: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            requests_admitted: self.requests_admitted.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            rate_limit_buckets: self.rate_limit_buckets.get(),
            rate_limit_buckets_evicted: self.rate_limit_buckets_evicted.get(),
            notification_attempts: self.notification_attempts.get(),
            notifications_sent: self.notifications_sent.get(),
            notifications_failed: self.notifications_failed.get(),
            notifications_rejected: self.notifications_rejected.get(),
            notification_latency_mean_ms: self.notification_latency_ms.mean(),
            notification_latency_buckets: self.notification_latency_ms.buckets(),
            threshold_checks: self.threshold_checks.get(),
            threshold_notifications: self.threshold_notifications.get(),
            threshold_check_errors: self.threshold_check_errors.get(),
            lifecycle_notifications: self.lifecycle_notifications.get(),
            dispatch_enqueued: self.dispatch_enqueued.get(),
            dispatch_dropped: self.dispatch_dropped.get(),
            dispatch_timeouts: self.dispatch_timeouts.get(),
            dispatch_queue_depth: self.dispatch_queue_depth.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
