//! Metrics collection using metrics-rs.

use metrics::{Counter, Histogram, Unit, counter, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const REPORTS_SYNTHESIZED: &str = "parallax_klv_reports_synthesized";
const PACKETS_REPLACED: &str = "parallax_klv_packets_replaced";
const PACKETS_APPENDED: &str = "parallax_klv_packets_appended";
const FRAMES_SKIPPED: &str = "parallax_klv_frames_skipped";
const FILTER_TIME_NS: &str = "parallax_klv_filter_time_ns";

/// Initialize metrics descriptions.
///
/// Call this once at application startup before using any metrics.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(
        REPORTS_SYNTHESIZED,
        Unit::Count,
        "Metric reports synthesized into frame metadata"
    );
    metrics::describe_counter!(
        PACKETS_REPLACED,
        Unit::Count,
        "Existing KLV packets replaced in place by a new report"
    );
    metrics::describe_counter!(
        PACKETS_APPENDED,
        Unit::Count,
        "KLV packets appended to a frame's packet list"
    );
    metrics::describe_counter!(
        FRAMES_SKIPPED,
        Unit::Count,
        "Frames passed through without a report"
    );
    metrics::describe_histogram!(
        FILTER_TIME_NS,
        Unit::Nanoseconds,
        "Time to filter one frame sequence"
    );
}

/// Metrics collector for one metadata filter instance.
///
/// Provides a convenient way to record metrics with pre-configured labels.
pub struct FilterMetrics {
    filter: String,
    reports: Counter,
    replaced: Counter,
    appended: Counter,
    skipped: Counter,
    filter_time: Histogram,
}

impl FilterMetrics {
    /// Create a collector labelled with the filter's name.
    pub fn new(filter: &str) -> Self {
        Self {
            filter: filter.to_string(),
            reports: counter!(REPORTS_SYNTHESIZED, "filter" => filter.to_string()),
            replaced: counter!(PACKETS_REPLACED, "filter" => filter.to_string()),
            appended: counter!(PACKETS_APPENDED, "filter" => filter.to_string()),
            skipped: counter!(FRAMES_SKIPPED, "filter" => filter.to_string()),
            filter_time: histogram!(FILTER_TIME_NS, "filter" => filter.to_string()),
        }
    }

    /// Record a synthesized report.
    #[inline]
    pub fn record_report(&self) {
        self.reports.increment(1);
    }

    /// Record a packet replaced in place.
    #[inline]
    pub fn record_replaced(&self) {
        self.replaced.increment(1);
    }

    /// Record a packet appended.
    #[inline]
    pub fn record_appended(&self) {
        self.appended.increment(1);
    }

    /// Record a frame passed through untouched.
    #[inline]
    pub fn record_skipped(&self) {
        self.skipped.increment(1);
    }

    /// Record the time one filter call took.
    #[inline]
    pub fn record_time(&self, duration: Duration) {
        self.filter_time.record(duration.as_nanos() as f64);
    }
}

impl std::fmt::Debug for FilterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterMetrics")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
