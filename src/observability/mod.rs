//! Observability features: metrics and tracing.
//!
//! - **Metrics**: Counters and histograms via `metrics-rs`
//! - **Tracing**: Structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `parallax_klv_reports_synthesized` | Counter | Metric reports synthesized |
//! | `parallax_klv_packets_replaced` | Counter | Packets replaced in place |
//! | `parallax_klv_packets_appended` | Counter | Packets appended |
//! | `parallax_klv_frames_skipped` | Counter | Frames passed through untouched |
//! | `parallax_klv_filter_time_ns` | Histogram | Time per filter call |
//!
//! All metrics carry a `filter` label.
//!
//! ## Tracing
//!
//! Every filter call runs inside a `DEBUG` span named `filter`. Skipped
//! frames log at `TRACE`, merged packets at `DEBUG`, and values kept as
//! blobs during decode at `WARN`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use parallax_klv::observability::init_metrics;
//!
//! // Initialize metrics (call once at startup)
//! init_metrics();
//!
//! // Use a metrics exporter (prometheus, statsd, etc.) to collect them
//! ```

mod metrics;
mod tracing_support;

pub use metrics::{FilterMetrics, init_metrics};
pub use tracing_support::{
    instrument_filter, span_filter, trace_frame_skipped, trace_packet_merged,
};
