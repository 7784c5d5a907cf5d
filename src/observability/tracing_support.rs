//! Tracing integration for structured logging and spans.

use tracing::{Level, Span, span};

use crate::klv::UniversalKey;

/// Create a span for one metadata filter invocation.
///
/// # Example
///
/// ```rust
/// use parallax_klv::observability::span_filter;
///
/// let span = span_filter("update_klv", 4);
/// let _guard = span.enter();
/// // Filtering here...
/// ```
#[inline]
pub fn span_filter(filter: &str, frames: usize) -> Span {
    span!(Level::DEBUG, "filter", filter = %filter, frames = frames)
}

/// Enter a filter span, returning the guard.
pub fn instrument_filter(filter: &str, frames: usize) -> tracing::span::EnteredSpan {
    span_filter(filter, frames).entered()
}

/// Log a frame passed through without a report.
#[inline]
pub fn trace_frame_skipped(filter: &str, frame: usize, reason: &str) {
    tracing::trace!(
        filter = %filter,
        frame = frame,
        reason = %reason,
        "frame skipped"
    );
}

/// Log a report folded into a frame's packet list.
#[inline]
pub fn trace_packet_merged(
    filter: &str,
    frame: usize,
    key: &UniversalKey,
    period_index: u64,
    replaced: bool,
) {
    tracing::debug!(
        filter = %filter,
        frame = frame,
        key = %key,
        period_index = period_index,
        action = if replaced { "replaced" } else { "appended" },
        "metric packet merged"
    );
}
