//! Metadata filter that folds an ST 1108 metric report into each frame.
//!
//! For every frame that can carry KLV and has a quality metric, the filter
//! synthesizes a report and merges it into the frame's packet list:
//!
//! - the first existing ST 1108 packet is replaced at its position, and
//!   any later ST 1108 packets are dropped;
//! - otherwise the report is appended.
//!
//! Other packets are never touched. Each stream index gets its own running
//! period index, starting at 1.

use std::collections::HashMap;
use std::time::Instant;

use super::metric_report::{St1108Synthesizer, UpdateKlvConfig, now_micros};
use crate::element::MetadataFilter;
use crate::metadata::{FrameMetadata, MetadataVec};
use crate::observability::{
    FilterMetrics, instrument_filter, trace_frame_skipped, trace_packet_merged,
};

/// Registry name of [`UpdateKlv`].
pub const UPDATE_KLV: &str = "update_klv";

/// Adds or refreshes the MISB ST 1108 report of every eligible frame.
///
/// Period counters live for the lifetime of the instance. Concurrent use
/// from several threads needs external serialization.
///
/// # Example
///
/// ```rust
/// use parallax_klv::element::MetadataFilter;
/// use parallax_klv::elements::metadata::UpdateKlv;
/// use parallax_klv::metadata::FrameMetadata;
///
/// let mut filter = UpdateKlv::new();
/// let frame = FrameMetadata::klv().with_stream_index(1).with_average_gsd(12.0);
///
/// let output = filter.filter(vec![Some(frame), None]);
/// assert_eq!(output.len(), 2);
/// assert_eq!(output[0].as_ref().and_then(|f| f.packets()).map(|p| p.len()), Some(1));
/// assert_eq!(filter.period_index(1), 1);
/// ```
pub struct UpdateKlv {
    synthesizer: St1108Synthesizer,
    /// Last emitted period index per stream index.
    period_indices: HashMap<u64, u64>,
    last_time: u64,
    clock: fn() -> u64,
    metrics: FilterMetrics,
}

impl UpdateKlv {
    /// Create a filter with the default configuration.
    pub fn new() -> Self {
        Self::with_config(UpdateKlvConfig::default())
    }

    /// Create a filter with the given configuration.
    pub fn with_config(config: UpdateKlvConfig) -> Self {
        Self {
            synthesizer: St1108Synthesizer::new(config),
            period_indices: HashMap::new(),
            last_time: 0,
            clock: now_micros,
            metrics: FilterMetrics::new(UPDATE_KLV),
        }
    }

    /// Replace the wall clock (microseconds since the Unix epoch).
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &UpdateKlvConfig {
        self.synthesizer.config()
    }

    /// Last period index emitted for `stream`, or 0 if none yet.
    pub fn period_index(&self, stream: u64) -> u64 {
        self.period_indices.get(&stream).copied().unwrap_or(0)
    }

    /// Forget every stream's period index.
    pub fn reset(&mut self) {
        self.period_indices.clear();
        self.last_time = 0;
    }

    fn next_period_index(&mut self, stream: u64) -> u64 {
        let index = self.period_indices.entry(stream).or_insert(0);
        *index += 1;
        *index
    }

    /// Metric times strictly increase across reports.
    fn next_time(&mut self) -> u64 {
        self.last_time = (self.clock)().max(self.last_time.saturating_add(1));
        self.last_time
    }

    fn update(&mut self, position: usize, frame: Option<FrameMetadata>) -> Option<FrameMetadata> {
        let Some(mut frame) = frame else {
            self.skip(position, "no metadata");
            return None;
        };
        if !frame.is_klv() {
            self.skip(position, "cannot carry klv");
            return Some(frame);
        }
        if !frame.has_quality_metric() {
            self.skip(position, "no quality metric");
            return Some(frame);
        }

        let stream = frame.stream_index.unwrap_or(0);
        let index = self.next_period_index(stream);
        let now = self.next_time();
        let packet = self.synthesizer.packet(&frame, index, now);
        let key = packet.key;
        self.metrics.record_report();

        let Some(packets) = frame.packets_mut() else {
            return Some(frame);
        };
        let replaced = match packets.iter().position(|p| p.key == key) {
            Some(first) => {
                packets[first] = packet;
                let mut seen = 0;
                packets.retain(|p| {
                    let keep = seen <= first || p.key != key;
                    seen += 1;
                    keep
                });
                self.metrics.record_replaced();
                true
            }
            None => {
                packets.push(packet);
                self.metrics.record_appended();
                false
            }
        };
        trace_packet_merged(UPDATE_KLV, position, &key, index, replaced);
        Some(frame)
    }

    fn skip(&self, position: usize, reason: &str) {
        self.metrics.record_skipped();
        trace_frame_skipped(UPDATE_KLV, position, reason);
    }
}

impl Default for UpdateKlv {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UpdateKlv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateKlv")
            .field("config", self.config())
            .field("period_indices", &self.period_indices)
            .finish_non_exhaustive()
    }
}

impl MetadataFilter for UpdateKlv {
    fn filter(&mut self, frames: MetadataVec) -> MetadataVec {
        let _span = instrument_filter(UPDATE_KLV, frames.len());
        let start = Instant::now();

        let output = frames
            .into_iter()
            .enumerate()
            .map(|(position, frame)| self.update(position, frame))
            .collect();
        self.metrics.record_time(start.elapsed());
        output
    }

    fn name(&self) -> &str {
        UPDATE_KLV
    }
}
