//! MISB ST 1108 metric report synthesis.
//!
//! Builds an ST 1108 Interpretability and Quality local set from the fields
//! of one frame's metadata. Every field degrades on its own: a missing input
//! drops the entries derived from it, never the whole report.
//!
//! # Example
//!
//! ```rust
//! use parallax_klv::elements::metadata::St1108Synthesizer;
//! use parallax_klv::klv::St1108Tag;
//! use parallax_klv::metadata::FrameMetadata;
//!
//! let frame = FrameMetadata::klv().with_average_gsd(12.0).with_frame_rate(30.0);
//! let report = St1108Synthesizer::default().synthesize(&frame, 1, 1_700_000_000_000_000);
//!
//! assert_eq!(report.count(St1108Tag::MetricLocalSet), 1);
//! assert!(report.has(St1108Tag::MetricPeriodPack));
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use crate::klv::st1108::ST1108_DOCUMENT_VERSION;
use crate::klv::{
    AssessmentPoint, CompressionProfile, CompressionType, LocalSet, MetricImplementer,
    MetricPeriodPack, Packet, Real, St1108MetricSetTag, St1108Tag, UniversalKey,
};
use crate::metadata::FrameMetadata;

/// Name written for the ground sample distance metric.
pub const METRIC_NAME_GSD: &str = "GSD";

/// Name written for the VNIIRS metric.
pub const METRIC_NAME_VNIIRS: &str = "VNIIRS";

/// Assumed uncompressed bit depth: 8-bit RGB.
pub const DEFAULT_BITS_PER_PIXEL: u32 = 24;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for ST 1108 report synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateKlvConfig {
    /// Producer identity written into every metric local set.
    pub implementer: MetricImplementer,
    /// Uncompressed bits per pixel used for the compression ratio.
    pub bits_per_pixel: u32,
}

impl Default for UpdateKlvConfig {
    fn default() -> Self {
        Self {
            implementer: MetricImplementer::new("Parallax", "parallax-klv"),
            bits_per_pixel: DEFAULT_BITS_PER_PIXEL,
        }
    }
}

impl UpdateKlvConfig {
    /// Set the producer identity.
    pub fn with_implementer(
        mut self,
        organization: impl Into<String>,
        subgroup: impl Into<String>,
    ) -> Self {
        self.implementer = MetricImplementer::new(organization, subgroup);
        self
    }

    /// Set the uncompressed bit depth.
    pub fn with_bits_per_pixel(mut self, bits: u32) -> Self {
        self.bits_per_pixel = bits;
        self
    }
}

// ============================================================================
// Synthesizer
// ============================================================================

/// Builds ST 1108 local sets from frame metadata.
///
/// Stateless: the period index and clock reading are supplied by the caller,
/// so the same inputs always produce the same set.
#[derive(Debug, Clone, Default)]
pub struct St1108Synthesizer {
    config: UpdateKlvConfig,
}

impl St1108Synthesizer {
    /// Create a synthesizer.
    pub fn new(config: UpdateKlvConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &UpdateKlvConfig {
        &self.config
    }

    /// Key of the packets this synthesizer produces.
    pub fn key(&self) -> UniversalKey {
        UniversalKey::MISB_ST1108
    }

    /// Build the report for `frame`.
    ///
    /// `now_micros` is written as the time of every metric.
    pub fn synthesize(&self, frame: &FrameMetadata, period_index: u64, now_micros: u64) -> LocalSet {
        let mut set = LocalSet::new();
        set.insert(St1108Tag::AssessmentPoint, AssessmentPoint::Archive);

        if let Some(duration_us) = frame.frame_rate.and_then(frame_duration_us) {
            set.insert(
                St1108Tag::MetricPeriodPack,
                MetricPeriodPack::new(period_index, duration_us),
            );
        }

        let metrics = [
            (METRIC_NAME_GSD, frame.average_gsd),
            (METRIC_NAME_VNIIRS, frame.vniirs),
        ];
        for (name, value) in metrics {
            if let Some(value) = value {
                set.insert(
                    St1108Tag::MetricLocalSet,
                    self.metric_set(name, value, now_micros),
                );
            }
        }

        if let Some((kind, profile, level)) = compression(frame) {
            set.insert(St1108Tag::CompressionType, kind)
                .insert(St1108Tag::CompressionProfile, profile)
                .insert(St1108Tag::CompressionLevel, level);
        }

        if let Some(ratio) = self.compression_ratio(frame) {
            set.insert(St1108Tag::CompressionRatio, Real::single(ratio));
        }

        if let Some(bitrate) = frame.video_bitrate {
            set.insert(St1108Tag::StreamBitrate, bitrate / 1000);
        }

        set.insert(St1108Tag::DocumentVersion, ST1108_DOCUMENT_VERSION);
        set
    }

    /// Build the report for `frame` as a complete packet.
    pub fn packet(&self, frame: &FrameMetadata, period_index: u64, now_micros: u64) -> Packet {
        Packet::new(self.key(), self.synthesize(frame, period_index, now_micros))
    }

    fn metric_set(&self, name: &str, value: f64, now_micros: u64) -> LocalSet {
        let mut set = LocalSet::new();
        set.insert(St1108MetricSetTag::Name, name)
            .insert(St1108MetricSetTag::Version, "")
            .insert(St1108MetricSetTag::Implementer, self.config.implementer.clone())
            .insert(St1108MetricSetTag::Parameters, "")
            .insert(St1108MetricSetTag::Time, now_micros)
            .insert(St1108MetricSetTag::Value, Real::double(value));
        set
    }

    /// Uncompressed over compressed bits per frame.
    ///
    /// `None` unless width, height, bitrate, and frame rate are all present
    /// and the bitrate and frame rate are positive.
    pub fn compression_ratio(&self, frame: &FrameMetadata) -> Option<f64> {
        let width = frame.image_width?;
        let height = frame.image_height?;
        let bitrate = frame.video_bitrate?;
        let fps = frame.frame_rate?;
        if bitrate == 0 || !(fps.is_finite() && fps > 0.0) {
            return None;
        }

        let uncompressed = width as f64 * height as f64 * f64::from(self.config.bits_per_pixel);
        let compressed = bitrate as f64 / fps;
        Some(uncompressed / compressed)
    }
}

/// Frame duration in whole microseconds, or `None` for a frame rate that is
/// not positive and finite.
pub fn frame_duration_us(fps: f64) -> Option<u32> {
    if !(fps.is_finite() && fps > 0.0) {
        return None;
    }
    let micros = (1_000_000.0 / fps).round();
    (micros <= f64::from(u32::MAX)).then_some(micros as u32)
}

fn compression(frame: &FrameMetadata) -> Option<(CompressionType, CompressionProfile, String)> {
    let (Some(kind), Some(profile), Some(level)) = (
        frame.compression_type.as_deref(),
        frame.compression_profile.as_deref(),
        frame.compression_level.as_deref(),
    ) else {
        return None;
    };

    match (CompressionType::from_name(kind), CompressionProfile::from_name(profile)) {
        (Some(kind), Some(profile)) => Some((kind, profile, level.to_string())),
        _ => {
            tracing::debug!(
                compression_type = kind,
                compression_profile = profile,
                "unrecognized compression names, omitting compression fields"
            );
            None
        }
    }
}

/// Current wall-clock time in microseconds since the Unix epoch.
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klv::Value;

    const NOW: u64 = 1_700_000_000_000_000;

    fn full_frame() -> FrameMetadata {
        FrameMetadata::klv()
            .with_stream_index(1)
            .with_unix_timestamp(1)
            .with_average_gsd(12.0)
            .with_vniirs(5.0)
            .with_video_bitrate(500_000)
            .with_compression("H.264", "Main", "4.1")
            .with_frame_rate(30.0)
            .with_image_size(1280, 720)
    }

    fn expected_metric(name: &str, value: f64) -> LocalSet {
        let mut set = LocalSet::new();
        set.insert(St1108MetricSetTag::Name, name)
            .insert(St1108MetricSetTag::Version, "")
            .insert(
                St1108MetricSetTag::Implementer,
                MetricImplementer::new("Parallax", "parallax-klv"),
            )
            .insert(St1108MetricSetTag::Parameters, "")
            .insert(St1108MetricSetTag::Time, NOW)
            .insert(St1108MetricSetTag::Value, Real::double(value));
        set
    }

    #[test]
    fn test_full_report() {
        let report = St1108Synthesizer::default().synthesize(&full_frame(), 1, NOW);

        let mut expected = LocalSet::new();
        expected
            .insert(St1108Tag::AssessmentPoint, AssessmentPoint::Archive)
            .insert(St1108Tag::MetricPeriodPack, MetricPeriodPack::new(1, 33333))
            .insert(St1108Tag::MetricLocalSet, expected_metric("GSD", 12.0))
            .insert(St1108Tag::MetricLocalSet, expected_metric("VNIIRS", 5.0))
            .insert(St1108Tag::CompressionType, CompressionType::H264)
            .insert(St1108Tag::CompressionProfile, CompressionProfile::Main)
            .insert(St1108Tag::CompressionLevel, "4.1")
            .insert(St1108Tag::CompressionRatio, Real::single(1327.104))
            .insert(St1108Tag::StreamBitrate, 500u64)
            .insert(St1108Tag::DocumentVersion, 3u64);

        assert_eq!(report, expected);
    }

    #[test]
    fn test_minimal_report() {
        let frame = FrameMetadata::klv().with_vniirs(4.5);
        let report = St1108Synthesizer::default().synthesize(&frame, 7, NOW);

        let tags: Vec<_> = report.iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec![1, 4, 10]);
    }

    #[test]
    fn test_unrecognized_compression_omitted() {
        let frame = full_frame().with_compression("Theora", "Main", "4.1");
        let report = St1108Synthesizer::default().synthesize(&frame, 1, NOW);
        assert!(!report.has(St1108Tag::CompressionType));
        assert!(!report.has(St1108Tag::CompressionProfile));
        assert!(!report.has(St1108Tag::CompressionLevel));
        // Ratio does not depend on codec names.
        assert!(report.has(St1108Tag::CompressionRatio));
    }

    #[test]
    fn test_partial_compression_omitted() {
        let mut frame = full_frame();
        frame.compression_level = None;
        let report = St1108Synthesizer::default().synthesize(&frame, 1, NOW);
        assert_eq!(report.count(St1108Tag::CompressionType), 0);
    }

    #[test]
    fn test_compression_ratio_inputs() {
        let synth = St1108Synthesizer::default();
        let ratio = synth.compression_ratio(&full_frame()).unwrap();
        assert!((ratio - 1327.104).abs() < 1e-6);

        let mut frame = full_frame();
        frame.image_height = None;
        assert_eq!(synth.compression_ratio(&frame), None);

        let frame = full_frame().with_video_bitrate(0);
        assert_eq!(synth.compression_ratio(&frame), None);

        let frame = full_frame().with_frame_rate(0.0);
        assert_eq!(synth.compression_ratio(&frame), None);
    }

    #[test]
    fn test_bits_per_pixel_config() {
        let synth = St1108Synthesizer::new(UpdateKlvConfig::default().with_bits_per_pixel(12));
        let ratio = synth.compression_ratio(&full_frame()).unwrap();
        assert!((ratio - 663.552).abs() < 1e-6);
    }

    #[test]
    fn test_implementer_config() {
        let synth = St1108Synthesizer::new(
            UpdateKlvConfig::default().with_implementer("Example Org", "metrics"),
        );
        let frame = FrameMetadata::klv().with_average_gsd(1.0);
        let report = synth.synthesize(&frame, 1, NOW);
        let metric = report
            .at(St1108Tag::MetricLocalSet)
            .and_then(Value::as_local_set)
            .unwrap();
        assert_eq!(
            metric
                .at(St1108MetricSetTag::Implementer)
                .and_then(Value::as_implementer),
            Some(&MetricImplementer::new("Example Org", "metrics"))
        );
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(frame_duration_us(30.0), Some(33333));
        assert_eq!(frame_duration_us(29.97), Some(33367));
        assert_eq!(frame_duration_us(0.0), None);
        assert_eq!(frame_duration_us(-1.0), None);
        assert_eq!(frame_duration_us(f64::NAN), None);
    }

    #[test]
    fn test_bitrate_truncates() {
        let frame = FrameMetadata::klv()
            .with_average_gsd(1.0)
            .with_video_bitrate(1_999);
        let report = St1108Synthesizer::default().synthesize(&frame, 1, NOW);
        assert_eq!(
            report.at(St1108Tag::StreamBitrate).and_then(Value::as_uint),
            Some(1)
        );
    }

    #[test]
    fn test_now_micros_sane() {
        let now = now_micros();
        assert!(now > 1_670_000_000_000_000);
        assert!(now < 4_102_462_800_000_000);
    }
}
