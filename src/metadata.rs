//! Per-frame metadata records.

use crate::klv::Packet;

/// Metadata associated with one video frame.
///
/// Every descriptive field is optional. Records created with
/// [`FrameMetadata::klv`] can also carry an ordered list of KLV packets;
/// records created with [`FrameMetadata::new`] cannot, and metadata filters
/// leave their packet list alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameMetadata {
    /// Capture time in microseconds since the Unix epoch.
    pub unix_timestamp: Option<u64>,

    /// Average ground sample distance, in meters.
    pub average_gsd: Option<f64>,

    /// Video National Imagery Interpretability Rating Scale score.
    pub vniirs: Option<f64>,

    /// Video bitrate in bit/s.
    pub video_bitrate: Option<u64>,

    /// Codec name, e.g. "H.264".
    pub compression_type: Option<String>,

    /// Codec profile name, e.g. "Main".
    pub compression_profile: Option<String>,

    /// Codec level, e.g. "4.1".
    pub compression_level: Option<String>,

    /// Frames per second.
    pub frame_rate: Option<f64>,

    /// Frame width in pixels.
    pub image_width: Option<u64>,

    /// Frame height in pixels.
    pub image_height: Option<u64>,

    /// Index of the video stream within its container.
    pub stream_index: Option<u64>,

    /// KLV packets, or `None` if this record cannot carry them.
    klv: Option<Vec<Packet>>,
}

/// A frame sequence as seen by metadata filters; `None` marks a frame with
/// no metadata at all.
pub type MetadataVec = Vec<Option<FrameMetadata>>;

impl FrameMetadata {
    /// Create a record that cannot carry KLV packets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a KLV-capable record with no packets.
    pub fn klv() -> Self {
        Self::with_packets(Vec::new())
    }

    /// Create a KLV-capable record holding `packets`.
    pub fn with_packets(packets: Vec<Packet>) -> Self {
        Self {
            klv: Some(packets),
            ..Default::default()
        }
    }

    /// Whether this record can carry KLV packets.
    pub fn is_klv(&self) -> bool {
        self.klv.is_some()
    }

    /// The KLV packets, if this record can carry them.
    pub fn packets(&self) -> Option<&[Packet]> {
        self.klv.as_deref()
    }

    /// The KLV packets mutably, if this record can carry them.
    pub fn packets_mut(&mut self) -> Option<&mut Vec<Packet>> {
        self.klv.as_mut()
    }

    /// Replace the packet list. Ignored for records that cannot carry KLV.
    pub fn set_packets(&mut self, packets: Vec<Packet>) {
        if let Some(klv) = self.klv.as_mut() {
            *klv = packets;
        }
    }

    /// Whether the record carries any quality metric to report.
    pub fn has_quality_metric(&self) -> bool {
        self.average_gsd.is_some() || self.vniirs.is_some()
    }

    /// Set the capture timestamp.
    pub fn with_unix_timestamp(mut self, micros: u64) -> Self {
        self.unix_timestamp = Some(micros);
        self
    }

    /// Set the average ground sample distance.
    pub fn with_average_gsd(mut self, gsd: f64) -> Self {
        self.average_gsd = Some(gsd);
        self
    }

    /// Set the VNIIRS score.
    pub fn with_vniirs(mut self, vniirs: f64) -> Self {
        self.vniirs = Some(vniirs);
        self
    }

    /// Set the video bitrate.
    pub fn with_video_bitrate(mut self, bitrate: u64) -> Self {
        self.video_bitrate = Some(bitrate);
        self
    }

    /// Set the codec, profile, and level names.
    pub fn with_compression(
        mut self,
        compression_type: impl Into<String>,
        profile: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        self.compression_type = Some(compression_type.into());
        self.compression_profile = Some(profile.into());
        self.compression_level = Some(level.into());
        self
    }

    /// Set the frame rate.
    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    /// Set the frame dimensions.
    pub fn with_image_size(mut self, width: u64, height: u64) -> Self {
        self.image_width = Some(width);
        self.image_height = Some(height);
        self
    }

    /// Set the stream index.
    pub fn with_stream_index(mut self, index: u64) -> Self {
        self.stream_index = Some(index);
        self
    }
}
