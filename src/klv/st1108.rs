//! MISB ST 1108.3: Interpretability and Quality Metadata Local Set.
//!
//! Reports image-quality metrics (GSD, VNIIRS, ...) for a window of frames,
//! along with how the stream was compressed at the assessment point.
//!
//! ```text
//! ST 1108 local set
//! ├── 1  Assessment Point       enum
//! ├── 2  Metric Period Pack     { index: u64, duration_us: u32 }
//! ├── 4  Metric Local Set       (repeated, one per metric)
//! │      ├── 1 Name  2 Version  3 Implementer  4 Parameters
//! │      └── 5 Time  6 Value
//! ├── 5  Compression Type       enum
//! ├── 6  Compression Profile    enum
//! ├── 7  Compression Level      text
//! ├── 8  Compression Ratio      float32
//! ├── 9  Stream Bitrate         uint, kbit/s
//! ├── 10 Document Version       uint
//! └── 11 Checksum               CRC-16-CCITT
//! ```

use bytes::{Buf, BufMut};

use super::ber::{ber_length_size, read_ber_length, write_ber_length};
use super::blob::read_blob;
use super::float::FloatFormat;
use super::format::{DataFormat, TagDictionary, TagTraits};
use super::value::{EnumDomain, Enumerated, Tag, Value};
use crate::error::{Error, Result};

/// Revision of ST 1108 this crate writes.
pub const ST1108_DOCUMENT_VERSION: u64 = 3;

// ============================================================================
// Tags
// ============================================================================

/// Top-level ST 1108 tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum St1108Tag {
    /// Where in the processing chain the metrics were assessed.
    AssessmentPoint = 1,
    /// Reporting window index and duration.
    MetricPeriodPack = 2,
    /// Image region the metrics apply to.
    WindowCornersPack = 3,
    /// One metric; repeated.
    MetricLocalSet = 4,
    /// Codec.
    CompressionType = 5,
    /// Codec profile.
    CompressionProfile = 6,
    /// Codec level, as text (e.g. "4.1").
    CompressionLevel = 7,
    /// Uncompressed over compressed size.
    CompressionRatio = 8,
    /// Stream bitrate in kbit/s.
    StreamBitrate = 9,
    /// ST 1108 revision.
    DocumentVersion = 10,
    /// Packet checksum.
    Checksum = 11,
}

impl From<St1108Tag> for Tag {
    fn from(tag: St1108Tag) -> Tag {
        tag as Tag
    }
}

/// Tags inside an ST 1108 metric local set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum St1108MetricSetTag {
    /// Metric name, e.g. "GSD".
    Name = 1,
    /// Metric version.
    Version = 2,
    /// Organization and subgroup that computed the metric.
    Implementer = 3,
    /// Metric parameters.
    Parameters = 4,
    /// Time the metric was computed, microseconds since the Unix epoch.
    Time = 5,
    /// Metric value.
    Value = 6,
}

impl From<St1108MetricSetTag> for Tag {
    fn from(tag: St1108MetricSetTag) -> Tag {
        tag as Tag
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Domain of [`AssessmentPoint`] codes.
pub static ASSESSMENT_POINT: EnumDomain = EnumDomain {
    name: "assessment point",
    names: &[
        "Sensor",
        "Sensor Encoder",
        "GCS Received",
        "GCS Transmitted",
        "Library/Archive",
    ],
};

/// Domain of [`CompressionType`] codes.
pub static COMPRESSION_TYPE: EnumDomain = EnumDomain {
    name: "compression type",
    names: &["Uncompressed", "H.262", "H.264", "H.265", "JPEG 2000"],
};

/// Domain of [`CompressionProfile`] codes.
pub static COMPRESSION_PROFILE: EnumDomain = EnumDomain {
    name: "compression profile",
    names: &[
        "Uncompressed",
        "Main",
        "Main 10",
        "Constrained Baseline",
        "High",
        "Main 4:2:2 12",
        "Main 4:4:4 12",
        "High 4:2:2",
        "High 4:4:4 Predictive",
    ],
};

/// Point in the processing chain where metrics were assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentPoint {
    /// At the sensor.
    Sensor = 0,
    /// After the sensor's encoder.
    SensorEncoder = 1,
    /// On receipt at the ground control station.
    GcsReceived = 2,
    /// On retransmission from the ground control station.
    GcsTransmitted = 3,
    /// Post-hoc, from a library or archive.
    Archive = 4,
}

impl From<AssessmentPoint> for Value {
    fn from(point: AssessmentPoint) -> Value {
        Value::Enum(Enumerated::new(&ASSESSMENT_POINT, point as u64))
    }
}

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// No compression.
    Uncompressed = 0,
    /// H.262 / MPEG-2.
    H262 = 1,
    /// H.264 / AVC.
    H264 = 2,
    /// H.265 / HEVC.
    H265 = 3,
    /// JPEG 2000.
    Jpeg2000 = 4,
}

impl CompressionType {
    /// Parse a codec name, accepting common aliases ("AVC", "HEVC", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let code = COMPRESSION_TYPE.code_of(name).or_else(|| {
            match name.to_ascii_uppercase().as_str() {
                "NONE" | "RAW" => Some(0),
                "MPEG-2" | "MPEG2" | "H262" => Some(1),
                "AVC" | "H264" | "MPEG-4 AVC" => Some(2),
                "HEVC" | "H265" => Some(3),
                "JPEG2000" | "J2K" => Some(4),
                _ => None,
            }
        })?;
        Self::from_code(code)
    }

    /// Variant for a raw code.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Uncompressed),
            1 => Some(Self::H262),
            2 => Some(Self::H264),
            3 => Some(Self::H265),
            4 => Some(Self::Jpeg2000),
            _ => None,
        }
    }
}

impl From<CompressionType> for Value {
    fn from(kind: CompressionType) -> Value {
        Value::Enum(Enumerated::new(&COMPRESSION_TYPE, kind as u64))
    }
}

/// Codec profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionProfile {
    /// No compression.
    Uncompressed = 0,
    /// Main.
    Main = 1,
    /// Main 10.
    Main10 = 2,
    /// Constrained Baseline.
    ConstrainedBaseline = 3,
    /// High.
    High = 4,
    /// Main 4:2:2 12.
    Main422_12 = 5,
    /// Main 4:4:4 12.
    Main444_12 = 6,
    /// High 4:2:2.
    High422 = 7,
    /// High 4:4:4 Predictive.
    High444Predictive = 8,
}

impl CompressionProfile {
    /// Parse a profile name, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let code = COMPRESSION_PROFILE
            .code_of(name)
            .or_else(|| match name.to_ascii_lowercase().as_str() {
                "baseline" => Some(3),
                "main10" => Some(2),
                _ => None,
            })?;
        Self::from_code(code)
    }

    /// Variant for a raw code.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Uncompressed),
            1 => Some(Self::Main),
            2 => Some(Self::Main10),
            3 => Some(Self::ConstrainedBaseline),
            4 => Some(Self::High),
            5 => Some(Self::Main422_12),
            6 => Some(Self::Main444_12),
            7 => Some(Self::High422),
            8 => Some(Self::High444Predictive),
            _ => None,
        }
    }
}

impl From<CompressionProfile> for Value {
    fn from(profile: CompressionProfile) -> Value {
        Value::Enum(Enumerated::new(&COMPRESSION_PROFILE, profile as u64))
    }
}

// ============================================================================
// Packs
// ============================================================================

/// Reporting window: a running per-stream index and the window duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricPeriodPack {
    /// Running report index within the stream.
    pub index: u64,
    /// Window duration in microseconds.
    pub duration_us: u32,
}

impl MetricPeriodPack {
    /// Encoded length: 8-byte index plus 4-byte duration.
    pub const LENGTH: usize = 12;

    /// Create a period pack.
    pub fn new(index: u64, duration_us: u32) -> Self {
        Self { index, duration_us }
    }

    pub(crate) fn read<B: Buf>(buf: &mut B, length: usize) -> Result<Self> {
        if length != Self::LENGTH {
            return Err(Error::malformed(format!(
                "metric period pack of {length} bytes"
            )));
        }
        if buf.remaining() < length {
            return Err(Error::underrun(length, buf.remaining()));
        }
        Ok(Self {
            index: buf.get_u64(),
            duration_us: buf.get_u32(),
        })
    }

    pub(crate) fn write<B: BufMut>(&self, buf: &mut B) {
        buf.put_u64(self.index);
        buf.put_u32(self.duration_us);
    }
}

/// Who computed a metric: organization and subgroup.
///
/// Encoded as a variable-length pack: each string prefixed by its BER length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricImplementer {
    /// Organization name.
    pub organization: String,
    /// Group or product within the organization.
    pub subgroup: String,
}

impl MetricImplementer {
    /// Create an implementer pack.
    pub fn new(organization: impl Into<String>, subgroup: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            subgroup: subgroup.into(),
        }
    }

    /// Encoded length in bytes.
    pub fn length(&self) -> usize {
        ber_length_size(self.organization.len())
            + self.organization.len()
            + ber_length_size(self.subgroup.len())
            + self.subgroup.len()
    }

    pub(crate) fn read<B: Buf>(buf: &mut B, length: usize) -> Result<Self> {
        let mut region = read_blob(buf, length)?.into_bytes();
        let organization = read_vlp_string(&mut region)?;
        let subgroup = read_vlp_string(&mut region)?;
        if region.has_remaining() {
            return Err(Error::malformed(format!(
                "{} trailing bytes in metric implementer",
                region.remaining()
            )));
        }
        Ok(Self {
            organization,
            subgroup,
        })
    }

    pub(crate) fn write<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        for part in [&self.organization, &self.subgroup] {
            write_ber_length(part.len(), buf, usize::MAX)?;
            buf.put_slice(part.as_bytes());
        }
        Ok(())
    }
}

fn read_vlp_string<B: Buf>(buf: &mut B) -> Result<String> {
    let length = read_ber_length(buf)?;
    let blob = read_blob(buf, length)?;
    String::from_utf8(blob.to_vec()).map_err(|_| Error::malformed("invalid UTF-8 in pack"))
}

// ============================================================================
// Dictionaries
// ============================================================================

/// Tags of an ST 1108 metric local set.
pub static ST1108_METRIC_SET: TagDictionary = TagDictionary {
    name: "ST 1108 metric local set",
    traits: &[
        TagTraits {
            tag: St1108MetricSetTag::Name as Tag,
            name: "Metric Name",
            format: DataFormat::String,
        },
        TagTraits {
            tag: St1108MetricSetTag::Version as Tag,
            name: "Metric Version",
            format: DataFormat::String,
        },
        TagTraits {
            tag: St1108MetricSetTag::Implementer as Tag,
            name: "Metric Implementer",
            format: DataFormat::Implementer,
        },
        TagTraits {
            tag: St1108MetricSetTag::Parameters as Tag,
            name: "Metric Parameters",
            format: DataFormat::String,
        },
        TagTraits {
            tag: St1108MetricSetTag::Time as Tag,
            name: "Metric Time",
            format: DataFormat::Uint { length: Some(8) },
        },
        TagTraits {
            tag: St1108MetricSetTag::Value as Tag,
            name: "Metric Value",
            format: DataFormat::Float(FloatFormat::DOUBLE),
        },
    ],
};

/// Tags of the top-level ST 1108 local set.
pub static ST1108_LOCAL_SET: TagDictionary = TagDictionary {
    name: "ST 1108 local set",
    traits: &[
        TagTraits {
            tag: St1108Tag::AssessmentPoint as Tag,
            name: "Assessment Point",
            format: DataFormat::Enum(&ASSESSMENT_POINT),
        },
        TagTraits {
            tag: St1108Tag::MetricPeriodPack as Tag,
            name: "Metric Period Pack",
            format: DataFormat::PeriodPack,
        },
        TagTraits {
            tag: St1108Tag::WindowCornersPack as Tag,
            name: "Window Corners Pack",
            format: DataFormat::Blob,
        },
        TagTraits {
            tag: St1108Tag::MetricLocalSet as Tag,
            name: "Metric Local Set",
            format: DataFormat::LocalSet(&ST1108_METRIC_SET),
        },
        TagTraits {
            tag: St1108Tag::CompressionType as Tag,
            name: "Compression Type",
            format: DataFormat::Enum(&COMPRESSION_TYPE),
        },
        TagTraits {
            tag: St1108Tag::CompressionProfile as Tag,
            name: "Compression Profile",
            format: DataFormat::Enum(&COMPRESSION_PROFILE),
        },
        TagTraits {
            tag: St1108Tag::CompressionLevel as Tag,
            name: "Compression Level",
            format: DataFormat::String,
        },
        TagTraits {
            tag: St1108Tag::CompressionRatio as Tag,
            name: "Compression Ratio",
            format: DataFormat::Float(FloatFormat::SINGLE),
        },
        TagTraits {
            tag: St1108Tag::StreamBitrate as Tag,
            name: "Stream Bitrate",
            format: DataFormat::Uint { length: None },
        },
        TagTraits {
            tag: St1108Tag::DocumentVersion as Tag,
            name: "Document Version",
            format: DataFormat::Uint { length: None },
        },
        TagTraits {
            tag: St1108Tag::Checksum as Tag,
            name: "Checksum",
            format: DataFormat::Uint { length: Some(2) },
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_type_names() {
        assert_eq!(CompressionType::from_name("H.264"), Some(CompressionType::H264));
        assert_eq!(CompressionType::from_name("hevc"), Some(CompressionType::H265));
        assert_eq!(CompressionType::from_name("VP9"), None);
    }

    #[test]
    fn test_compression_profile_names() {
        assert_eq!(
            CompressionProfile::from_name("Main"),
            Some(CompressionProfile::Main)
        );
        assert_eq!(
            CompressionProfile::from_name("constrained baseline"),
            Some(CompressionProfile::ConstrainedBaseline)
        );
        assert_eq!(CompressionProfile::from_name("Extended"), None);
    }

    #[test]
    fn test_enum_values_carry_domain() {
        let value = Value::from(AssessmentPoint::Archive);
        let code = value.as_enum().unwrap();
        assert_eq!(code.code(), 4);
        assert_eq!(code.name(), Some("Library/Archive"));
        assert_ne!(value, Value::from(CompressionProfile::High));
    }

    #[test]
    fn test_period_pack_layout() {
        let mut out = Vec::new();
        MetricPeriodPack::new(1, 33333).write(&mut out);
        assert_eq!(out.len(), MetricPeriodPack::LENGTH);
        assert_eq!(&out[..8], &1u64.to_be_bytes());
        assert_eq!(&out[8..], &33333u32.to_be_bytes());

        let mut cursor = &out[..];
        let pack = MetricPeriodPack::read(&mut cursor, 12).unwrap();
        assert_eq!(pack, MetricPeriodPack::new(1, 33333));
    }

    #[test]
    fn test_period_pack_wrong_length() {
        let mut cursor: &[u8] = &[0; 8];
        assert!(matches!(
            MetricPeriodPack::read(&mut cursor, 8),
            Err(Error::MalformedValue(_))
        ));
    }

    #[test]
    fn test_implementer_pack() {
        let implementer = MetricImplementer::new("Parallax", "parallax-klv");
        let mut out = Vec::new();
        implementer.write(&mut out).unwrap();
        assert_eq!(out.len(), implementer.length());
        assert_eq!(out[0], 8);
        assert_eq!(&out[1..9], b"Parallax");

        let mut cursor = &out[..];
        let decoded = MetricImplementer::read(&mut cursor, out.len()).unwrap();
        assert_eq!(decoded, implementer);
    }

    #[test]
    fn test_implementer_trailing_bytes() {
        let mut cursor: &[u8] = &[1, b'a', 1, b'b', 0xFF];
        assert!(matches!(
            MetricImplementer::read(&mut cursor, 5),
            Err(Error::MalformedValue(_))
        ));
    }

    #[test]
    fn test_dictionary_covers_every_tag() {
        for tag in 1..=11u64 {
            assert!(ST1108_LOCAL_SET.get(tag).is_some(), "tag {tag}");
        }
        for tag in 1..=6u64 {
            assert!(ST1108_METRIC_SET.get(tag).is_some(), "tag {tag}");
        }
        assert!(ST1108_LOCAL_SET.get(12u64).is_none());
    }
}
