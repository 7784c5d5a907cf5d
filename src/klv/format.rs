//! Per-tag data formats and local set encoding.
//!
//! Each standard describes its local set with a [`TagDictionary`]: a table
//! mapping tags to a name and a [`DataFormat`]. The format decides how the
//! value bytes are read, written, and measured.

use bytes::{Buf, BufMut};

use super::ber::{ber_length_size, ber_oid_size, read_ber_length, read_ber_oid};
use super::ber::{write_ber_length, write_ber_oid};
use super::blob::{Blob, read_blob, write_blob};
use super::float::{FloatFormat, ImapFormat};
use super::local_set::LocalSet;
use super::st1108::{MetricImplementer, MetricPeriodPack};
use super::value::{EnumDomain, Enumerated, Tag, Value};
use crate::error::{Error, Result};

/// How a value is laid out on the wire.
#[derive(Debug, Clone, Copy)]
pub enum DataFormat {
    /// Raw bytes.
    Blob,
    /// UTF-8 text.
    String,
    /// Big-endian unsigned integer; minimal width when `length` is `None`.
    Uint {
        /// Fixed width in bytes, if the standard documents one.
        length: Option<usize>,
    },
    /// IEEE 754 float.
    Float(FloatFormat),
    /// Linearly quantized real.
    Imap(ImapFormat),
    /// One-byte enumerated code.
    Enum(&'static EnumDomain),
    /// Nested local set.
    LocalSet(&'static TagDictionary),
    /// ST 1108 metric period pack.
    PeriodPack,
    /// ST 1108 metric implementer pack.
    Implementer,
}

impl DataFormat {
    /// Decode a value occupying exactly `length` bytes of `buf`.
    pub fn read<B: Buf>(&self, buf: &mut B, length: usize) -> Result<Value> {
        if buf.remaining() < length {
            return Err(Error::underrun(length, buf.remaining()));
        }

        match self {
            DataFormat::Blob => read_blob(buf, length).map(Value::Blob),
            DataFormat::String => {
                let blob = read_blob(buf, length)?;
                String::from_utf8(blob.to_vec())
                    .map(Value::String)
                    .map_err(|_| Error::malformed("invalid UTF-8 text"))
            }
            DataFormat::Uint { .. } => read_uint(buf, length).map(Value::Uint),
            DataFormat::Float(format) => format.read(buf, length).map(Value::Real),
            DataFormat::Imap(format) => format.read(buf, length).map(Value::Real),
            DataFormat::Enum(domain) => {
                let code = read_uint(buf, length)?;
                if !domain.contains(code) {
                    return Err(Error::malformed(format!(
                        "code {code} is not a defined {}",
                        domain.name
                    )));
                }
                Ok(Value::Enum(Enumerated::new(*domain, code)))
            }
            DataFormat::LocalSet(dictionary) => {
                read_local_set(dictionary, buf, length).map(Value::LocalSet)
            }
            DataFormat::PeriodPack => MetricPeriodPack::read(buf, length).map(Value::PeriodPack),
            DataFormat::Implementer => {
                MetricImplementer::read(buf, length).map(Value::Implementer)
            }
        }
    }

    /// Number of bytes `value` occupies under this format.
    pub fn length_of(&self, value: &Value) -> Result<usize> {
        match (self, value) {
            (_, Value::Blob(blob)) => Ok(blob.len()),
            (DataFormat::String, Value::String(s)) => Ok(s.len()),
            (DataFormat::Uint { length: Some(n) }, Value::Uint(_)) => Ok(*n),
            (DataFormat::Uint { length: None }, Value::Uint(v)) => Ok(uint_length(*v)),
            (DataFormat::Float(format), Value::Real(r)) => Ok(format.length_of(r)),
            (DataFormat::Imap(format), Value::Real(_)) => Ok(format.length()),
            (DataFormat::Enum(_), Value::Enum(_)) => Ok(1),
            (DataFormat::LocalSet(dictionary), Value::LocalSet(set)) => {
                local_set_length(dictionary, set)
            }
            (DataFormat::PeriodPack, Value::PeriodPack(_)) => Ok(MetricPeriodPack::LENGTH),
            (DataFormat::Implementer, Value::Implementer(i)) => Ok(i.length()),
            (format, value) => Err(mismatch(format, value)),
        }
    }

    /// Encode `value` into at most `max_length` bytes of `buf`.
    ///
    /// Blobs are written verbatim under any format, so foreign bytes survive
    /// a decode/encode cycle. Nothing is written if the value does not fit.
    pub fn write<B: BufMut>(&self, value: &Value, buf: &mut B, max_length: usize) -> Result<()> {
        let length = self.length_of(value)?;
        let available = max_length.min(buf.remaining_mut());
        if length > available {
            return Err(Error::overflow(length, available));
        }

        match (self, value) {
            (_, Value::Blob(blob)) => write_blob(blob, buf, length),
            (DataFormat::String, Value::String(s)) => {
                buf.put_slice(s.as_bytes());
                Ok(())
            }
            (DataFormat::Uint { .. }, Value::Uint(v)) => {
                if length < 8 && *v >> (8 * length) != 0 {
                    return Err(Error::malformed(format!(
                        "{v} does not fit in {length} bytes"
                    )));
                }
                buf.put_uint(*v, length);
                Ok(())
            }
            (DataFormat::Float(format), Value::Real(r)) => format.write(r, buf, length),
            (DataFormat::Imap(format), Value::Real(r)) => format.write(r.value(), buf, length),
            (DataFormat::Enum(domain), Value::Enum(e)) => {
                if e.domain() != *domain {
                    return Err(Error::malformed(format!(
                        "{:?} written as {}",
                        e, domain.name
                    )));
                }
                let code = u8::try_from(e.code())
                    .map_err(|_| Error::malformed(format!("enum code {} too large", e.code())))?;
                buf.put_u8(code);
                Ok(())
            }
            (DataFormat::LocalSet(dictionary), Value::LocalSet(set)) => {
                write_local_set(dictionary, set, buf, length)
            }
            (DataFormat::PeriodPack, Value::PeriodPack(pack)) => {
                pack.write(buf);
                Ok(())
            }
            (DataFormat::Implementer, Value::Implementer(i)) => i.write(buf),
            (format, value) => Err(mismatch(format, value)),
        }
    }
}

fn mismatch(format: &DataFormat, value: &Value) -> Error {
    Error::malformed(format!("{} value cannot be written as {format:?}", value.kind()))
}

fn read_uint<B: Buf>(buf: &mut B, length: usize) -> Result<u64> {
    if length == 0 || length > 8 {
        return Err(Error::malformed(format!("integer of {length} bytes")));
    }
    if buf.remaining() < length {
        return Err(Error::underrun(length, buf.remaining()));
    }
    Ok(buf.get_uint(length))
}

/// Minimal big-endian width of `value`; zero takes one byte.
pub fn uint_length(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

// ============================================================================
// Dictionaries
// ============================================================================

/// Name and format of one tag.
#[derive(Debug)]
pub struct TagTraits {
    /// Tag number.
    pub tag: Tag,
    /// Human-readable name.
    pub name: &'static str,
    /// Wire format of the value.
    pub format: DataFormat,
}

/// Tag table of one local set type.
#[derive(Debug)]
pub struct TagDictionary {
    /// Name of the local set.
    pub name: &'static str,
    /// Known tags.
    pub traits: &'static [TagTraits],
}

impl TagDictionary {
    /// Traits of `tag`, if known.
    pub fn get(&self, tag: impl Into<Tag>) -> Option<&'static TagTraits> {
        let tag = tag.into();
        self.traits.iter().find(|t| t.tag == tag)
    }

    /// Format of `tag`; unknown tags are blobs.
    pub fn format_of(&self, tag: Tag) -> DataFormat {
        self.get(tag).map(|t| t.format).unwrap_or(DataFormat::Blob)
    }
}

// ============================================================================
// Local Sets
// ============================================================================

/// Decode a local set occupying exactly `length` bytes of `buf`.
///
/// Tags, lengths, and value extents must fit inside the region; otherwise
/// the error propagates. A value whose bytes do not match its documented
/// format, or whose tag is unknown, is kept as [`Value::Blob`].
pub fn read_local_set<B: Buf>(
    dictionary: &TagDictionary,
    buf: &mut B,
    length: usize,
) -> Result<LocalSet> {
    if buf.remaining() < length {
        return Err(Error::underrun(length, buf.remaining()));
    }

    let mut region = buf.copy_to_bytes(length);
    let mut set = LocalSet::new();
    while region.has_remaining() {
        let tag = read_ber_oid(&mut region)?;
        let value_length = read_ber_length(&mut region)?;
        let raw = read_blob(&mut region, value_length)?;
        set.insert(tag, decode_value(dictionary, tag, raw));
    }
    Ok(set)
}

fn decode_value(dictionary: &TagDictionary, tag: Tag, raw: Blob) -> Value {
    let Some(traits) = dictionary.get(tag) else {
        tracing::debug!(
            dictionary = dictionary.name,
            tag = tag,
            length = raw.len(),
            "unknown tag kept as blob"
        );
        return Value::Blob(raw);
    };

    let mut cursor = raw.as_bytes();
    match traits.format.read(&mut cursor, raw.len()) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                dictionary = dictionary.name,
                tag = tag,
                name = traits.name,
                error = %error,
                "undecodable value kept as blob"
            );
            Value::Blob(raw)
        }
    }
}

/// Number of bytes `set` occupies when encoded.
pub fn local_set_length(dictionary: &TagDictionary, set: &LocalSet) -> Result<usize> {
    set.iter().try_fold(0usize, |total, (tag, value)| -> Result<usize> {
        let length = dictionary.format_of(tag).length_of(value)?;
        Ok(total + ber_oid_size(tag) + ber_length_size(length) + length)
    })
}

/// Encode `set` into at most `max_length` bytes of `buf`.
///
/// The whole set is measured before anything is written, so an overflow
/// leaves `buf` untouched.
pub fn write_local_set<B: BufMut>(
    dictionary: &TagDictionary,
    set: &LocalSet,
    buf: &mut B,
    max_length: usize,
) -> Result<()> {
    let total = local_set_length(dictionary, set)?;
    let available = max_length.min(buf.remaining_mut());
    if total > available {
        return Err(Error::overflow(total, available));
    }

    let mut remaining = total;
    for (tag, value) in set.iter() {
        let format = dictionary.format_of(tag);
        let length = format.length_of(value)?;
        write_ber_oid(tag, buf, remaining)?;
        remaining -= ber_oid_size(tag);
        write_ber_length(length, buf, remaining)?;
        remaining -= ber_length_size(length);
        format.write(value, buf, length)?;
        remaining -= length;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klv::float::Real;
    use crate::klv::st1108::{
        CompressionType, ST1108_LOCAL_SET, ST1108_METRIC_SET, St1108MetricSetTag, St1108Tag,
    };

    fn encode(dictionary: &TagDictionary, set: &LocalSet) -> Vec<u8> {
        let mut out = Vec::new();
        write_local_set(dictionary, set, &mut out, usize::MAX).unwrap();
        out
    }

    fn decode(dictionary: &TagDictionary, data: &[u8]) -> LocalSet {
        let mut cursor = data;
        read_local_set(dictionary, &mut cursor, data.len()).unwrap()
    }

    #[test]
    fn test_uint_length() {
        assert_eq!(uint_length(0), 1);
        assert_eq!(uint_length(255), 1);
        assert_eq!(uint_length(256), 2);
        assert_eq!(uint_length(u64::MAX), 8);
    }

    #[test]
    fn test_local_set_wire_layout() {
        let mut set = LocalSet::new();
        set.insert(St1108Tag::StreamBitrate, 500u64)
            .insert(St1108Tag::CompressionLevel, "4.1");

        let bytes = encode(&ST1108_LOCAL_SET, &set);
        assert_eq!(bytes, vec![9, 2, 0x01, 0xF4, 7, 3, b'4', b'.', b'1']);
        assert_eq!(local_set_length(&ST1108_LOCAL_SET, &set).unwrap(), bytes.len());
        assert_eq!(decode(&ST1108_LOCAL_SET, &bytes), set);
    }

    #[test]
    fn test_nested_local_set_round_trip() {
        let mut metric = LocalSet::new();
        metric
            .insert(St1108MetricSetTag::Name, "GSD")
            .insert(St1108MetricSetTag::Value, Real::double(12.0));
        let mut set = LocalSet::new();
        set.insert(St1108Tag::MetricLocalSet, metric.clone())
            .insert(St1108Tag::MetricLocalSet, metric)
            .insert(St1108Tag::CompressionType, CompressionType::H264);

        let bytes = encode(&ST1108_LOCAL_SET, &set);
        assert_eq!(decode(&ST1108_LOCAL_SET, &bytes), set);
    }

    #[test]
    fn test_unknown_tag_preserved() {
        let data = [0x7E, 2, 0xDE, 0xAD, 10, 1, 3];
        let set = decode(&ST1108_LOCAL_SET, &data);
        assert_eq!(set.at(0x7Eu64), Some(&Value::Blob(Blob::from(vec![0xDE, 0xAD]))));
        assert_eq!(set.at(St1108Tag::DocumentVersion), Some(&Value::Uint(3)));

        // Preserved bytes are written back verbatim.
        assert_eq!(encode(&ST1108_LOCAL_SET, &set), data.to_vec());
    }

    #[test]
    fn test_out_of_domain_enum_preserved() {
        let data = [5, 1, 0x63];
        let set = decode(&ST1108_LOCAL_SET, &data);
        assert_eq!(
            set.at(St1108Tag::CompressionType),
            Some(&Value::Blob(Blob::from(vec![0x63])))
        );
    }

    #[test]
    fn test_invalid_text_preserved() {
        let data = [1, 2, 0xFF, 0xFE];
        let set = decode(&ST1108_METRIC_SET, &data);
        assert!(set.at(St1108MetricSetTag::Name).unwrap().as_blob().is_some());
    }

    #[test]
    fn test_value_extent_past_region_is_underrun() {
        // Declares 4 value bytes, only 2 present.
        let data = [9, 4, 0x01, 0xF4];
        let mut cursor = &data[..];
        assert!(matches!(
            read_local_set(&ST1108_LOCAL_SET, &mut cursor, data.len()),
            Err(Error::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_region_longer_than_source() {
        let data = [9, 1, 1];
        let mut cursor = &data[..];
        assert!(matches!(
            read_local_set(&ST1108_LOCAL_SET, &mut cursor, 10),
            Err(Error::BufferUnderrun { needed: 10, available: 3 })
        ));
    }

    #[test]
    fn test_write_overflow_leaves_buffer() {
        let mut set = LocalSet::new();
        set.insert(St1108Tag::CompressionLevel, "4.1");
        let mut dest = [0u8; 4];
        let mut cursor = &mut dest[..];
        assert!(matches!(
            write_local_set(&ST1108_LOCAL_SET, &set, &mut cursor, 4),
            Err(Error::BufferOverflow { needed: 5, available: 4 })
        ));
        assert_eq!(cursor.len(), 4);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut set = LocalSet::new();
        set.insert(St1108Tag::StreamBitrate, "fast");
        let mut out = Vec::new();
        assert!(matches!(
            write_local_set(&ST1108_LOCAL_SET, &set, &mut out, usize::MAX),
            Err(Error::MalformedValue(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_fixed_uint_too_wide() {
        let format = DataFormat::Uint { length: Some(2) };
        let mut out = Vec::new();
        assert!(matches!(
            format.write(&Value::Uint(70_000), &mut out, 8),
            Err(Error::MalformedValue(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_imap_format_in_set() {
        static HEADING: TagDictionary = TagDictionary {
            name: "heading",
            traits: &[TagTraits {
                tag: 1,
                name: "Heading",
                format: DataFormat::Imap(ImapFormat::new(0.0, 360.0, 2)),
            }],
        };
        let format = ImapFormat::new(0.0, 360.0, 2);
        let mut set = LocalSet::new();
        set.insert(1u64, Real::quantized(90.0, format.precision()));

        let bytes = encode(&HEADING, &set);
        assert_eq!(bytes.len(), 4);
        assert_eq!(decode(&HEADING, &bytes), set);

        let mut bad = LocalSet::new();
        bad.insert(1u64, Real::quantized(400.0, format.precision()));
        let mut out = Vec::new();
        assert!(matches!(
            write_local_set(&HEADING, &bad, &mut out, usize::MAX),
            Err(Error::OutOfRange { .. })
        ));
    }
}
