//! KLV packets: a 16-byte universal key followed by a BER length and value.
//!
//! ```text
//! [16-byte universal key] [BER length] [local set entries...] [checksum]
//! ```
//!
//! Packets whose key names a standard with a known dictionary decode into a
//! [`LocalSet`]; any other packet keeps its value as a [`Blob`].

use bytes::{Buf, BufMut};
use std::fmt;

use super::ber::{
    BerBytes, ber_length_size, encode_ber_oid, read_ber_length_bytes, write_ber_length,
};
use super::blob::{Blob, read_blob, write_bytes};
use super::checksum::{crc16_ccitt, crc16_ccitt_update};
use super::format::{TagDictionary, local_set_length, read_local_set, write_local_set};
use super::local_set::LocalSet;
use super::st1108::{ST1108_LOCAL_SET, St1108Tag};
use super::value::{Tag, Value};
use crate::error::{Error, Result};

// ============================================================================
// Universal Keys
// ============================================================================

/// A 16-byte SMPTE universal key naming the standard a packet follows.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniversalKey(pub [u8; 16]);

impl UniversalKey {
    /// Length of every universal key.
    pub const LENGTH: usize = 16;

    /// MISB ST 0601 UAS Datalink Local Set.
    pub const MISB_ST0601: Self = Self([
        0x06, 0x0E, 0x2B, 0x34, // SMPTE designator
        0x02, 0x0B, 0x01, 0x01, // Registry category + designation
        0x0E, 0x01, 0x03, 0x01, // Organization (MISB)
        0x01, 0x00, 0x00, 0x00, // ST 0601 Local Set
    ]);

    /// MISB ST 0102 Security Metadata Local Set.
    pub const MISB_ST0102: Self = Self([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x01, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x03, 0x02, 0x00, 0x00,
        0x00,
    ]);

    /// MISB ST 0903 Video Moving Target Indicator Local Set.
    pub const MISB_ST0903: Self = Self([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x0B, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x03, 0x06, 0x00, 0x00,
        0x00,
    ]);

    /// MISB ST 1108 Interpretability and Quality Local Set.
    pub const MISB_ST1108: Self = Self([
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x03, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x03, 0x1C, 0x00, 0x00,
        0x00,
    ]);

    /// Get the 16 key bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for UniversalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match standard_for_key(self) {
            Some(standard) => write!(f, "UniversalKey({})", standard.name),
            None => write!(f, "UniversalKey({self})"),
        }
    }
}

impl fmt::Display for UniversalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chunk) in self.0.chunks(4).enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            for byte in chunk {
                write!(f, "{byte:02X}")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Standards
// ============================================================================

/// A standard recognized by its universal key.
#[derive(Debug)]
pub struct Standard {
    /// Short name, e.g. "MISB ST 1108".
    pub name: &'static str,
    /// Key identifying the standard's packets.
    pub key: UniversalKey,
    /// Dictionary of the root local set, if this crate decodes the standard.
    pub dictionary: Option<&'static TagDictionary>,
    /// Tag of the CRC-16-CCITT trailer, if the standard uses one.
    pub checksum_tag: Option<Tag>,
}

static STANDARDS: &[Standard] = &[
    Standard {
        name: "MISB ST 1108",
        key: UniversalKey::MISB_ST1108,
        dictionary: Some(&ST1108_LOCAL_SET),
        checksum_tag: Some(St1108Tag::Checksum as Tag),
    },
    Standard {
        name: "MISB ST 0601",
        key: UniversalKey::MISB_ST0601,
        dictionary: None,
        checksum_tag: None,
    },
    Standard {
        name: "MISB ST 0102",
        key: UniversalKey::MISB_ST0102,
        dictionary: None,
        checksum_tag: None,
    },
    Standard {
        name: "MISB ST 0903",
        key: UniversalKey::MISB_ST0903,
        dictionary: None,
        checksum_tag: None,
    },
];

/// Look up the standard a key names.
pub fn standard_for_key(key: &UniversalKey) -> Option<&'static Standard> {
    STANDARDS.iter().find(|s| s.key == *key)
}

// ============================================================================
// Packets
// ============================================================================

/// One embedded metadata record: a key naming a standard plus its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    /// Standard the value follows.
    pub key: UniversalKey,
    /// Root value: a local set for decoded standards, otherwise a blob.
    pub value: Value,
}

impl Packet {
    /// Create a packet.
    pub fn new(key: UniversalKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// The root local set, if the value was decoded as one.
    pub fn local_set(&self) -> Option<&LocalSet> {
        self.value.as_local_set()
    }

    /// The root local set mutably.
    pub fn local_set_mut(&mut self) -> Option<&mut LocalSet> {
        self.value.as_local_set_mut()
    }
}

/// Decoded root local set plus the dictionary and checksum handling to
/// encode it.
struct Body<'a> {
    set: &'a LocalSet,
    dictionary: &'static TagDictionary,
    checksum_tag: Option<Tag>,
}

fn body_of(packet: &Packet) -> Result<Option<Body<'_>>> {
    match &packet.value {
        Value::Blob(_) => Ok(None),
        Value::LocalSet(set) => {
            let standard = standard_for_key(&packet.key).and_then(|s| s.dictionary.map(|d| (s, d)));
            let Some((standard, dictionary)) = standard else {
                return Err(Error::malformed(format!(
                    "no dictionary to encode a local set under key {}",
                    packet.key
                )));
            };
            if standard.checksum_tag.is_some_and(|tag| set.has(tag)) {
                return Err(Error::malformed(
                    "checksum entries are generated on encode and must not be set",
                ));
            }
            Ok(Some(Body {
                set,
                dictionary,
                checksum_tag: standard.checksum_tag,
            }))
        }
        other => Err(Error::malformed(format!(
            "packet value must be a local set or blob, not {}",
            other.kind()
        ))),
    }
}

fn checksum_trailer_length(tag: Tag) -> usize {
    encode_ber_oid(tag).len() + 1 + 2
}

fn value_length(packet: &Packet) -> Result<usize> {
    match body_of(packet)? {
        None => Ok(packet.value.as_blob().map_or(0, |b| b.len())),
        Some(body) => {
            let trailer = body.checksum_tag.map_or(0, checksum_trailer_length);
            Ok(local_set_length(body.dictionary, body.set)? + trailer)
        }
    }
}

/// Number of bytes `packet` occupies when encoded.
pub fn packet_length(packet: &Packet) -> Result<usize> {
    let length = value_length(packet)?;
    Ok(UniversalKey::LENGTH + ber_length_size(length) + length)
}

/// Encode `packet`, appending a checksum trailer where its standard has one.
pub fn encode_packet(packet: &Packet) -> Result<Vec<u8>> {
    let length = value_length(packet)?;
    let mut out = Vec::with_capacity(UniversalKey::LENGTH + ber_length_size(length) + length);
    out.put_slice(packet.key.as_bytes());
    write_ber_length(length, &mut out, usize::MAX)?;

    match body_of(packet)? {
        None => {
            if let Value::Blob(blob) = &packet.value {
                out.put_slice(blob);
            }
        }
        Some(body) => {
            write_local_set(body.dictionary, body.set, &mut out, usize::MAX)?;
            if let Some(tag) = body.checksum_tag {
                out.put_slice(&encode_ber_oid(tag));
                out.put_u8(2);
                let crc = crc16_ccitt(&out);
                out.put_u16(crc);
            }
        }
    }
    Ok(out)
}

/// Write `packet` into at most `max_length` bytes of `buf`.
///
/// Fails with [`Error::BufferOverflow`] without touching `buf` if the
/// encoded packet does not fit.
pub fn write_packet<B: BufMut>(packet: &Packet, buf: &mut B, max_length: usize) -> Result<()> {
    let encoded = encode_packet(packet)?;
    write_bytes(&encoded, buf, max_length)
}

/// Read one packet from `buf`.
///
/// A checksum mismatch is logged and the data kept; the checksum entry is
/// not part of the returned local set.
pub fn read_packet<B: Buf>(buf: &mut B) -> Result<Packet> {
    if buf.remaining() < UniversalKey::LENGTH {
        return Err(Error::underrun(UniversalKey::LENGTH, buf.remaining()));
    }
    let mut key = [0u8; 16];
    buf.copy_to_slice(&mut key);
    let key = UniversalKey(key);

    let (length, length_bytes) = read_ber_length_bytes(buf)?;
    let body = read_blob(buf, length)?;

    let Some(standard) = standard_for_key(&key) else {
        tracing::trace!(key = %key, length = length, "unrecognized packet kept as blob");
        return Ok(Packet::new(key, body));
    };
    let Some(dictionary) = standard.dictionary else {
        return Ok(Packet::new(key, body));
    };

    let mut cursor = body.as_bytes();
    let mut set = read_local_set(dictionary, &mut cursor, length)?;
    if let Some(tag) = standard.checksum_tag {
        verify_checksum(standard, &key, &length_bytes, &body, tag);
        set.erase(tag);
    }
    Ok(Packet::new(key, set))
}

fn verify_checksum(
    standard: &Standard,
    key: &UniversalKey,
    length_bytes: &BerBytes,
    body: &Blob,
    tag: Tag,
) {
    let mut expected_prefix = encode_ber_oid(tag);
    expected_prefix.push(2);
    let trailer = expected_prefix.len() + 2;

    if body.len() < trailer || body[body.len() - trailer..body.len() - 2] != expected_prefix[..] {
        tracing::warn!(standard = standard.name, "packet has no trailing checksum");
        return;
    }

    let stored = u16::from_be_bytes([body[body.len() - 2], body[body.len() - 1]]);
    let mut crc = crc16_ccitt(key.as_bytes());
    crc = crc16_ccitt_update(crc, length_bytes);
    crc = crc16_ccitt_update(crc, &body[..body.len() - 2]);
    if crc != stored {
        tracing::warn!(
            standard = standard.name,
            stored = stored,
            computed = crc,
            "packet checksum mismatch"
        );
    }
}

/// Decode every packet in `data`.
pub fn decode_packets(data: &[u8]) -> Result<Vec<Packet>> {
    let mut cursor = data;
    let mut packets = Vec::new();
    while cursor.has_remaining() {
        packets.push(read_packet(&mut cursor)?);
    }
    Ok(packets)
}
