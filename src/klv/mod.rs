//! KLV (Key-Length-Value) metadata model and codec.
//!
//! KLV is the SMPTE ST 336 encoding used to embed metadata in MPEG-TS and
//! other motion-imagery containers. A packet is a 16-byte universal key,
//! a BER length, and a value; most MISB standards use a *local set* value,
//! a sequence of BER-OID tag / BER length / value triplets.
//!
//! # Layout
//!
//! - [`Value`] and [`LocalSet`]: the decoded data model.
//! - [`DataFormat`] and [`TagDictionary`]: per-tag encodings.
//! - [`read_packet`] / [`encode_packet`]: whole packets with checksums.
//! - [`st1108`]: the MISB ST 1108 Interpretability and Quality dictionary.
//!
//! # Example
//!
//! ```rust
//! use parallax_klv::klv::{
//!     AssessmentPoint, LocalSet, Packet, St1108Tag, UniversalKey, decode_packets,
//!     encode_packet,
//! };
//!
//! let mut set = LocalSet::new();
//! set.insert(St1108Tag::AssessmentPoint, AssessmentPoint::Archive);
//! set.insert(St1108Tag::DocumentVersion, 3u64);
//!
//! let packet = Packet::new(UniversalKey::MISB_ST1108, set);
//! let bytes = encode_packet(&packet).unwrap();
//! assert_eq!(decode_packets(&bytes).unwrap(), vec![packet]);
//! ```

pub mod ber;
mod blob;
pub mod checksum;
mod float;
mod format;
mod local_set;
mod packet;
pub mod st1108;
mod value;

pub use blob::{Blob, blob_length, read_blob, write_blob};
pub use float::{FloatFormat, ImapFormat, Precision, Real};
pub use format::{
    DataFormat, TagDictionary, TagTraits, local_set_length, read_local_set, uint_length,
    write_local_set,
};
pub use local_set::LocalSet;
pub use packet::{
    Packet, Standard, UniversalKey, decode_packets, encode_packet, packet_length, read_packet,
    standard_for_key, write_packet,
};
pub use st1108::{
    AssessmentPoint, CompressionProfile, CompressionType, MetricImplementer, MetricPeriodPack,
    St1108MetricSetTag, St1108Tag,
};
pub use value::{EnumDomain, Enumerated, Tag, Value};
