//! # Parallax KLV
//!
//! KLV (Key-Length-Value) metadata support for Parallax video pipelines.
//!
//! Motion-imagery streams carry per-frame metadata as SMPTE ST 336 KLV
//! packets following the MISB standards. This crate provides:
//!
//! - **Value model**: recursive [`klv::Value`] and the ordered multi-map
//!   [`klv::LocalSet`]
//! - **Byte codec**: bounded blob transfer, BER lengths and tags, IEEE and
//!   quantized reals, local sets, and whole packets with checksums, over any
//!   [`bytes::Buf`] / [`bytes::BufMut`]
//! - **MISB ST 1108**: the Interpretability and Quality dictionary and a
//!   report synthesizer
//! - **Metadata filters**: [`UpdateKlv`](elements::metadata::UpdateKlv)
//!   folds a fresh ST 1108 report into each frame's packet list
//!
//! ## Quick Start
//!
//! ```rust
//! use parallax_klv::prelude::*;
//!
//! let frame = FrameMetadata::klv()
//!     .with_stream_index(1)
//!     .with_average_gsd(12.0)
//!     .with_frame_rate(30.0);
//!
//! let mut filter = UpdateKlv::new();
//! let output = filter.filter(vec![Some(frame)]);
//!
//! let packets = output[0].as_ref().and_then(|f| f.packets()).unwrap();
//! let bytes = encode_packet(&packets[0]).unwrap();
//! assert_eq!(decode_packets(&bytes).unwrap(), packets);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod element;
pub mod elements;
pub mod error;
pub mod klv;
pub mod metadata;
pub mod observability;
pub mod plugin;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::element::MetadataFilter;
    pub use crate::elements::metadata::{St1108Synthesizer, UpdateKlv, UpdateKlvConfig};
    pub use crate::error::{Error, Result};
    pub use crate::klv::{
        LocalSet, Packet, St1108Tag, UniversalKey, Value, decode_packets, encode_packet,
    };
    pub use crate::metadata::{FrameMetadata, MetadataVec};
    pub use crate::plugin::FilterRegistry;
}

pub use error::{Error, Result};
