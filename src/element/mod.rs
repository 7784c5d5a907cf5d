//! Element system for Parallax KLV filters.
//!
//! A [`MetadataFilter`] transforms a batch of per-frame metadata records.
//! Filters are synchronous; the caller decides how batches are scheduled.
//!
//! # Example
//!
//! ```rust,ignore
//! use parallax_klv::element::MetadataFilter;
//! use parallax_klv::metadata::MetadataVec;
//!
//! struct DropAll;
//!
//! impl MetadataFilter for DropAll {
//!     fn filter(&mut self, frames: MetadataVec) -> MetadataVec {
//!         frames.into_iter().map(|_| None).collect()
//!     }
//! }
//! ```

mod filter;

pub use filter::MetadataFilter;
