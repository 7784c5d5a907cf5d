//! Built-in metadata filters.
//!
//! ## Metadata
//! - [`UpdateKlv`](metadata::UpdateKlv): Adds or refreshes the MISB ST 1108
//!   metric report of each frame

pub mod metadata;
