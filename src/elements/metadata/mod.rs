//! Metadata filter elements.
//!
//! - [`UpdateKlv`]: folds a MISB ST 1108 metric report into each frame
//! - [`St1108Synthesizer`]: builds the report from one frame's fields

mod metric_report;
mod update_klv;

pub use metric_report::{
    DEFAULT_BITS_PER_PIXEL, METRIC_NAME_GSD, METRIC_NAME_VNIIRS, St1108Synthesizer,
    UpdateKlvConfig, frame_duration_us, now_micros,
};
pub use update_klv::{UPDATE_KLV, UpdateKlv};
