//! Metadata filter trait.

use crate::metadata::MetadataVec;

/// A transform over a sequence of per-frame metadata records.
///
/// Filters are synchronous and run in frame arrival order. The output has
/// the same length and order as the input; a filter may rewrite records but
/// never drops or reorders them.
///
/// # Example
///
/// ```rust
/// use parallax_klv::element::MetadataFilter;
/// use parallax_klv::metadata::MetadataVec;
///
/// struct Identity;
///
/// impl MetadataFilter for Identity {
///     fn filter(&mut self, frames: MetadataVec) -> MetadataVec {
///         frames
///     }
/// }
///
/// let mut filter = Identity;
/// assert!(filter.filter(Vec::new()).is_empty());
/// ```
pub trait MetadataFilter: Send {
    /// Transform one batch of frames.
    fn filter(&mut self, frames: MetadataVec) -> MetadataVec;

    /// Get the name of this filter (for debugging/logging).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F: MetadataFilter + ?Sized> MetadataFilter for Box<F> {
    fn filter(&mut self, frames: MetadataVec) -> MetadataVec {
        (**self).filter(frames)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
