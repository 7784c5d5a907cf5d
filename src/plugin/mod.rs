//! Filter registration.
//!
//! Filters are constructed by name through a [`FilterRegistry`]. The
//! registry is an in-process constructor table: built-in filters are added
//! by [`FilterRegistry::with_builtins`], and applications may register
//! their own.
//!
//! # Example
//!
//! ```rust
//! use parallax_klv::plugin::FilterRegistry;
//!
//! let registry = FilterRegistry::with_builtins();
//! let filter = registry.create("update_klv").unwrap();
//! assert_eq!(filter.name(), "update_klv");
//! ```

mod registry;

pub use registry::{FilterFactory, FilterRegistry};
