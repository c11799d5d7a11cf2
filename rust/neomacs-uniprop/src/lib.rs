//! Neomacs Unicode Property Tables
//!
//! Compact, immutable char-tables mapping codepoints of the Emacs
//! character space to property values, and the named property layer
//! that decodes them.
//!
//! # Architecture
//!
//! ```text
//! name ──► PropertyRegistry ──► PropertyBinding ──► CharPropertyTable
//!                                     │                 (root → mid → leaf)
//!                                     ▼
//!                              decode(Slot) ──► PropertyValue
//! ```

pub mod core;
pub mod uniprop;

pub use crate::core::{
    BuildConfig, CharPropertyTable, Layout, RangeEntry, Sharing, Slot, TableBuilder, TableStats,
    UnipropError, MAX_CODEPOINT,
};
pub use crate::uniprop::{
    for_each_value_in_range, get_property, standard_registry, value_of, PropertyBinding,
    PropertyRegistry, PropertyValue,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
