//! Named character properties and the registry that serves them.

pub mod binding;
pub mod digit;
pub mod loader;
pub mod registry;

pub use binding::*;
pub use loader::{load_binding, parse_ranges, write_ranges};
pub use registry::*;
