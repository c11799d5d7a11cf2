//! Core table types: the frozen char-table, its builder and errors.

pub mod builder;
pub mod chartab;
pub mod error;

pub use builder::*;
pub use chartab::*;
pub use error::*;
