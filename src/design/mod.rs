//! Design matrix construction for alliance-based rating systems.

pub mod builder;

pub use builder::*;
