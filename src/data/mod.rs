//! Event data sources that live inside the crate.

pub mod sample;

pub use sample::*;
