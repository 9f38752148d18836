//! Input/output helpers.
//!
//! - match file ingest + validation (`ingest`)
//! - ratings CSV export (`export`)
//! - ratings JSON read/write (`ratings`)

pub mod export;
pub mod ingest;
pub mod ratings;

pub use export::*;
pub use ingest::*;
pub use ratings::*;
