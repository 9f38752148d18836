//! Metric scoring functions.
//!
//! Kept as small, pure functions so that the solver code can stay generic over
//! which quantity is being regressed.

pub mod score;

pub use score::*;
