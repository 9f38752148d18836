//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - match records (`Match`, `TeamId`, `Alliance`)
//! - the rating metrics (`Metric`) and their outputs (`PerformanceResult`, `MetricFit`)
//! - run configuration (`RunConfig`, `LambdaStrategy`)

pub mod types;

pub use types::*;
