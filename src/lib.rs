//! `alliance-ratings` library crate.
//!
//! Least-squares team ratings (OPR, DPR, CCWM and their non-penalty
//! variants) computed from alliance match results.
//!
//! The binary (`opr`) is a thin wrapper around this library so the rating
//! engine is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod design;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod rating;
pub mod report;
