//! Rating orchestration.
//!
//! Responsibilities:
//!
//! - choose the ridge strength λ for an event (`lambda`)
//! - solve each regression metric and map results back to teams (`calculator`)

pub mod calculator;
pub mod lambda;

pub use calculator::*;
pub use lambda::*;
