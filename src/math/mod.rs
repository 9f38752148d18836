//! Linear algebra kernel: dense helpers, Gauss-Jordan elimination, normal
//! equations (plain and ridge) and condition numbers.

pub mod condition;
pub mod dense;
pub mod gauss;
pub mod ols;

pub use condition::*;
pub use dense::*;
pub use gauss::*;
pub use ols::*;
