//! Shared types and models for the jewelry admin platform
//!
//! Pure domain code used by the backend: the order aggregate, its status
//! machine and legacy projections, and input validation. No I/O.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
