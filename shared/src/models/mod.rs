//! Domain models for the jewelry admin platform

mod customer;
mod order;
mod payment;
mod pricing;
mod status;
mod tracking;

pub use customer::*;
pub use order::*;
pub use payment::*;
pub use pricing::*;
pub use status::*;
pub use tracking::*;
