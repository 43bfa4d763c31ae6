//! External API integrations

pub mod carrier;

pub use carrier::{CarrierEndpoint, CarrierTransport, HttpCarrierClient};
