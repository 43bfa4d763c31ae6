//! Business logic services

pub mod order;
pub mod shipment;

pub use order::OrderService;
pub use shipment::ShipmentService;
