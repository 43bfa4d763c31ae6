//! HTTP request handlers

pub mod health;
pub mod orders;
pub mod shipments;

pub use health::health_check;
pub use orders::{
    create_order, create_shipment, get_order, get_order_tracking, list_orders,
    update_order_status,
};
pub use shipments::{track_docket, track_dockets};
