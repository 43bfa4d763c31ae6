//! Shipment tracking log and order status history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;

/// Kind of entry in the shipment tracking log
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    ShipmentCreated,
    Shipped,
    Delivered,
    Cancelled,
}

impl TrackingStatus {
    /// Tracking entry recorded when an operator moves the order to `status`
    pub fn for_order_status(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Shipped => Some(TrackingStatus::Shipped),
            OrderStatus::Delivered => Some(TrackingStatus::Delivered),
            OrderStatus::Cancelled => Some(TrackingStatus::Cancelled),
            _ => None,
        }
    }
}

/// One shipment event. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingEvent {
    pub status: TrackingStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docket_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
}

impl TrackingEvent {
    pub fn new(status: TrackingStatus, timestamp: DateTime<Utc>) -> Self {
        TrackingEvent {
            status,
            timestamp,
            carrier: None,
            docket_number: None,
            reference_number: None,
            note: None,
            estimated_delivery: None,
        }
    }

    /// Docket number, if the carrier actually assigned one
    pub fn docket(&self) -> Option<&str> {
        self.docket_number.as_deref().filter(|d| !d.is_empty())
    }
}

/// One order status change. Append-only, separate from the tracking log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
}

/// Carrier-side identifiers of the order's shipment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierMetadata {
    pub carrier: String,
    /// Empty when the carrier accepted the shipment without assigning a docket yet
    pub docket_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    pub created_at: DateTime<Utc>,
}
