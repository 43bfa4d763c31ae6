//! Logistics carrier client
//!
//! Wire types and HTTP transport for the valuables courier used to ship
//! jewelry orders. The carrier wraps every answer in an envelope with a
//! string status flag (`"true"`/`"false"`), a message and a `data` block.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::CarrierConfig;
use crate::error::{AppError, AppResult};

/// Shipment category for diamond & jewellery consignments
pub const SHIPMENT_TYPE: &str = "D&J";

/// Service level for insured valuables
pub const SERVICE_TYPE: &str = "valuable";

/// Every order ships as a single package
pub const PACKAGE_COUNT: &str = "1";

/// Carrier limit on each address line
pub const ADDRESS_LINE_MAX_CHARS: usize = 50;

// Accepted spellings per logical field, in order of preference
const DOCKET_KEYS: &[&str] = &["docket_number", "docketNumber"];
const REFERENCE_KEYS: &[&str] = &["reference_number", "referenceNumber"];
const ESTIMATED_DELIVERY_KEYS: &[&str] = &["estimated_delivery", "estimated_delievery"];

/// Carrier API operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierEndpoint {
    CreateShipment,
    Track,
    TrackMultiple,
}

impl CarrierEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            CarrierEndpoint::CreateShipment => "/shipment/create",
            CarrierEndpoint::Track => "/track",
            CarrierEndpoint::TrackMultiple => "/track/multiple",
        }
    }
}

/// Raw JSON exchange with the carrier.
///
/// Each call is attempted exactly once. Transport problems surface as
/// [`AppError::CarrierUnavailable`]; interpreting the envelope is left to the
/// caller.
#[async_trait]
pub trait CarrierTransport: Send + Sync {
    async fn post(&self, endpoint: CarrierEndpoint, body: &Value) -> AppResult<Value>;
}

/// reqwest-backed carrier transport
#[derive(Clone)]
pub struct HttpCarrierClient {
    client: Client,
    base_url: String,
}

impl HttpCarrierClient {
    /// Create a client with the configured per-request timeout
    pub fn new(config: &CarrierConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CarrierTransport for HttpCarrierClient {
    async fn post(&self, endpoint: CarrierEndpoint, body: &Value) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint.path());

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::CarrierUnavailable(format!("request timed out: {}", e))
                } else {
                    AppError::CarrierUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::CarrierUnavailable(format!("failed to read response: {}", e)))?;

        match serde_json::from_str::<Value>(&text) {
            // Carrier envelopes are interpreted even on error statuses so that
            // business failures keep the carrier's message
            Ok(json) if status.is_success() || has_status_flag(&json) => Ok(json),
            _ if !status.is_success() => Err(AppError::CarrierUnavailable(format!(
                "HTTP {} - {}",
                status, text
            ))),
            Ok(json) => Ok(json),
            Err(e) => Err(AppError::CarrierResponse(format!(
                "response body is not JSON: {}",
                e
            ))),
        }
    }
}

fn has_status_flag(json: &Value) -> bool {
    json.get("status").and_then(parse_status_flag).is_some()
}

// ============================================================================
// Requests
// ============================================================================

/// Shipment creation request body
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateShipmentPayload {
    pub token: String,
    #[serde(rename = "shipmentType")]
    pub shipment_type: String,
    #[serde(rename = "serviceType")]
    pub service_type: String,
    #[serde(rename = "fromStoreCode")]
    pub from_store_code: String,
    #[serde(rename = "toAddress")]
    pub to_address: ConsigneeAddress,
    pub net_weight: String,
    pub gross_weight: String,
    pub net_value: String,
    pub no_of_packages: String,
    pub remark: String,
    pub invoice: Vec<String>,
}

/// Destination block of a shipment creation request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConsigneeAddress {
    pub consignee_name: String,
    pub address_line1: String,
    pub address_line2: String,
    #[serde(rename = "pinCode")]
    pub pin_code: String,
    pub auth_receiver_name: String,
    pub auth_receiver_phone: String,
}

/// Single docket tracking request body
#[derive(Debug, Serialize)]
pub struct TrackPayload<'a> {
    pub token: &'a str,
    pub docket: &'a str,
}

/// Batch tracking request body
#[derive(Debug, Serialize)]
pub struct TrackManyPayload<'a> {
    pub token: &'a str,
    pub dockets: &'a [String],
}

// ============================================================================
// Responses
// ============================================================================

/// Response envelope common to every carrier endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CarrierEnvelope {
    #[serde(default, deserialize_with = "deserialize_status_flag")]
    pub status: Option<bool>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl CarrierEnvelope {
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// `data` block of a successful shipment creation, with alias spellings
/// already resolved
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ShipmentData {
    pub docket_number: Option<String>,
    pub reference_number: Option<String>,
    pub estimated_delivery: Option<String>,
}

impl From<Map<String, Value>> for ShipmentData {
    fn from(map: Map<String, Value>) -> Self {
        ShipmentData {
            docket_number: lookup(&map, DOCKET_KEYS),
            reference_number: lookup(&map, REFERENCE_KEYS),
            estimated_delivery: lookup(&map, ESTIMATED_DELIVERY_KEYS),
        }
    }
}

fn lookup(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key).and_then(scalar_to_string))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_status_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn deserialize_status_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_status_flag(&value))
}

/// Outcome of an accepted shipment creation
#[derive(Debug, Clone)]
pub struct AcceptedShipment {
    pub data: ShipmentData,
    pub message: Option<String>,
    pub raw: Value,
}

/// Interpret a shipment creation response.
///
/// An explicit `"false"` flag becomes [`AppError::CarrierRejected`] carrying
/// the carrier's message. A success without a docket is still a success; the
/// caller decides how to record it.
pub fn interpret_creation(raw: Value) -> AppResult<AcceptedShipment> {
    let envelope: CarrierEnvelope = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::CarrierResponse(format!("malformed envelope: {}", e)))?;

    match envelope.status {
        Some(true) => {}
        Some(false) => {
            return Err(AppError::CarrierRejected(
                envelope
                    .message_text()
                    .unwrap_or_else(|| "Carrier rejected the shipment".to_string()),
            ))
        }
        None => {
            return Err(AppError::CarrierResponse(
                "missing or unrecognised status flag".to_string(),
            ))
        }
    }

    let data = match envelope.data.clone() {
        Some(Value::Object(map)) => ShipmentData::from(map),
        _ => ShipmentData::default(),
    };

    Ok(AcceptedShipment {
        data,
        message: envelope.message_text(),
        raw,
    })
}

/// Reject a tracking response the carrier flagged as failed.
///
/// Anything else is handed back to the caller unmodified. Only an object can
/// carry the failure flag; arrays and scalars pass through as they are.
pub fn ensure_not_rejected(raw: Value) -> AppResult<Value> {
    let Some(object) = raw.as_object() else {
        return Ok(raw);
    };

    if object.get("status").and_then(parse_status_flag) == Some(false) {
        let envelope = CarrierEnvelope {
            status: Some(false),
            message: object.get("message").cloned(),
            data: None,
        };
        return Err(AppError::CarrierRejected(
            envelope
                .message_text()
                .unwrap_or_else(|| "Carrier could not track the docket".to_string()),
        ));
    }

    Ok(raw)
}
