//! Shipment creation and tracking against the logistics carrier

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::Value;
use shared::{
    find_invalid_dockets, national_phone_number, truncate_chars, validate_contact_phone,
    validate_docket_number, validate_postal_code, Customer, Order, ShipmentConfirmation,
    ShippingAddress, StatusChange,
};
use uuid::Uuid;

use crate::config::CarrierConfig;
use crate::error::{AppError, AppResult};
use crate::external::carrier::{
    ensure_not_rejected, interpret_creation, ConsigneeAddress, CreateShipmentPayload,
    TrackManyPayload, TrackPayload, ADDRESS_LINE_MAX_CHARS, PACKAGE_COUNT, SERVICE_TYPE,
    SHIPMENT_TYPE,
};
use crate::external::{CarrierEndpoint, CarrierTransport};
use crate::services::order::{log_transition, OrderService};

/// Shipment service bridging orders and the carrier API
#[derive(Clone)]
pub struct ShipmentService {
    orders: OrderService,
    carrier: Arc<dyn CarrierTransport>,
    config: CarrierConfig,
}

/// Result of a successful shipment creation
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentOutcome {
    /// Empty when the carrier accepted the shipment without a docket
    pub docket_number: String,
    pub reference_number: Option<String>,
    pub estimated_delivery: Option<String>,
    pub carrier_message: Option<String>,
    pub order: Order,
    pub carrier_response: Value,
}

impl ShipmentService {
    /// Create a new ShipmentService instance
    pub fn new(
        orders: OrderService,
        carrier: Arc<dyn CarrierTransport>,
        config: CarrierConfig,
    ) -> Self {
        Self {
            orders,
            carrier,
            config,
        }
    }

    /// Book a shipment for an order with the carrier.
    ///
    /// All preconditions are checked before the carrier is called. A carrier
    /// rejection leaves the order untouched.
    pub async fn create_shipment(&self, order_id: Uuid, actor: &str) -> AppResult<ShipmentOutcome> {
        let order = self.orders.get_order(order_id).await?;

        if let Some(docket) = order.existing_docket() {
            let docket = if docket.is_empty() {
                "pending assignment"
            } else {
                docket
            };
            return Err(AppError::Conflict {
                resource: "shipment".to_string(),
                message: format!(
                    "Shipment already exists for order {} (docket {})",
                    order.order_number, docket
                ),
            });
        }

        let address = order
            .shipping_address
            .as_ref()
            .ok_or_else(|| AppError::validation("shipping_address", "Shipping address is required"))?;
        validate_postal_code(&address.postal_code)
            .map_err(|m| AppError::validation("shipping_address.postal_code", m))?;

        let customer = order
            .customer
            .as_ref()
            .and_then(|c| c.populated())
            .ok_or_else(|| {
                AppError::validation("customer", "Customer details are not available for this order")
            })?;
        if customer.email.trim().is_empty() {
            return Err(AppError::validation("customer.email", "Customer email is required"));
        }
        validate_contact_phone(customer.phone.as_deref().unwrap_or_default())
            .map_err(|m| AppError::validation("customer.phone", m))?;

        let mut shipped = order.clone();
        if shipped.payment.reject_cash_on_delivery() {
            tracing::info!(
                "Order {}: cash on delivery is not available for this shipment, switched to {:?}",
                shipped.order_number,
                shipped.payment.method
            );
        }

        let payload = self.build_payload(&shipped, customer, address);
        let body = encode(&payload)?;

        tracing::info!(
            "Creating shipment for order {} ({} g, value {})",
            shipped.order_number,
            payload.gross_weight,
            payload.net_value
        );
        let raw = self
            .carrier
            .post(CarrierEndpoint::CreateShipment, &body)
            .await?;
        let accepted = interpret_creation(raw)?;

        if accepted.data.docket_number.is_none() {
            tracing::warn!(
                target: "shipment_anomaly",
                kind = "missing_docket",
                order_number = %shipped.order_number,
                carrier_message = ?accepted.message,
                response = %accepted.raw,
                "Carrier accepted shipment without a docket number"
            );
        }

        let previous_status = shipped.status;
        shipped.apply_shipment(
            &ShipmentConfirmation {
                carrier: self.config.name.clone(),
                docket_number: accepted.data.docket_number.clone(),
                reference_number: accepted.data.reference_number.clone(),
                estimated_delivery: accepted.data.estimated_delivery.clone(),
            },
            Some(actor.to_string()),
            Utc::now(),
        );

        let saved = self.orders.persist(shipped).await.map_err(|e| {
            // The carrier already holds a shipment for this order
            tracing::error!(
                target: "shipment_anomaly",
                kind = "unrecorded_shipment",
                order_id = %order_id,
                docket = ?accepted.data.docket_number,
                error = %e,
                "Shipment booked with carrier but order could not be saved"
            );
            e
        })?;

        if saved.status != previous_status {
            log_transition(
                &saved,
                StatusChange {
                    from: previous_status,
                    to: saved.status,
                },
                actor,
            );
        }

        Ok(ShipmentOutcome {
            docket_number: accepted.data.docket_number.unwrap_or_default(),
            reference_number: accepted.data.reference_number,
            estimated_delivery: accepted.data.estimated_delivery,
            carrier_message: accepted.message,
            order: saved,
            carrier_response: accepted.raw,
        })
    }

    /// Track a single docket; the carrier's payload is returned unmodified
    pub async fn track_docket(&self, docket: &str) -> AppResult<Value> {
        validate_docket_number(docket).map_err(|m| AppError::validation("docket_number", m))?;

        let body = encode(&TrackPayload {
            token: &self.config.api_token,
            docket,
        })?;
        let raw = self.carrier.post(CarrierEndpoint::Track, &body).await?;
        ensure_not_rejected(raw)
    }

    /// Track several dockets in one carrier call.
    ///
    /// Any invalid docket rejects the whole batch, naming every offender.
    pub async fn track_dockets(&self, dockets: &[String]) -> AppResult<Value> {
        if dockets.is_empty() {
            return Err(AppError::validation(
                "docket_numbers",
                "At least one docket number is required",
            ));
        }

        let invalid = find_invalid_dockets(dockets);
        if !invalid.is_empty() {
            return Err(AppError::validation(
                "docket_numbers",
                format!(
                    "Invalid docket numbers (must be exactly 10 digits): {}",
                    invalid.join(", ")
                ),
            ));
        }

        let body = encode(&TrackManyPayload {
            token: &self.config.api_token,
            dockets,
        })?;
        let raw = self.carrier.post(CarrierEndpoint::TrackMultiple, &body).await?;
        ensure_not_rejected(raw)
    }

    /// Build the carrier's shipment creation request for an order
    pub fn build_payload(
        &self,
        order: &Order,
        customer: &Customer,
        address: &ShippingAddress,
    ) -> CreateShipmentPayload {
        let weight = format!(
            "{:.2}",
            order.shipment_weight(self.config.default_item_weight)
        );
        let declared_value = order
            .pricing
            .total
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .max(Decimal::ZERO);

        let consignee_name = if address.full_name.trim().is_empty() {
            customer.name.trim().to_string()
        } else {
            address.full_name.trim().to_string()
        };
        let receiver_name = if customer.name.trim().is_empty() {
            consignee_name.clone()
        } else {
            customer.name.trim().to_string()
        };

        let second_line: Vec<&str> = [
            address.line2.as_deref().unwrap_or_default(),
            address.city.as_str(),
            address.state.as_str(),
        ]
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

        CreateShipmentPayload {
            token: self.config.api_token.clone(),
            shipment_type: SHIPMENT_TYPE.to_string(),
            service_type: SERVICE_TYPE.to_string(),
            from_store_code: self.config.origin_store_code.clone(),
            to_address: ConsigneeAddress {
                consignee_name,
                address_line1: truncate_chars(&address.line1, ADDRESS_LINE_MAX_CHARS),
                address_line2: truncate_chars(&second_line.join(", "), ADDRESS_LINE_MAX_CHARS),
                pin_code: address.postal_code.clone(),
                auth_receiver_name: receiver_name,
                auth_receiver_phone: national_phone_number(
                    customer.phone.as_deref().unwrap_or_default(),
                ),
            },
            net_weight: weight.clone(),
            gross_weight: weight,
            net_value: declared_value.to_string(),
            no_of_packages: PACKAGE_COUNT.to_string(),
            remark: format!("Jewelry order {}", order.order_number),
            invoice: vec![order.order_number.clone()],
        }
    }
}

fn encode<T: Serialize>(payload: &T) -> AppResult<Value> {
    serde_json::to_value(payload)
        .map_err(|e| AppError::Internal(format!("Failed to encode carrier request: {}", e)))
}
