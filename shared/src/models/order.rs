//! Order aggregate

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer::CustomerRef;
use super::payment::{Payment, PaymentStatus};
use super::pricing::{LegacyPricing, LineTotals, Pricing};
use super::status::{LegacyOrderStatus, OrderStatus};
use super::tracking::{CarrierMetadata, StatusHistoryEntry, TrackingEvent, TrackingStatus};

const ORDER_NUMBER_SUFFIX_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A customer order for one or more jewelry pieces
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    /// Human-facing identifier, assigned once at creation
    pub order_number: String,
    pub customer: Option<CustomerRef>,
    pub status: OrderStatus,
    /// Derived from `status` on every save
    pub legacy_status: Option<LegacyOrderStatus>,
    pub items: Vec<LineItem>,
    pub pricing: Pricing,
    /// Derived from `pricing` on every save
    #[serde(flatten)]
    pub legacy_pricing: LegacyPricing,
    pub payment: Payment,
    pub shipping_address: Option<ShippingAddress>,
    pub tracking: Vec<TrackingEvent>,
    pub carrier_metadata: Option<CarrierMetadata>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub notes: Option<String>,
    /// Optimistic concurrency token, bumped by the store on each save
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ordered piece
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub jewelry: JewelrySpec,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// Declared gross weight of one unit, in grams
    #[serde(default)]
    pub gross_weight: Option<Decimal>,
    pub totals: LineTotals,
}

/// Jewelry-specific description of a line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JewelrySpec {
    #[serde(default)]
    pub metal: Option<String>,
    #[serde(default)]
    pub purity: Option<String>,
    #[serde(default)]
    pub stone: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub customization: Option<String>,
}

/// Delivery address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingAddress {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

/// Result of a status change, for audit logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// What the carrier reported for a newly created shipment
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentConfirmation {
    pub carrier: String,
    pub docket_number: Option<String>,
    pub reference_number: Option<String>,
    pub estimated_delivery: Option<String>,
}

impl Order {
    /// Start a new order in `pending` with a single history entry
    pub fn new(
        order_number: String,
        customer: Option<CustomerRef>,
        items: Vec<LineItem>,
        pricing: Pricing,
        payment: Payment,
        shipping_address: Option<ShippingAddress>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut order = Order {
            id: Uuid::new_v4(),
            order_number,
            customer,
            status: OrderStatus::Pending,
            legacy_status: None,
            items,
            legacy_pricing: LegacyPricing::from(&pricing),
            pricing,
            payment,
            shipping_address,
            tracking: Vec::new(),
            carrier_metadata: None,
            status_history: vec![StatusHistoryEntry {
                status: OrderStatus::Pending,
                timestamp: now,
                note: "Order created".to_string(),
                changed_by: None,
            }],
            notes,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        order.sync_legacy_fields();
        order
    }

    /// Move the order to `status`, recording it in the status history.
    ///
    /// `shipped`, `delivered` and `cancelled` also append a tracking event.
    pub fn set_status(
        &mut self,
        status: OrderStatus,
        note: Option<String>,
        changed_by: Option<String>,
        now: DateTime<Utc>,
    ) -> StatusChange {
        let from = self.status;
        let note = note
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Status updated to {}", status));

        self.status = status;
        self.status_history.push(StatusHistoryEntry {
            status,
            timestamp: now,
            note: note.clone(),
            changed_by,
        });

        if let Some(tracking_status) = TrackingStatus::for_order_status(status) {
            let mut event = TrackingEvent::new(tracking_status, now);
            event.note = Some(note);
            self.tracking.push(event);
        }

        self.updated_at = now;
        StatusChange { from, to: status }
    }

    /// Recompute every legacy projection from the canonical fields.
    ///
    /// Cash on delivery is not accepted for this catalog, so it is replaced by
    /// the default prepaid method here as well.
    pub fn sync_legacy_fields(&mut self) {
        self.legacy_status = Some(self.status.legacy());
        self.legacy_pricing = LegacyPricing::from(&self.pricing);
        self.payment.reject_cash_on_delivery();
        self.payment.sync_legacy();
    }

    /// Docket of an already created shipment.
    ///
    /// `Some("")` means a shipment exists but the carrier has not assigned a
    /// docket yet.
    pub fn existing_docket(&self) -> Option<&str> {
        if let Some(docket) = self.tracking.iter().find_map(|event| event.docket()) {
            return Some(docket);
        }
        self.carrier_metadata
            .as_ref()
            .map(|meta| meta.docket_number.as_str())
    }

    pub fn has_shipment(&self) -> bool {
        self.existing_docket().is_some()
    }

    /// Total shipment weight: declared gross weight (or `default_item_weight`)
    /// times quantity, summed over items
    pub fn shipment_weight(&self, default_item_weight: Decimal) -> Decimal {
        self.items
            .iter()
            .map(|item| {
                let unit = item
                    .gross_weight
                    .filter(|w| *w > Decimal::ZERO)
                    .unwrap_or(default_item_weight);
                unit * Decimal::from(item.quantity)
            })
            .sum()
    }

    /// Fold a successful carrier shipment into the order.
    ///
    /// Appends one tracking event and one status history entry, marks the
    /// payment as paid and advances `pending`/`confirmed` orders to `shipped`.
    pub fn apply_shipment(
        &mut self,
        confirmation: &ShipmentConfirmation,
        changed_by: Option<String>,
        now: DateTime<Utc>,
    ) {
        let docket = confirmation.docket_number.clone().unwrap_or_default();

        self.tracking.push(TrackingEvent {
            status: TrackingStatus::ShipmentCreated,
            timestamp: now,
            carrier: Some(confirmation.carrier.clone()),
            docket_number: Some(docket.clone()),
            reference_number: confirmation.reference_number.clone(),
            note: Some(format!("Shipment created with {}", confirmation.carrier)),
            estimated_delivery: confirmation.estimated_delivery.clone(),
        });

        self.carrier_metadata = Some(CarrierMetadata {
            carrier: confirmation.carrier.clone(),
            docket_number: docket.clone(),
            reference_number: confirmation.reference_number.clone(),
            estimated_delivery: confirmation.estimated_delivery.clone(),
            created_at: now,
        });

        self.payment.reject_cash_on_delivery();
        self.payment.status = PaymentStatus::Paid;

        if matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed) {
            self.status = OrderStatus::Shipped;
        }

        let note = if docket.is_empty() {
            "Shipment created, docket number pending from carrier".to_string()
        } else {
            format!("Shipment created with docket {}", docket)
        };
        self.status_history.push(StatusHistoryEntry {
            status: self.status,
            timestamp: now,
            note,
            changed_by,
        });

        self.updated_at = now;
    }
}

impl LineItem {
    /// Build a line item, computing its totals
    pub fn priced(
        name: String,
        quantity: u32,
        unit_price: Decimal,
        discount: Decimal,
        tax_rate_percent: Decimal,
        currency: &str,
    ) -> Self {
        LineItem {
            product_id: None,
            name,
            sku: None,
            jewelry: JewelrySpec::default(),
            quantity,
            unit_price,
            gross_weight: None,
            totals: LineTotals::compute(currency, unit_price, quantity, discount, tax_rate_percent),
        }
    }
}

/// Generate an order number: creation time in milliseconds followed by a
/// random base-36 suffix, upper-cased.
///
/// Not guaranteed unique; the store's unique constraint has the final say.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("{}{}", now.timestamp_millis(), suffix).to_uppercase()
}
