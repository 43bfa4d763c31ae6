//! Order record management: creation, status changes and persistence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    generate_order_number, validate_currency, CarrierMetadata, CustomerRef, JewelrySpec,
    LegacyOrderStatus, LineItem, LineTotals, Order, OrderStatus, PaginatedResponse, Pagination,
    Payment, PaymentMethod, Pricing, ShippingAddress, StatusChange, TrackingEvent,
    TransitionPolicy, DEFAULT_CURRENCY,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{OrderFilter, OrderStore};

/// Attempts at finding a free order number before giving up
const MAX_ORDER_NUMBER_ATTEMPTS: usize = 3;

/// Order service owning the canonical order state
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    policy: TransitionPolicy,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: Option<Uuid>,
    pub items: Vec<LineItemInput>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub shipping: Decimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: Option<ShippingAddress>,
    pub notes: Option<String>,
}

/// One requested line item
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    pub product_id: Option<Uuid>,
    pub name: String,
    pub sku: Option<String>,
    #[serde(default)]
    pub jewelry: JewelrySpec,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax_rate_percent: Decimal,
    pub gross_weight: Option<Decimal>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Input for changing an order's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
    pub note: Option<String>,
}

/// Query parameters for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub legacy_status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Tracking view returned to polling clients
#[derive(Debug, Clone, Serialize)]
pub struct OrderTracking {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub docket_number: Option<String>,
    pub carrier: Option<CarrierMetadata>,
    pub events: Vec<TrackingEvent>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(store: Arc<dyn OrderStore>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    /// Create a pending order with a freshly generated order number
    pub async fn create_order(&self, input: CreateOrderInput, actor: &str) -> AppResult<Order> {
        validate_create_input(&input)?;

        let currency = input.currency.clone();
        let items: Vec<LineItem> = input
            .items
            .iter()
            .map(|item| build_line_item(item, &currency))
            .collect();
        let pricing = Pricing::from_lines(&currency, items.iter().map(|i| &i.totals), input.shipping);

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let now = Utc::now();
            let mut order = Order::new(
                generate_order_number(now),
                input.customer_id.map(CustomerRef::Id),
                items.clone(),
                pricing.clone(),
                Payment::new(input.payment_method),
                input.shipping_address.clone(),
                input.notes.clone(),
                now,
            );
            if let Some(entry) = order.status_history.first_mut() {
                entry.changed_by = Some(actor.to_string());
            }

            match self.store.insert(&order).await {
                Err(AppError::DuplicateEntry(field)) if field == "order_number" => {
                    tracing::warn!(
                        "Order number {} already taken (attempt {}/{})",
                        order.order_number,
                        attempt,
                        MAX_ORDER_NUMBER_ATTEMPTS
                    );
                }
                Ok(created) => {
                    tracing::info!(
                        target: "order_audit",
                        order_number = %created.order_number,
                        actor = %actor,
                        "Order created"
                    );
                    return Ok(created);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::DuplicateEntry("order_number".to_string()))
    }

    /// Get order by ID
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<Order> {
        self.store
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// List orders, newest first
    pub async fn list_orders(&self, query: ListOrdersQuery) -> AppResult<PaginatedResponse<Order>> {
        let filter = OrderFilter {
            status: query
                .status
                .as_deref()
                .map(parse_status)
                .transpose()?,
            legacy_status: query
                .legacy_status
                .as_deref()
                .map(|s| {
                    s.parse::<LegacyOrderStatus>()
                        .map_err(|e| AppError::validation("legacy_status", e.to_string()))
                })
                .transpose()?,
            created_from: query.from,
            created_to: query.to,
        };

        if let (Some(from), Some(to)) = (filter.created_from, filter.created_to) {
            if from >= to {
                return Err(AppError::validation("from", "'from' must be before 'to'"));
            }
        }

        let pagination = Pagination {
            page: query.page.unwrap_or(1),
            per_page: query.per_page.unwrap_or(20),
        }
        .normalized();

        let (orders, total) = self.store.list(&filter, &pagination).await?;
        Ok(PaginatedResponse::new(orders, &pagination, total))
    }

    /// Set the order status.
    ///
    /// Appends a status history entry and, for shipped/delivered/cancelled, a
    /// tracking event. Transitions are unconstrained unless the forward-only
    /// policy is configured.
    pub async fn set_status(
        &self,
        order_id: Uuid,
        input: UpdateStatusInput,
        actor: &str,
    ) -> AppResult<Order> {
        let status = parse_status(&input.status)?;
        let mut order = self.get_order(order_id).await?;

        if !self.policy.allows(order.status, status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move order {} from {} to {}",
                order.order_number, order.status, status
            )));
        }

        let change = order.set_status(status, input.note, Some(actor.to_string()), Utc::now());
        let saved = self.persist(order).await?;
        log_transition(&saved, change, actor);

        Ok(saved)
    }

    /// Save an order, re-deriving every legacy field first.
    ///
    /// Canonical and legacy fields go to the store in one write.
    pub async fn persist(&self, mut order: Order) -> AppResult<Order> {
        if order.payment.method == PaymentMethod::Cod {
            tracing::info!(
                "Order {}: cash on delivery replaced by {:?}",
                order.order_number,
                PaymentMethod::DEFAULT_PREPAID
            );
        }
        order.sync_legacy_fields();
        self.store.save(&order).await
    }

    /// Shipment tracking log of an order
    pub async fn get_tracking(&self, order_id: Uuid) -> AppResult<OrderTracking> {
        let order = self.get_order(order_id).await?;

        Ok(OrderTracking {
            order_id: order.id,
            docket_number: order
                .existing_docket()
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            order_number: order.order_number,
            status: order.status,
            carrier: order.carrier_metadata,
            events: order.tracking,
        })
    }
}

/// Audit log entry for a status change
pub(crate) fn log_transition(order: &Order, change: StatusChange, actor: &str) {
    tracing::info!(
        target: "order_audit",
        order_number = %order.order_number,
        actor = %actor,
        from = %change.from,
        to = %change.to,
        irregular = !change.from.can_transition_to(change.to),
        "Order status changed"
    );
}

fn parse_status(value: &str) -> AppResult<OrderStatus> {
    value.trim().parse::<OrderStatus>().map_err(|_| {
        let allowed: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
        AppError::validation(
            "status",
            format!(
                "Invalid status '{}'. Must be one of: {}",
                value,
                allowed.join(", ")
            ),
        )
    })
}

fn validate_create_input(input: &CreateOrderInput) -> AppResult<()> {
    if input.items.is_empty() {
        return Err(AppError::validation("items", "Order must contain at least one item"));
    }

    validate_currency(&input.currency).map_err(|m| AppError::validation("currency", m))?;

    if input.shipping < Decimal::ZERO {
        return Err(AppError::validation("shipping", "Shipping cost cannot be negative"));
    }

    for (index, item) in input.items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(AppError::validation(
                format!("items[{}].name", index),
                "Item name is required",
            ));
        }
        if item.quantity == 0 {
            return Err(AppError::validation(
                format!("items[{}].quantity", index),
                "Quantity must be at least 1",
            ));
        }
        if item.unit_price < Decimal::ZERO || item.discount < Decimal::ZERO {
            return Err(AppError::validation(
                format!("items[{}].unit_price", index),
                "Prices and discounts cannot be negative",
            ));
        }
        if item.discount > item.unit_price * Decimal::from(item.quantity) {
            return Err(AppError::validation(
                format!("items[{}].discount", index),
                "Discount cannot exceed the line subtotal",
            ));
        }
        if item.tax_rate_percent < Decimal::ZERO || item.tax_rate_percent > Decimal::from(100) {
            return Err(AppError::validation(
                format!("items[{}].tax_rate_percent", index),
                "Tax rate must be between 0 and 100%",
            ));
        }
    }

    Ok(())
}

fn build_line_item(input: &LineItemInput, currency: &str) -> LineItem {
    LineItem {
        product_id: input.product_id,
        name: input.name.trim().to_string(),
        sku: input.sku.clone(),
        jewelry: input.jewelry.clone(),
        quantity: input.quantity,
        unit_price: input.unit_price,
        gross_weight: input.gross_weight,
        totals: LineTotals::compute(
            currency,
            input.unit_price,
            input.quantity,
            input.discount,
            input.tax_rate_percent,
        ),
    }
}
