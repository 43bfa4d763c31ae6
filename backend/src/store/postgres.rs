//! PostgreSQL order store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    CarrierMetadata, Customer, CustomerRef, LegacyPricing, LineItem, Order, OrderStatus,
    Pagination, Payment, Pricing, ShippingAddress, StatusHistoryEntry, TrackingEvent,
};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{indexed_docket, OrderFilter, OrderStore};
use crate::error::{AppError, AppResult};

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";
const SHIPMENT_DOCKET_CONSTRAINT: &str = "orders_shipment_docket_key";

const SELECT_ORDER: &str = r#"
    SELECT o.id, o.order_number, o.customer_id,
           c.name AS customer_name, c.email AS customer_email, c.phone AS customer_phone,
           o.status, o.legacy_status, o.items, o.pricing,
           o.subtotal, o.discount, o.shipping_cost, o.tax, o.total_amount,
           o.payment, o.shipping_address, o.tracking, o.carrier_metadata, o.status_history,
           o.notes, o.version, o.created_at, o.updated_at
    FROM orders o
    LEFT JOIN customers c ON c.id = o.customer_id
"#;

const FILTER_CLAUSE: &str = r#"
    WHERE ($1::text IS NULL OR o.status = $1)
      AND ($2::text IS NULL OR o.legacy_status = $2)
      AND ($3::timestamptz IS NULL OR o.created_at >= $3)
      AND ($4::timestamptz IS NULL OR o.created_at < $4)
"#;

/// Order store backed by the `orders` table
#[derive(Clone)]
pub struct PgOrderStore {
    db: PgPool,
}

/// Database row for an order joined with its customer
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Option<Uuid>,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_phone: Option<String>,
    status: String,
    legacy_status: Option<String>,
    items: Json<Vec<LineItem>>,
    pricing: Json<Pricing>,
    subtotal: Decimal,
    discount: Decimal,
    shipping_cost: Decimal,
    tax: Decimal,
    total_amount: Decimal,
    payment: Json<Payment>,
    shipping_address: Option<Json<ShippingAddress>>,
    tracking: Json<Vec<TrackingEvent>>,
    carrier_metadata: Option<Json<CarrierMetadata>>,
    status_history: Json<Vec<StatusHistoryEntry>>,
    notes: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| AppError::Internal(format!("order {}: {}", row.order_number, e)))?;

        // Unknown legacy values are dropped; the next save re-derives them
        let legacy_status = row.legacy_status.and_then(|s| s.parse().ok());

        let customer = match (row.customer_id, row.customer_email) {
            (Some(id), Some(email)) => Some(CustomerRef::Populated(Customer {
                id,
                name: row.customer_name.unwrap_or_default(),
                email,
                phone: row.customer_phone,
            })),
            (Some(id), None) => Some(CustomerRef::Id(id)),
            (None, _) => None,
        };

        Ok(Order {
            id: row.id,
            order_number: row.order_number,
            customer,
            status,
            legacy_status,
            items: row.items.0,
            pricing: row.pricing.0,
            legacy_pricing: LegacyPricing {
                subtotal: row.subtotal,
                discount: row.discount,
                shipping_cost: row.shipping_cost,
                tax: row.tax,
                total_amount: row.total_amount,
            },
            payment: row.payment.0,
            shipping_address: row.shipping_address.map(|a| a.0),
            tracking: row.tracking.0,
            carrier_metadata: row.carrier_metadata.map(|m| m.0),
            status_history: row.status_history.0,
            notes: row.notes,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgOrderStore {
    /// Create a new PgOrderStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE id = $1")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> AppResult<Order> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, customer_id, status, legacy_status, items, pricing,
                                subtotal, discount, shipping_cost, tax, total_amount, payment,
                                shipping_address, tracking, carrier_metadata, shipment_docket,
                                status_history, notes, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, 0, $20, $21)
            "#,
        )
        .bind(order.id)
        .bind(&order.order_number)
        .bind(order.customer.as_ref().map(CustomerRef::id))
        .bind(order.status.as_str())
        .bind(order.legacy_status.map(|s| s.as_str()))
        .bind(Json(&order.items))
        .bind(Json(&order.pricing))
        .bind(order.legacy_pricing.subtotal)
        .bind(order.legacy_pricing.discount)
        .bind(order.legacy_pricing.shipping_cost)
        .bind(order.legacy_pricing.tax)
        .bind(order.legacy_pricing.total_amount)
        .bind(Json(&order.payment))
        .bind(order.shipping_address.as_ref().map(Json))
        .bind(Json(&order.tracking))
        .bind(order.carrier_metadata.as_ref().map(Json))
        .bind(indexed_docket(order))
        .bind(Json(&order.status_history))
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.db)
        .await
        .map_err(map_write_error)?;

        self.find_by_id(order.id)
            .await?
            .ok_or_else(|| AppError::Internal("Inserted order could not be read back".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE o.id = $1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        row.map(Order::try_from).transpose()
    }

    async fn save(&self, order: &Order) -> AppResult<Order> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, legacy_status = $3, items = $4, pricing = $5,
                subtotal = $6, discount = $7, shipping_cost = $8, tax = $9, total_amount = $10,
                payment = $11, shipping_address = $12, tracking = $13, carrier_metadata = $14,
                shipment_docket = $15, status_history = $16, notes = $17,
                version = version + 1, updated_at = $18
            WHERE id = $1 AND version = $19
            "#,
        )
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.legacy_status.map(|s| s.as_str()))
        .bind(Json(&order.items))
        .bind(Json(&order.pricing))
        .bind(order.legacy_pricing.subtotal)
        .bind(order.legacy_pricing.discount)
        .bind(order.legacy_pricing.shipping_cost)
        .bind(order.legacy_pricing.tax)
        .bind(order.legacy_pricing.total_amount)
        .bind(Json(&order.payment))
        .bind(order.shipping_address.as_ref().map(Json))
        .bind(Json(&order.tracking))
        .bind(order.carrier_metadata.as_ref().map(Json))
        .bind(indexed_docket(order))
        .bind(Json(&order.status_history))
        .bind(&order.notes)
        .bind(order.updated_at)
        .bind(order.version)
        .execute(&self.db)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return if self.exists(order.id).await? {
                Err(AppError::ConcurrentModification(order.order_number.clone()))
            } else {
                Err(AppError::NotFound("Order".to_string()))
            };
        }

        let mut saved = order.clone();
        saved.version += 1;
        Ok(saved)
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Order>, u64)> {
        let status = filter.status.map(|s| s.as_str());
        let legacy_status = filter.legacy_status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM orders o {}",
            FILTER_CLAUSE
        ))
        .bind(status)
        .bind(legacy_status)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} {} ORDER BY o.created_at DESC LIMIT $5 OFFSET $6",
            SELECT_ORDER, FILTER_CLAUSE
        ))
        .bind(status)
        .bind(legacy_status)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(i64::from(pagination.per_page))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((orders, total.max(0) as u64))
    }
}

/// Translate unique violations into domain errors
fn map_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(ORDER_NUMBER_CONSTRAINT) => {
                    return AppError::DuplicateEntry("order_number".to_string())
                }
                Some(SHIPMENT_DOCKET_CONSTRAINT) => {
                    return AppError::Conflict {
                        resource: "shipment".to_string(),
                        message: "Another order already holds this shipment docket".to_string(),
                    }
                }
                _ => {}
            }
        }
    }
    AppError::DatabaseError(err)
}
