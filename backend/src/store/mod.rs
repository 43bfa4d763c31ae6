//! Order persistence
//!
//! Services talk to an [`OrderStore`]; PostgreSQL is the production backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{LegacyOrderStatus, Order, OrderStatus, Pagination};
use uuid::Uuid;

use crate::error::AppResult;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgOrderStore;

/// Listing filter; `None` fields do not constrain the result
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub legacy_status: Option<LegacyOrderStatus>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self
                .legacy_status
                .map_or(true, |s| order.legacy_status == Some(s))
            && self.created_from.map_or(true, |from| order.created_at >= from)
            && self.created_to.map_or(true, |to| order.created_at < to)
    }
}

/// Document-style order storage.
///
/// `save` writes the whole order in one atomic update guarded by
/// `order.version`, so canonical and legacy fields are always written together
/// and a stale writer fails instead of overwriting.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Fails with `DuplicateEntry("order_number")` on a
    /// taken order number.
    async fn insert(&self, order: &Order) -> AppResult<Order>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Returns the stored order with its version bumped
    async fn save(&self, order: &Order) -> AppResult<Order>;

    /// Matching orders, newest first, plus the total match count
    async fn list(
        &self,
        filter: &OrderFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Order>, u64)>;
}

/// Docket value indexed for uniqueness, if the order has one
pub(crate) fn indexed_docket(order: &Order) -> Option<String> {
    order
        .existing_docket()
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
