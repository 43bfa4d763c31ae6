//! In-memory order store for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shared::{Order, Pagination};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{indexed_docket, OrderFilter, OrderStore};
use crate::error::{AppError, AppResult};

/// Mirrors the PostgreSQL store's uniqueness and version checks
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
    duplicate_number_failures: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` inserts fail as if the order number were taken
    pub fn fail_next_inserts_with_duplicate(&self, count: usize) {
        self.duplicate_number_failures.store(count, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.read().await.get(&id).cloned()
    }

    /// Store an order as-is, bypassing checks
    pub async fn put(&self, order: Order) {
        self.orders.write().await.insert(order.id, order);
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> AppResult<Order> {
        let pending_failures = self.duplicate_number_failures.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.duplicate_number_failures
                .store(pending_failures - 1, Ordering::SeqCst);
            return Err(AppError::DuplicateEntry("order_number".to_string()));
        }

        let mut orders = self.orders.write().await;
        if orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(AppError::DuplicateEntry("order_number".to_string()));
        }

        let mut stored = order.clone();
        stored.version = 0;
        orders.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn save(&self, order: &Order) -> AppResult<Order> {
        let mut orders = self.orders.write().await;

        let current = orders
            .get(&order.id)
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
        if current.version != order.version {
            return Err(AppError::ConcurrentModification(order.order_number.clone()));
        }

        if let Some(docket) = indexed_docket(order) {
            let taken = orders
                .values()
                .any(|o| o.id != order.id && indexed_docket(o).as_deref() == Some(docket.as_str()));
            if taken {
                return Err(AppError::Conflict {
                    resource: "shipment".to_string(),
                    message: "Another order already holds this shipment docket".to_string(),
                });
            }
        }

        let mut saved = order.clone();
        saved.version += 1;
        orders.insert(saved.id, saved.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(saved)
    }

    async fn list(
        &self,
        filter: &OrderFilter,
        pagination: &Pagination,
    ) -> AppResult<(Vec<Order>, u64)> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.per_page as usize)
            .collect();

        Ok((page, total))
    }
}
