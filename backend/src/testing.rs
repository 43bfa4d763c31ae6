//! Test doubles and fixtures shared by the backend's unit tests

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use shared::{
    generate_order_number, Customer, CustomerRef, LineItem, Order, Payment, PaymentMethod,
    Pricing, ShippingAddress,
};
use uuid::Uuid;

use crate::config::{
    test_carrier_config, Config, DatabaseConfig, JwtConfig, OrderConfig, ServerConfig,
};
use crate::error::{AppError, AppResult};
use crate::external::{CarrierEndpoint, CarrierTransport};
use crate::store::memory::MemoryOrderStore;
use crate::AppState;

/// Carrier that replays queued responses and records every request
#[derive(Default)]
pub struct ScriptedCarrier {
    responses: Mutex<VecDeque<AppResult<Value>>>,
    calls: Mutex<Vec<(CarrierEndpoint, Value)>>,
}

impl ScriptedCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(self, response: AppResult<Value>) -> Self {
        self.push(response);
        self
    }

    pub fn push(&self, response: AppResult<Value>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(CarrierEndpoint, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CarrierTransport for ScriptedCarrier {
    async fn post(&self, endpoint: CarrierEndpoint, body: &Value) -> AppResult<Value> {
        self.calls.lock().unwrap().push((endpoint, body.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::CarrierUnavailable("no scripted response".into())))
    }
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn customer() -> Customer {
    Customer {
        id: Uuid::new_v4(),
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: Some("+91 98765 43210".to_string()),
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Asha Rao".to_string(),
        phone: None,
        line1: "Flat 12, Sea View Apartments, Marine Drive".to_string(),
        line2: Some("Near Churchgate Station".to_string()),
        city: "Mumbai".to_string(),
        state: "Maharashtra".to_string(),
        postal_code: "400001".to_string(),
        country: "India".to_string(),
    }
}

/// Pending order, ready to ship, paid by cash on delivery
pub fn shippable_order() -> Order {
    let mut ring = LineItem::priced(
        "Diamond solitaire ring".to_string(),
        1,
        dec("45000.40"),
        Decimal::ZERO,
        dec("3"),
        "INR",
    );
    ring.gross_weight = Some(dec("6.5"));
    let earrings = LineItem::priced(
        "Gold stud earrings".to_string(),
        2,
        dec("8000"),
        Decimal::ZERO,
        dec("3"),
        "INR",
    );
    let items = vec![ring, earrings];
    let pricing = Pricing::from_lines("INR", items.iter().map(|i| &i.totals), Decimal::ZERO);

    let mut order = Order::new(
        generate_order_number(Utc::now()),
        Some(CustomerRef::Populated(customer())),
        items,
        pricing,
        Payment::new(PaymentMethod::Upi),
        Some(address()),
        None,
        Utc::now(),
    );
    // Stored documents may predate cod normalisation
    order.payment.method = PaymentMethod::Cod;
    order
}

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

pub fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/jewelry_admin_test".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        carrier: test_carrier_config(),
        orders: OrderConfig {
            enforce_transitions: false,
        },
    }
}

/// Application state over in-memory doubles; the pool never connects
pub fn test_state(store: Arc<MemoryOrderStore>, carrier: Arc<ScriptedCarrier>) -> AppState {
    let config = test_config();
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .unwrap();

    AppState {
        db,
        config: Arc::new(config),
        store,
        carrier,
    }
}
