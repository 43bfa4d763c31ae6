//! Jewelry Admin Platform - Backend Server
//!
//! Administrative API for the jewelry storefront: order records, their
//! lifecycle and shipment handoff to the logistics carrier.

use axum::{routing::get, Router};
use shared::TransitionPolicy;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod middleware;
mod routes;
mod services;
mod store;
#[cfg(test)]
mod testing;

pub use config::Config;

use external::{CarrierTransport, HttpCarrierClient};
use store::{OrderStore, PgOrderStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub store: Arc<dyn OrderStore>,
    pub carrier: Arc<dyn CarrierTransport>,
}

impl AppState {
    pub fn transition_policy(&self) -> TransitionPolicy {
        TransitionPolicy::from_enforced(self.config.orders.enforce_transitions)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jewelry_admin_server=debug,order_audit=info,shipment_anomaly=warn,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Jewelry Admin Server");
    tracing::info!("Environment: {}", config.environment);

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let carrier = HttpCarrierClient::new(&config.carrier)?;
    tracing::info!(
        "Carrier {} at {} (store {})",
        config.carrier.name,
        config.carrier.base_url,
        config.carrier.origin_store_code
    );
    if config.orders.enforce_transitions {
        tracing::info!("Forward-only order status transitions enforced");
    }

    let state = AppState {
        store: Arc::new(PgOrderStore::new(db_pool.clone())),
        carrier: Arc::new(carrier),
        db: db_pool,
        config: Arc::new(config.clone()),
    };

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Jewelry Admin Platform API v1.0"
}
