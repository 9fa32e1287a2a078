//! Book catalog outbox relay entry point.
//!
//! Polls the event store for unpublished events and forwards them to the
//! in-process event bus until interrupted.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use catalog_core::clock::SystemClock;
use catalog_event_store::pg_event_store::PgEventStore;
use catalog_messaging::event_bus::{EventBus, EventBusPublisher};
use catalog_outbox::pending_events_publisher::PendingEventsPublisher;
use catalog_review::application::event_handlers::{
    CATALOG_SERVICE_TOPIC, register_catalog_event_handler,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting book catalog outbox relay");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable must be set")?;
    let poll_interval_ms: u64 = std::env::var("POLL_INTERVAL_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .map_err(|e| format!("POLL_INTERVAL_MS must be a valid u64: {e}"))?;

    // Create database connection pool and apply migrations.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // Wire the event store to the bus through the polling relay.
    let store = Arc::new(PgEventStore::new(pool));
    let bus = Arc::new(EventBus::new());
    register_catalog_event_handler(bus.as_ref()).await?;

    let publisher = Arc::new(EventBusPublisher::new(
        Arc::clone(&bus),
        CATALOG_SERVICE_TOPIC,
    ));
    let relay = PendingEventsPublisher::with_poll_interval(
        store,
        publisher,
        Arc::new(SystemClock),
        Duration::from_millis(poll_interval_ms),
    );
    relay.start().await;
    tracing::info!(poll_interval_ms, "Outbox relay started");

    // Run until interrupted.
    tokio::signal::ctrl_c().await?;
    relay.stop().await;
    tracing::info!("Outbox relay stopped");

    Ok(())
}
