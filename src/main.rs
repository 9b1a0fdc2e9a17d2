//! Geofence service.
//!
//! Run the server with
//! ```not_rust
//! JWT_SECRET=change-me cargo run --bin geofence-service
//! ```
//!
//! Map clients connect to `ws://localhost:3000/ws/geofence/<name>` and
//! `ws://localhost:3000/ws/trail` with an `access_token` query parameter.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Server;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geofence_service::config::AppConfig;
use geofence_service::handlers::location_logger::LocationLogger;
use geofence_service::handlers::location_store::LocationStore;
use geofence_service::{app, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geofence_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let store = Arc::new(LocationStore::new());
    let (location_logger, location_logs) = LocationLogger::channel(config.location_log_buffer);
    tokio::spawn(LocationLogger::new(store.clone()).run_actor(location_logs));

    let state = AppState::new(config, store, location_logger);

    info!("listening on {}", addr);
    Server::bind(&addr)
        .serve(app(state).into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}
