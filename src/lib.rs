//! Office geofence and employee location service.
//!
//! Serves the geofence record form and the employee location trail as map
//! sessions over websockets, plus the REST endpoints they and the mobile
//! client use.

pub mod api;
pub mod config;
pub mod extract;
pub mod handlers;
pub mod jwt_auth;
pub mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::connect_info::ConnectInfo;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Extension, Router, TypedHeader};
use tokio::sync::{mpsc, Semaphore};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::handlers::handler::WebSocketUpdateHandler;
use crate::handlers::location_store::{LocationSource, LocationStore};
use crate::handlers::processor::{GeofenceFormProcessor, LocationTrailProcessor};
use crate::handlers::websocket_actor::MapSessionHandler;
use crate::jwt_auth::CurrentUser;
use crate::models::error::ServiceError;
use crate::models::location_log::LocationLog;
use crate::models::updates::{GeofenceForm, LocationTrail};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<LocationStore>,
    pub source: Arc<dyn LocationSource>,
    pub sessions: Arc<Semaphore>,
    pub location_logger: mpsc::Sender<LocationLog>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<LocationStore>, location_logger: mpsc::Sender<LocationLog>) -> Self {
        Self {
            sessions: Arc::new(Semaphore::new(config.max_map_sessions)),
            config: Arc::new(config),
            source: store.clone(),
            store,
            location_logger,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/geofences", get(api::list_geofences))
        .route("/api/geofences/:name", get(api::get_geofence).put(api::save_geofence))
        .route("/api/geofences/:name/contains", post(api::check_membership))
        .route("/api/location", get(api::user_location).post(api::record_location))
        .route("/api/employees/:employee/location", get(api::employee_location))
        .route("/ws/geofence/:name", get(geofence_ws_handler))
        .route("/ws/trail", get(trail_ws_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth::auth));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        // logging so we can see whats going on
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn geofence_ws_handler(
    ws: WebSocketUpgrade,
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    Path(name): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let permit = state.sessions.clone().try_acquire_owned().map_err(|_| ServiceError::Busy)?;
    info!(
        "{} opened geofence {} from {} ({})",
        user.user_id,
        name,
        addr,
        user_agent.map(|TypedHeader(agent)| agent.as_str().to_owned()).unwrap_or_default()
    );

    let processor = GeofenceFormProcessor::new(name, user.employee, state.store.clone(), state.config.tiles());
    let handler = Box::new(WebSocketUpdateHandler::<GeofenceForm>::new(processor));
    Ok(ws.on_upgrade(move |socket| MapSessionHandler::new(socket, handler, state.source, permit).run()))
}

async fn trail_ws_handler(
    ws: WebSocketUpgrade,
    user_agent: Option<TypedHeader<headers::UserAgent>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let permit = state.sessions.clone().try_acquire_owned().map_err(|_| ServiceError::Busy)?;
    info!(
        "{} opened location trail from {} ({})",
        user.user_id,
        addr,
        user_agent.map(|TypedHeader(agent)| agent.as_str().to_owned()).unwrap_or_default()
    );

    let handler = Box::new(WebSocketUpdateHandler::<LocationTrail>::new(LocationTrailProcessor::new()));
    Ok(ws.on_upgrade(move |socket| MapSessionHandler::new(socket, handler, state.source, permit).run()))
}
