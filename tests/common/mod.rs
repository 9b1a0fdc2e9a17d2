#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use geofence_service::config::AppConfig;
use geofence_service::handlers::location_logger::LocationLogger;
use geofence_service::handlers::location_store::LocationStore;
use geofence_service::jwt_auth::TokenClaims;
use geofence_service::models::feature_collection::FeatureCollection;
use geofence_service::models::location_log::LocationLog;
use geofence_service::{app, AppState};

pub fn state_with(config: AppConfig) -> (AppState, mpsc::Receiver<LocationLog>) {
    let store = Arc::new(LocationStore::new());
    let (location_logger, location_logs) = LocationLogger::channel(16);
    (AppState::new(config, store, location_logger), location_logs)
}

pub fn state() -> (AppState, mpsc::Receiver<LocationLog>) {
    state_with(AppConfig::default())
}

pub fn token(employee: Option<&str>) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = TokenClaims {
        sub: "manager@example.com".to_string(),
        iat: now,
        exp: now + 3600,
        employee: employee.map(str::to_string),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"SECRET")).unwrap()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

pub fn sample_collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "LineString",
                "coordinates": [
                    [72.855663, 19.080709],
                    [72.871113, 19.09531],
                    [72.873344, 19.078438]
                ]
            }
        }]
    })
}

pub fn seed_locations(state: &AppState, employee: &str, date: NaiveDate) {
    let collection = FeatureCollection::from_upload(sample_collection()).unwrap();
    state.store.record_location(employee, date, collection);
}

/// Serves the app on an ephemeral port.
pub fn serve(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app(state).into_make_service_with_connect_info::<SocketAddr>());
    tokio::spawn(server);
    addr
}
