use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::extract::{ApiJson, ApiQuery};
use crate::jwt_auth::CurrentUser;
use crate::models::error::ServiceError;
use crate::models::feature_collection::{FeatureCollection, TrailPoint};
use crate::models::geofence::{GeofenceDraft, GeofenceRecord};
use crate::models::location_log::LocationLog;
use crate::models::position::{Distance, GeoPoint};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LocationUpload {
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct Membership {
    pub inside: bool,
    pub distance: Distance,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn list_geofences(State(state): State<AppState>) -> Json<Vec<GeofenceRecord>> {
    Json(state.store.geofences())
}

pub async fn get_geofence(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<GeofenceRecord>, ServiceError> {
    state
        .store
        .geofence(&name)
        .map(Json)
        .ok_or_else(|| ServiceError::NotFound(format!("Geofence {} not found", name)))
}

/// Validates and stores a geofence; nothing is written when validation fails.
pub async fn save_geofence(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ApiJson(draft): ApiJson<GeofenceDraft>,
) -> Result<Json<GeofenceRecord>, ServiceError> {
    let geofence = draft.validate().map_err(|e| {
        warn!("Rejected geofence {}: {}", name, e);
        e
    })?;
    let record = GeofenceRecord::new(name, geofence, draft.location_history);
    state.store.save_geofence(record.clone());
    info!("Saved geofence {}", record.name);
    Ok(Json(record))
}

pub async fn check_membership(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ApiJson(point): ApiJson<GeoPoint>,
) -> Result<Json<Membership>, ServiceError> {
    let geofence = state
        .store
        .geofence(&name)
        .ok_or_else(|| ServiceError::NotFound(format!("Geofence {} not found", name)))?
        .geofence();
    let point = GeoPoint::checked(point.latitude, point.longitude)?;

    Ok(Json(Membership {
        inside: geofence.contains(&point),
        distance: point.distance_to(&geofence.center),
    }))
}

/// History the current employee recorded on a day; `null` when none.
pub async fn user_location(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> Result<Json<Option<FeatureCollection>>, ServiceError> {
    let employee = user.employee()?;
    let history = state
        .source
        .employee_history(employee, query.date.unwrap_or_else(today))
        .await?;
    Ok(Json(history))
}

pub async fn record_location(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(upload): ApiJson<LocationUpload>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let location = upload
        .location
        .filter(|location| !location.is_null())
        .ok_or_else(|| ServiceError::BadRequest("location is required.".to_string()))?;
    let employee = user.employee()?.to_string();

    let mut collection = FeatureCollection::from_upload(location)?;
    collection.stamp(&Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

    let date = upload.date.unwrap_or_else(today);
    let points = collection.points();
    state.store.record_location(&employee, date, collection);
    info!("Location updated for employee {}", employee);

    if state
        .location_logger
        .send(LocationLog::new(employee, date, points))
        .await
        .is_err()
    {
        warn!("Location logger is not running; skipping geofence audit");
    }

    Ok(Json(MessageResponse { message: "Location updated successfully." }))
}

pub async fn employee_location(
    State(state): State<AppState>,
    Path(employee): Path<String>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> Result<Json<Vec<TrailPoint>>, ServiceError> {
    let date = query
        .date
        .ok_or_else(|| ServiceError::BadRequest("date is required".to_string()))?;
    Ok(Json(state.source.employee_trail(&employee, date).await?))
}
