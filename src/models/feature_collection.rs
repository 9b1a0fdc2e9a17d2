//! GeoJSON-like location history as recorded by the mobile client.
//!
//! Positions follow GeoJSON order, `[longitude, latitude, ...]`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::error::ServiceError;
use crate::models::outcome::LoadOutcome;
use crate::models::position::GeoPoint;

pub type Position = Vec<f64>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    pub geometry: Option<Geometry>,
}

fn feature_kind() -> String {
    "Feature".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
}

impl Geometry {
    pub fn positions(&self) -> &[Position] {
        match self {
            Geometry::Point { coordinates } => std::slice::from_ref(coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => coordinates,
        }
    }
}

/// One recorded position on an employee's trail for a day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrailPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TrailPoint {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

fn to_point(position: &[f64]) -> Option<GeoPoint> {
    match position {
        [longitude, latitude, ..] => GeoPoint::checked(*latitude, *longitude).ok(),
        _ => None,
    }
}

impl FeatureCollection {
    /// Validates an incoming upload. Accepts the collection either as a JSON
    /// object or as a JSON-encoded string.
    pub fn from_upload(location: Value) -> Result<Self, ServiceError> {
        let location = match location {
            Value::String(encoded) => serde_json::from_str(&encoded)
                .map_err(|_| ServiceError::BadRequest("Invalid JSON format in location data".to_string()))?,
            other => other,
        };

        let object = location
            .as_object()
            .ok_or_else(|| ServiceError::BadRequest("Invalid location data format".to_string()))?;
        if !object.contains_key("type") || !object.contains_key("features") {
            return Err(ServiceError::BadRequest(
                "Missing required fields in location data".to_string(),
            ));
        }

        let features = object["features"].as_array().map(Vec::as_slice).unwrap_or_default();
        for feature in features {
            let has_coordinates = match feature.pointer("/geometry/coordinates") {
                Some(Value::Array(coordinates)) => !coordinates.is_empty(),
                _ => false,
            };
            if !has_coordinates {
                return Err(ServiceError::BadRequest("Missing coordinates in feature".to_string()));
            }
        }

        let collection: FeatureCollection = serde_json::from_value(location).map_err(|e| {
            ServiceError::BadRequest(format!("Error processing location data: {}", e))
        })?;

        let all_valid = collection
            .features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .flat_map(|geometry| geometry.positions())
            .all(|position| to_point(position).is_some());
        if !all_valid {
            return Err(ServiceError::BadRequest("Invalid coordinate values".to_string()));
        }

        Ok(collection)
    }

    /// Sets `properties.timestamp` on every feature.
    pub fn stamp(&mut self, timestamp: &str) {
        for feature in &mut self.features {
            feature
                .properties
                .get_or_insert_with(Map::new)
                .insert("timestamp".to_string(), Value::String(timestamp.to_string()));
        }
    }

    /// Every well-formed position across all features, in order.
    pub fn points(&self) -> Vec<GeoPoint> {
        self.trail().iter().map(TrailPoint::position).collect()
    }

    pub fn trail(&self) -> Vec<TrailPoint> {
        let mut trail = Vec::new();
        for feature in &self.features {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            let timestamp = feature
                .properties
                .as_ref()
                .and_then(|properties| properties.get("timestamp"))
                .and_then(Value::as_str)
                .map(str::to_string);

            for position in geometry.positions() {
                match to_point(position) {
                    Some(point) => trail.push(TrailPoint {
                        latitude: point.latitude,
                        longitude: point.longitude,
                        timestamp: timestamp.clone(),
                    }),
                    None => debug!("Skipping malformed position {:?}", position),
                }
            }
        }
        trail
    }
}

/// Best-effort parse of the history stored on a geofence record.
pub fn parse_history(raw: Option<&str>) -> LoadOutcome<Vec<GeoPoint>> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return LoadOutcome::Empty,
    };

    match serde_json::from_str::<Option<FeatureCollection>>(raw) {
        Ok(Some(collection)) => {
            let points = collection.points();
            if points.is_empty() {
                LoadOutcome::Empty
            } else {
                LoadOutcome::Loaded(points)
            }
        }
        Ok(None) => LoadOutcome::Empty,
        Err(e) => {
            warn!("Error parsing location history: {}", e);
            LoadOutcome::Failed(format!("Error parsing location history: {}", e))
        }
    }
}
