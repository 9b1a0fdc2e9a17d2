use serde::{Deserialize, Serialize};

use crate::models::error::ValidationError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Builds a point, rejecting coordinates outside the WGS84 ranges.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            latitude: check_latitude(latitude)?,
            longitude: check_longitude(longitude)?,
        })
    }

    pub fn distance_to(&self, other: &GeoPoint) -> Distance {
        Distance { km: haversine_km(self, other) }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub km: f64,
}

/// Great-circle distance between two points on a sphere of radius
/// [`EARTH_RADIUS_KM`].
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // rounding can push h just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

pub(crate) fn check_latitude(latitude: f64) -> Result<f64, ValidationError> {
    if (-90.0..=90.0).contains(&latitude) {
        Ok(latitude)
    } else {
        Err(ValidationError::Latitude(latitude))
    }
}

pub(crate) fn check_longitude(longitude: f64) -> Result<f64, ValidationError> {
    if (-180.0..=180.0).contains(&longitude) {
        Ok(longitude)
    } else {
        Err(ValidationError::Longitude(longitude))
    }
}
