use serde::{Deserialize, Serialize};

use crate::models::error::ValidationError;
use crate::models::position::{check_latitude, check_longitude, haversine_km, GeoPoint};

/// Whether `point` lies within `radius_km` of `center`.
///
/// The radius is not validated here: a zero radius only admits the center
/// itself and a negative one admits nothing.
pub fn is_point_in_geofence(point: &GeoPoint, center: &GeoPoint, radius_km: f64) -> bool {
    haversine_km(point, center) <= radius_km
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub center: GeoPoint,
    pub radius_km: f64,
}

impl Geofence {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        is_point_in_geofence(point, &self.center, self.radius_km)
    }
}

/// Persisted office geofence, flat as stored on the record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeofenceRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub location_history: Option<String>,
}

impl GeofenceRecord {
    pub fn new(name: String, geofence: Geofence, location_history: Option<String>) -> Self {
        Self {
            name,
            latitude: geofence.center.latitude,
            longitude: geofence.center.longitude,
            radius: geofence.radius_km,
            location_history,
        }
    }

    pub fn geofence(&self) -> Geofence {
        Geofence {
            center: GeoPoint::new(self.latitude, self.longitude),
            radius_km: self.radius,
        }
    }

    pub fn to_draft(&self) -> GeofenceDraft {
        GeofenceDraft {
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            radius: Some(self.radius),
            location_history: self.location_history.clone(),
        }
    }
}

/// In-progress edit of a geofence record. Fields stay unchecked until
/// [`GeofenceDraft::validate`] runs at save time.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GeofenceDraft {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub location_history: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Latitude(Option<f64>),
    Longitude(Option<f64>),
    Radius(Option<f64>),
    MarkerMoved(GeoPoint),
    LocationHistory(Option<String>),
}

impl GeofenceDraft {
    pub fn apply(self, edit: DraftEdit) -> Self {
        match edit {
            DraftEdit::Latitude(latitude) => Self { latitude, ..self },
            DraftEdit::Longitude(longitude) => Self { longitude, ..self },
            DraftEdit::Radius(radius) => Self { radius, ..self },
            DraftEdit::MarkerMoved(point) => Self {
                latitude: Some(point.latitude),
                longitude: Some(point.longitude),
                ..self
            },
            DraftEdit::LocationHistory(location_history) => Self { location_history, ..self },
        }
    }

    /// Range-checks each field independently. Latitude, longitude and radius
    /// are checked in that order and the first failure is returned.
    pub fn validate(&self) -> Result<Geofence, ValidationError> {
        let latitude = check_latitude(self.latitude.ok_or(ValidationError::Missing("Latitude"))?)?;
        let longitude = check_longitude(self.longitude.ok_or(ValidationError::Missing("Longitude"))?)?;
        let radius_km = self.radius.ok_or(ValidationError::Missing("Radius"))?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ValidationError::Radius(radius_km));
        }

        Ok(Geofence {
            center: GeoPoint::new(latitude, longitude),
            radius_km,
        })
    }

    /// Where the map should be centered; unset coordinates fall back to 0.
    pub fn map_center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude.unwrap_or(0.0), self.longitude.unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(latitude: f64, longitude: f64, radius: f64) -> GeofenceDraft {
        GeofenceDraft {
            latitude: Some(latitude),
            longitude: Some(longitude),
            radius: Some(radius),
            location_history: None,
        }
    }

    #[test]
    fn membership_scenarios() {
        let office = Geofence { center: GeoPoint::new(0.0, 0.0), radius_km: 10.0 };

        assert!(office.contains(&GeoPoint::new(0.0, 0.05)));
        assert!(!office.contains(&GeoPoint::new(0.0, 0.2)));
        assert!(office.contains(&office.center));
    }

    #[test]
    fn zero_radius_only_admits_center() {
        let center = GeoPoint::new(19.08, 72.85);
        assert!(is_point_in_geofence(&center, &center, 0.0));
        assert!(!is_point_in_geofence(&GeoPoint::new(19.08, 72.8501), &center, 0.0));
    }

    #[test]
    fn negative_radius_is_not_validated_by_membership() {
        let center = GeoPoint::new(0.0, 0.0);
        assert!(!is_point_in_geofence(&center, &center, -1.0));
    }

    #[test]
    fn validator_rejects_out_of_range_fields() {
        assert_eq!(draft(91.0, 0.0, 1.0).validate(), Err(ValidationError::Latitude(91.0)));
        assert_eq!(draft(-91.0, 0.0, 1.0).validate(), Err(ValidationError::Latitude(-91.0)));
        assert_eq!(draft(0.0, 181.0, 1.0).validate(), Err(ValidationError::Longitude(181.0)));
        assert_eq!(draft(0.0, -181.0, 1.0).validate(), Err(ValidationError::Longitude(-181.0)));
        assert_eq!(draft(0.0, 0.0, 0.0).validate(), Err(ValidationError::Radius(0.0)));
        assert_eq!(draft(0.0, 0.0, -5.0).validate(), Err(ValidationError::Radius(-5.0)));
        assert!(draft(0.0, 0.0, f64::INFINITY).validate().is_err());
        assert!(draft(f64::NAN, 0.0, 1.0).validate().is_err());
    }

    #[test]
    fn validator_accepts_boundaries() {
        for (lat, lng) in [(90.0, 0.0), (-90.0, 0.0), (0.0, 180.0), (0.0, -180.0)] {
            assert!(draft(lat, lng, 1.0).validate().is_ok(), "({lat}, {lng})");
        }
        let geofence = draft(0.0, 0.0, 0.0001).validate().unwrap();
        assert_eq!(geofence.radius_km, 0.0001);
    }

    #[test]
    fn validator_reports_first_failure() {
        let err = draft(100.0, 200.0, -1.0).validate().unwrap_err();
        assert_eq!(err.to_string(), "Latitude must be between -90 and 90 degrees");
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = GeofenceDraft::default().validate().unwrap_err();
        assert_eq!(err, ValidationError::Missing("Latitude"));
        assert_eq!(err.to_string(), "Latitude is required");
    }

    #[test]
    fn marker_move_writes_back_both_coordinates() {
        let moved = draft(1.0, 2.0, 3.0).apply(DraftEdit::MarkerMoved(GeoPoint::new(4.0, 5.0)));
        assert_eq!(moved, draft(4.0, 5.0, 3.0));
    }

    #[test]
    fn field_edits_touch_one_field() {
        let edited = GeofenceDraft::default()
            .apply(DraftEdit::Radius(Some(0.5)))
            .apply(DraftEdit::LocationHistory(Some("{}".to_string())));

        assert_eq!(edited.radius, Some(0.5));
        assert_eq!(edited.latitude, None);
        assert_eq!(edited.location_history.as_deref(), Some("{}"));
        assert_eq!(edited.map_center(), GeoPoint::new(0.0, 0.0));
    }

    #[test]
    fn record_round_trips_through_draft() {
        let geofence = draft(19.07, 72.87, 2.5).validate().unwrap();
        let record = GeofenceRecord::new("Mumbai".to_string(), geofence, None);
        assert_eq!(record.geofence(), geofence);
        assert_eq!(record.to_draft(), draft(19.07, 72.87, 2.5));
    }
}
