use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use crate::models::error::ServiceError;
use crate::models::feature_collection::{FeatureCollection, TrailPoint};
use crate::models::geofence::GeofenceRecord;

/// Where map sessions fetch recorded locations from.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// The collection recorded for `employee` on `date`, if any.
    async fn employee_history(&self, employee: &str, date: NaiveDate)
        -> Result<Option<FeatureCollection>, ServiceError>;

    /// The ordered trail recorded for `employee` on `date`.
    async fn employee_trail(&self, employee: &str, date: NaiveDate) -> Result<Vec<TrailPoint>, ServiceError>;
}

#[derive(Default)]
pub struct LocationStore {
    geofences: DashMap<String, GeofenceRecord>,
    locations: DashMap<(String, NaiveDate), FeatureCollection>,
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_geofence(&self, record: GeofenceRecord) {
        self.geofences.insert(record.name.clone(), record);
    }

    pub fn geofence(&self, name: &str) -> Option<GeofenceRecord> {
        self.geofences.get(name).map(|record| record.value().clone())
    }

    pub fn geofences(&self) -> Vec<GeofenceRecord> {
        let mut records: Vec<_> = self.geofences.iter().map(|record| record.value().clone()).collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Replaces whatever was recorded for the employee on that day.
    pub fn record_location(&self, employee: &str, date: NaiveDate, collection: FeatureCollection) {
        self.locations.insert((employee.to_string(), date), collection);
    }
}

#[async_trait]
impl LocationSource for LocationStore {
    async fn employee_history(
        &self,
        employee: &str,
        date: NaiveDate,
    ) -> Result<Option<FeatureCollection>, ServiceError> {
        Ok(self
            .locations
            .get(&(employee.to_string(), date))
            .map(|collection| collection.value().clone()))
    }

    async fn employee_trail(&self, employee: &str, date: NaiveDate) -> Result<Vec<TrailPoint>, ServiceError> {
        self.locations
            .get(&(employee.to_string(), date))
            .map(|collection| collection.trail())
            .ok_or_else(|| ServiceError::NotFound("Location details not found for employee".to_string()))
    }
}
