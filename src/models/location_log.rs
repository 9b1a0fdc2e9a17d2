use chrono::NaiveDate;

use crate::models::position::GeoPoint;

/// Positions an employee reported for one day, queued for the geofence audit.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationLog {
    pub employee: String,
    pub date: NaiveDate,
    pub points: Vec<GeoPoint>,
}

impl LocationLog {
    pub fn new(employee: String, date: NaiveDate, points: Vec<GeoPoint>) -> Self {
        Self { employee, date, points }
    }
}
