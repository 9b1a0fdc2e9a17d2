use chrono::NaiveDate;

use crate::models::error::ServiceError;
use crate::models::feature_collection::{FeatureCollection, TrailPoint};
use crate::models::updates::MapView;

pub enum TypedCommand<V: MapView> {
    /// Sent right away.
    Notify(V::Outbound),
    /// Map drawing; held until the client's map is ready, latest wins.
    Render(V::Outbound),
    Fetch(FetchRequest),
    /// Results of fetches issued so far are no longer wanted.
    CancelFetch,
    MapReady,
}

pub enum Command {
    Notify(serde_json::Value),
    Render(serde_json::Value),
    Fetch(FetchRequest),
    CancelFetch,
    MapReady,
    Error(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    EmployeeHistory { employee: String, date: NaiveDate },
    EmployeeTrail { employee: String, date: NaiveDate },
}

#[derive(Debug)]
pub enum FetchOutcome {
    EmployeeHistory {
        date: NaiveDate,
        result: Result<Option<FeatureCollection>, ServiceError>,
    },
    EmployeeTrail {
        employee: String,
        date: NaiveDate,
        result: Result<Vec<TrailPoint>, ServiceError>,
    },
}
