use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::handlers::events::{FetchOutcome, FetchRequest, TypedCommand};
use crate::handlers::location_store::LocationStore;
use crate::models::error::ServiceError;
use crate::models::feature_collection::TrailPoint;
use crate::models::geofence::{DraftEdit, GeofenceDraft, GeofenceRecord};
use crate::models::outcome::LoadOutcome;
use crate::models::position::GeoPoint;
use crate::models::scene::{GeofenceScene, TileLayer, TrailScene};
use crate::models::updates::{geofence_form, location_trail, GeofenceForm, LocationTrail, MapView};

#[async_trait]
pub trait UpdateProcessor<V: MapView> {
    async fn process_open(&mut self) -> Vec<TypedCommand<V>>;
    async fn process_update(&mut self, update: V::Inbound) -> Vec<TypedCommand<V>>;
    async fn process_fetch(&mut self, outcome: FetchOutcome) -> Vec<TypedCommand<V>>;
}

/// Editing session for one office geofence record.
pub struct GeofenceFormProcessor {
    name: String,
    employee: Option<String>,
    draft: GeofenceDraft,
    store: Arc<LocationStore>,
    tiles: TileLayer,
}

impl GeofenceFormProcessor {
    /// Starts from the stored record, or an empty draft for a new one.
    pub fn new(name: String, employee: Option<String>, store: Arc<LocationStore>, tiles: TileLayer) -> Self {
        let draft = store.geofence(&name).map(|record| record.to_draft()).unwrap_or_default();
        Self { name, employee, draft, store, tiles }
    }

    fn edit(&mut self, edit: DraftEdit) -> Vec<TypedCommand<GeofenceForm>> {
        self.draft = std::mem::take(&mut self.draft).apply(edit);
        vec![
            TypedCommand::Notify(geofence_form::Outbound::Fields(self.draft.clone())),
            self.render(),
        ]
    }

    fn render(&self) -> TypedCommand<GeofenceForm> {
        TypedCommand::Render(geofence_form::Outbound::Scene(GeofenceScene::build(
            &self.draft,
            self.tiles.clone(),
        )))
    }

    fn save(&mut self) -> Vec<TypedCommand<GeofenceForm>> {
        match self.draft.validate() {
            Ok(geofence) => {
                let record = GeofenceRecord::new(self.name.clone(), geofence, self.draft.location_history.clone());
                self.store.save_geofence(record.clone());
                info!("Saved geofence {}", self.name);
                vec![TypedCommand::Notify(geofence_form::Outbound::Saved(record))]
            }
            Err(e) => {
                warn!("Rejected geofence {}: {}", self.name, e);
                vec![TypedCommand::Notify(geofence_form::Outbound::ValidationFailed(e.to_string()))]
            }
        }
    }
}

#[async_trait]
impl UpdateProcessor<GeofenceForm> for GeofenceFormProcessor {
    async fn process_open(&mut self) -> Vec<TypedCommand<GeofenceForm>> {
        vec![
            TypedCommand::Notify(geofence_form::Outbound::Fields(self.draft.clone())),
            self.render(),
        ]
    }

    async fn process_update(&mut self, update: geofence_form::Inbound) -> Vec<TypedCommand<GeofenceForm>> {
        match update {
            geofence_form::Inbound::MapReady => vec![TypedCommand::MapReady],
            geofence_form::Inbound::Edit(edit) => self.edit(edit),
            geofence_form::Inbound::CheckEmployeeLocations { date } => match &self.employee {
                Some(employee) => vec![TypedCommand::Fetch(FetchRequest::EmployeeHistory {
                    employee: employee.clone(),
                    date: date.unwrap_or_else(|| Local::now().date_naive()),
                })],
                None => vec![TypedCommand::Notify(geofence_form::Outbound::HistoryFailed(
                    "Employee not found for current user".to_string(),
                ))],
            },
            geofence_form::Inbound::Save => self.save(),
        }
    }

    async fn process_fetch(&mut self, outcome: FetchOutcome) -> Vec<TypedCommand<GeofenceForm>> {
        let FetchOutcome::EmployeeHistory { date, result } = outcome else {
            return vec![];
        };

        match result.and_then(|collection| {
            collection
                .map(|collection| serde_json::to_string(&collection))
                .transpose()
                .map_err(|e| ServiceError::Internal(e.to_string()))
        }) {
            Ok(Some(encoded)) => self.edit(DraftEdit::LocationHistory(Some(encoded))),
            Ok(None) => vec![TypedCommand::Notify(geofence_form::Outbound::NoHistory { date })],
            Err(e) => vec![TypedCommand::Notify(geofence_form::Outbound::HistoryFailed(e.to_string()))],
        }
    }
}

/// Employee/date filters of the trail page.
#[derive(Default)]
pub struct LocationTrailProcessor {
    employee: Option<String>,
    date: Option<NaiveDate>,
}

impl LocationTrailProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(&self) -> Vec<TypedCommand<LocationTrail>> {
        match (&self.employee, self.date) {
            (Some(employee), Some(date)) => vec![TypedCommand::Fetch(FetchRequest::EmployeeTrail {
                employee: employee.clone(),
                date,
            })],
            _ => vec![TypedCommand::CancelFetch],
        }
    }
}

#[async_trait]
impl UpdateProcessor<LocationTrail> for LocationTrailProcessor {
    async fn process_open(&mut self) -> Vec<TypedCommand<LocationTrail>> {
        vec![]
    }

    async fn process_update(&mut self, update: location_trail::Inbound) -> Vec<TypedCommand<LocationTrail>> {
        match update {
            location_trail::Inbound::MapReady => vec![TypedCommand::MapReady],
            location_trail::Inbound::Employee(employee) => {
                self.employee = employee.filter(|employee| !employee.trim().is_empty());
                self.load()
            }
            location_trail::Inbound::Date(date) => {
                self.date = date;
                self.load()
            }
        }
    }

    async fn process_fetch(&mut self, outcome: FetchOutcome) -> Vec<TypedCommand<LocationTrail>> {
        let FetchOutcome::EmployeeTrail { employee, date, result } = outcome else {
            return vec![];
        };

        let no_locations = || vec![TypedCommand::Notify(location_trail::Outbound::NoLocations {
            employee: employee.clone(),
            date,
        })];

        let outcome: LoadOutcome<Vec<GeoPoint>> = match result {
            Err(ServiceError::NotFound(_)) => LoadOutcome::Empty,
            other => other
                .map(|trail| trail.iter().map(TrailPoint::position).collect())
                .into(),
        };

        match outcome {
            LoadOutcome::Loaded(path) => match TrailScene::build(path) {
                Some(scene) => vec![TypedCommand::Render(location_trail::Outbound::Trail(scene))],
                None => no_locations(),
            },
            LoadOutcome::Empty => no_locations(),
            LoadOutcome::Failed(reason) => vec![TypedCommand::Notify(location_trail::Outbound::LoadFailed(reason))],
        }
    }
}
