use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::handlers::processor::{GeofenceFormProcessor, LocationTrailProcessor, UpdateProcessor};

// Map views

pub struct GeofenceForm;

pub struct LocationTrail;

pub trait MapView: Sized + Send + Sync + 'static {
    type Inbound: DeserializeOwned + Send;
    type Outbound: Serialize + Send;
    type Processor: UpdateProcessor<Self> + Send + Sync;

    fn view_name() -> &'static str;
}

impl MapView for GeofenceForm {
    type Inbound = geofence_form::Inbound;
    type Outbound = geofence_form::Outbound;
    type Processor = GeofenceFormProcessor;

    fn view_name() -> &'static str {
        "GeofenceForm"
    }
}

impl MapView for LocationTrail {
    type Inbound = location_trail::Inbound;
    type Outbound = location_trail::Outbound;
    type Processor = LocationTrailProcessor;

    fn view_name() -> &'static str {
        "LocationTrail"
    }
}

pub mod geofence_form {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    use crate::models::geofence::{DraftEdit, GeofenceDraft, GeofenceRecord};
    use crate::models::scene::GeofenceScene;

    #[derive(Deserialize, Debug)]
    pub enum Inbound {
        MapReady,
        Edit(DraftEdit),
        CheckEmployeeLocations {
            #[serde(default)]
            date: Option<NaiveDate>,
        },
        Save,
    }

    #[derive(Serialize, Debug)]
    pub enum Outbound {
        Fields(GeofenceDraft),
        Scene(GeofenceScene),
        Saved(GeofenceRecord),
        ValidationFailed(String),
        NoHistory { date: NaiveDate },
        HistoryFailed(String),
    }
}

pub mod location_trail {
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    use crate::models::scene::TrailScene;

    #[derive(Deserialize, Debug)]
    pub enum Inbound {
        MapReady,
        Employee(Option<String>),
        Date(Option<NaiveDate>),
    }

    #[derive(Serialize, Debug)]
    pub enum Outbound {
        Trail(TrailScene),
        NoLocations { employee: String, date: NaiveDate },
        LoadFailed(String),
    }
}
