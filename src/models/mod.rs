pub mod error;
pub mod feature_collection;
pub mod geofence;
pub mod location_log;
pub mod outcome;
pub mod position;
pub mod scene;
pub mod updates;
