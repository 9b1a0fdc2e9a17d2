use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::handlers::location_store::LocationStore;
use crate::models::location_log::LocationLog;
use crate::models::position::GeoPoint;

/// Audits uploaded locations against the registered office geofences.
pub struct LocationLogger {
    store: Arc<LocationStore>,
}

impl LocationLogger {
    pub fn new(store: Arc<LocationStore>) -> Self {
        Self { store }
    }

    pub fn channel(buffer: usize) -> (mpsc::Sender<LocationLog>, mpsc::Receiver<LocationLog>) {
        mpsc::channel(buffer)
    }

    pub async fn run_actor(self, mut rx: mpsc::Receiver<LocationLog>) {
        while let Some(location_log) = rx.recv().await {
            let outside = self.outside_geofences(&location_log);
            for point in &outside {
                warn!(
                    employee = %location_log.employee,
                    date = %location_log.date,
                    "Location outside geofence: [{}, {}]",
                    point.longitude,
                    point.latitude
                );
            }
            debug!(
                employee = %location_log.employee,
                points = location_log.points.len(),
                outside = outside.len(),
                "Audited location upload"
            );
        }
        info!("Location logger channel closed");
    }

    /// Points that fall inside none of the registered geofences. With no
    /// geofences registered nothing is reported.
    pub fn outside_geofences(&self, location_log: &LocationLog) -> Vec<GeoPoint> {
        let geofences: Vec<_> = self.store.geofences().iter().map(|record| record.geofence()).collect();
        if geofences.is_empty() {
            return Vec::new();
        }

        location_log
            .points
            .iter()
            .filter(|point| !geofences.iter().any(|geofence| geofence.contains(point)))
            .copied()
            .collect()
    }
}
