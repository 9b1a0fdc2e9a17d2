//! Render descriptions sent to the client-side map surface.

use serde::Serialize;

use crate::models::feature_collection::parse_history;
use crate::models::geofence::GeofenceDraft;
use crate::models::outcome::LoadOutcome;
use crate::models::position::GeoPoint;

const GEOFENCE_ZOOM: u8 = 13;
const TRAIL_ZOOM: u8 = 10;
const DEFAULT_RADIUS_M: f64 = 100.0;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: u8,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct MarkerOverlay {
    pub position: GeoPoint,
    pub draggable: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CircleOverlay {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PointOverlay {
    pub position: GeoPoint,
    pub label: String,
    pub radius_px: u32,
    pub color: &'static str,
    pub fill_opacity: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GeofenceScene {
    pub tiles: TileLayer,
    pub viewport: Viewport,
    pub marker: MarkerOverlay,
    pub circle: CircleOverlay,
    pub history: Vec<PointOverlay>,
    /// Number of history points drawn, or why none were.
    pub history_status: LoadOutcome<usize>,
}

impl GeofenceScene {
    pub fn build(draft: &GeofenceDraft, tiles: TileLayer) -> Self {
        let center = draft.map_center();
        let radius_m = draft
            .radius
            .filter(|radius| *radius > 0.0)
            .map(|radius| radius * 1000.0)
            .unwrap_or(DEFAULT_RADIUS_M);

        let history_outcome = parse_history(draft.location_history.as_deref());
        let history: Vec<PointOverlay> = history_outcome
            .clone()
            .loaded()
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, position)| PointOverlay {
                position,
                label: format!("Location {}", index + 1),
                radius_px: 5,
                color: "#3388ff",
                fill_opacity: 0.7,
            })
            .collect();

        Self {
            tiles,
            viewport: Viewport { center, zoom: GEOFENCE_ZOOM },
            marker: MarkerOverlay { position: center, draggable: true },
            circle: CircleOverlay {
                center,
                radius_m,
                color: "red",
                fill_color: "#f03",
                fill_opacity: 0.2,
            },
            history,
            history_status: history_outcome.map(|points| points.len()),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Polyline {
    pub path: Vec<GeoPoint>,
    pub geodesic: bool,
    pub stroke_color: &'static str,
    pub stroke_opacity: f64,
    pub stroke_weight: u32,
    pub z_index: i32,
    /// Spacing of the forward arrows drawn along the line.
    pub arrow_repeat: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrailScene {
    pub viewport: Viewport,
    pub polyline: Polyline,
}

impl TrailScene {
    /// `None` when there is nothing to draw.
    pub fn build(path: Vec<GeoPoint>) -> Option<Self> {
        let first = *path.first()?;
        Some(Self {
            viewport: Viewport { center: first, zoom: TRAIL_ZOOM },
            polyline: Polyline {
                path,
                geodesic: true,
                stroke_color: "#00B3FD",
                stroke_opacity: 0.6,
                stroke_weight: 8,
                z_index: 1,
                arrow_repeat: "50px",
            },
        })
    }
}
