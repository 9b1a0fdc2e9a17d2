use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::models::scene::TileLayer;

const OSM_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Upper bound on concurrently open map sessions.
    pub max_map_sessions: usize,
    pub tile_url: String,
    pub tile_attribution: String,
    /// Capacity of the queue feeding the geofence audit.
    pub location_log_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: "SECRET".to_string(),
            max_map_sessions: 10_000,
            tile_url: OSM_TILES.to_string(),
            tile_attribution: OSM_ATTRIBUTION.to_string(),
            location_log_buffer: 1024,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables. A variable that is set
    /// but does not parse is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT")?.unwrap_or(defaults.port),
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            max_map_sessions: parsed(&lookup, "MAX_MAP_SESSIONS")?.unwrap_or(defaults.max_map_sessions),
            tile_url: lookup("MAP_TILE_URL").unwrap_or(defaults.tile_url),
            tile_attribution: lookup("MAP_TILE_ATTRIBUTION").unwrap_or(defaults.tile_attribution),
            location_log_buffer: parsed(&lookup, "LOCATION_LOG_BUFFER")?.unwrap_or(defaults.location_log_buffer),
        })
    }

    pub fn tiles(&self) -> TileLayer {
        TileLayer {
            url_template: self.tile_url.clone(),
            attribution: self.tile_attribution.clone(),
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }))
        .transpose()
}
