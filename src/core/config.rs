//! Panel configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! the `GEOAPIFY_API_KEY` environment variable, then command line flags
//! (applied by `crate::cli`). The resulting [`NearbyConfig`] is handed to the
//! panel at mount; nothing reads the environment after that.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, sync::Arc, time::Duration};

use crate::api::location::{
    Coordinates, FixedLocation, IpLocation, LocationProvider, UnsupportedLocation,
    DEFAULT_IP_LOCATION_ENDPOINT,
};

pub const API_KEY_ENV: &str = "GEOAPIFY_API_KEY";

pub const DEFAULT_PLACES_ENDPOINT: &str = "https://api.geoapify.com/v2/places";
pub const DEFAULT_CATEGORY: &str = "commercial.shopping_mall";
pub const DEFAULT_RADIUS_M: u32 = 10_000;
pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// A validated, non-empty places API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Places service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub category: String,
    pub radius_m: u32,
    pub limit: u32,
    pub timeout_ms: u64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_PLACES_ENDPOINT.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            radius_m: DEFAULT_RADIUS_M,
            limit: DEFAULT_LIMIT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl PlacesConfig {
    /// Validation step for the key: presence is typed, absence is `None`.
    pub fn api_key(&self) -> Option<ApiKey> {
        self.api_key.as_deref().and_then(ApiKey::parse)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Where the current position comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Fixed,
    Ip,
    None,
}

impl std::str::FromStr for LocationSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(LocationSource::Fixed),
            "ip" => Ok(LocationSource::Ip),
            "none" => Ok(LocationSource::None),
            other => Err(anyhow::anyhow!("unknown location source '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Explicit source. When unset, `Fixed` is used if both coordinates are
    /// given and `None` otherwise.
    pub provider: Option<LocationSource>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_endpoint: String,
    pub timeout_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: None,
            latitude: None,
            longitude: None,
            ip_endpoint: DEFAULT_IP_LOCATION_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl LocationConfig {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    pub fn source(&self) -> LocationSource {
        match (self.provider, self.coordinates()) {
            (Some(source), _) => source,
            (None, Some(_)) => LocationSource::Fixed,
            (None, None) => LocationSource::None,
        }
    }

    /// Build the provider selected by this configuration.
    ///
    /// `Fixed` without coordinates yields the unsupported provider, the same
    /// as having no capability at all.
    pub fn provider(&self) -> Arc<dyn LocationProvider> {
        match (self.source(), self.coordinates()) {
            (LocationSource::Fixed, Some(coords)) => Arc::new(FixedLocation(coords)),
            (LocationSource::Ip, _) => Arc::new(IpLocation::new(
                self.ip_endpoint.clone(),
                Duration::from_millis(self.timeout_ms),
            )),
            _ => Arc::new(UnsupportedLocation),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    pub places: PlacesConfig,
    pub location: LocationConfig,
}

impl NearbyConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("failed to parse configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Overlay environment values using `lookup` to read variables.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            if ApiKey::parse(&key).is_some() {
                log::debug!("Using places API key from {API_KEY_ENV}");
                self.places.api_key = Some(key);
            }
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }
}
