//! Location providers
//!
//! The panel asks a [`LocationProvider`] for the current position exactly
//! once at mount. Providers report failures as [`PanelError`] values so the
//! acquirer can store them without translation.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    api::http_agent,
    core::{error::PanelError, task_manager::spawn_blocking_task},
};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Source of the current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Resolve the current position.
    ///
    /// `GeolocationUnavailable` means the capability is missing altogether,
    /// `GeolocationFailed` carries the provider's own message.
    async fn current_position(&self) -> Result<Coordinates, PanelError>;
}

/// Provider used when nothing is configured.
pub struct UnsupportedLocation;

#[async_trait]
impl LocationProvider for UnsupportedLocation {
    async fn current_position(&self) -> Result<Coordinates, PanelError> {
        Err(PanelError::GeolocationUnavailable)
    }
}

/// Provider returning coordinates given on the command line or in the config file.
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, PanelError> {
        let Coordinates {
            latitude,
            longitude,
        } = self.0;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(PanelError::GeolocationFailed(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }
        Ok(self.0)
    }
}

pub const DEFAULT_IP_LOCATION_ENDPOINT: &str = "http://ip-api.com/json/";

/// Shape of the IP geolocation reply. Only `status` is always present.
#[derive(Debug, Clone, Deserialize)]
pub struct IpLocationReply {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl IpLocationReply {
    pub fn into_coordinates(self) -> Result<Coordinates, PanelError> {
        if self.status != "success" {
            let message = self
                .message
                .unwrap_or_else(|| format!("lookup returned status '{}'", self.status));
            return Err(PanelError::GeolocationFailed(message));
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(PanelError::GeolocationFailed(
                "Position unavailable".to_string(),
            )),
        }
    }
}

/// Approximate position derived from the public IP address.
#[derive(Clone)]
pub struct IpLocation {
    agent: ureq::Agent,
    endpoint: String,
}

impl IpLocation {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: http_agent(timeout),
            endpoint: endpoint.into(),
        }
    }

    #[cfg(test)]
    fn with_agent(agent: ureq::Agent, endpoint: impl Into<String>) -> Self {
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    fn lookup(&self) -> Result<IpLocationReply> {
        let mut response = self
            .agent
            .get(self.endpoint.as_str())
            .query("fields", "status,message,lat,lon")
            .call()?;
        let reply = response.body_mut().read_json::<IpLocationReply>()?;
        Ok(reply)
    }
}

#[async_trait]
impl LocationProvider for IpLocation {
    async fn current_position(&self) -> Result<Coordinates, PanelError> {
        let this = self.clone();
        let reply = spawn_blocking_task(move || this.lookup())
            .await
            .map_err(|err| PanelError::GeolocationFailed(format!("lookup task failed: {err}")))?
            .map_err(|err| PanelError::GeolocationFailed(err.to_string()))?;
        log::debug!("IP geolocation reply: {reply:?}");
        reply.into_coordinates()
    }
}
