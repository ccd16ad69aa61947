//! Places search against the Geoapify places API.
//!
//! [`PlacesQuery`] holds everything that goes on the wire, [`PlacesTransport`]
//! is the seam the fetcher calls through, and [`GeoapifyClient`] is the real
//! HTTP implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::{
    api::{http_agent, location::Coordinates},
    core::{config::ApiKey, task_manager::spawn_blocking_task},
};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_ADDRESS: &str = "No address available";

/// One entry of the result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub formatted: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: FeatureProperties,
}

/// Response body of `GET /v2/places`. Only the fields the panel shows are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    pub features: Vec<Feature>,
}

impl PlacesResponse {
    /// Map every feature to a [`Place`], keeping response order.
    pub fn into_places(self) -> Vec<Place> {
        self.features.into_iter().map(Place::from).collect()
    }
}

impl From<Feature> for Place {
    fn from(feature: Feature) -> Self {
        let FeatureProperties { name, formatted } = feature.properties;
        Place {
            name: non_empty(name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            formatted: non_empty(formatted).unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Degrees in plain decimal notation, whole numbers keep one decimal (`-75.0`).
pub fn format_degrees(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value}.0")
    } else {
        format!("{value}")
    }
}

/// A single places search around a center point.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacesQuery {
    pub center: Coordinates,
    pub category: String,
    pub radius_m: u32,
    pub limit: u32,
    pub api_key: ApiKey,
}

impl PlacesQuery {
    /// `lon,lat` as the geofence expects it.
    pub fn geofence_center(&self) -> String {
        format!(
            "{},{}",
            format_degrees(self.center.longitude),
            format_degrees(self.center.latitude)
        )
    }

    /// Value of the `filter` query parameter.
    pub fn filter(&self) -> String {
        format!("circle:{},{}", self.geofence_center(), self.radius_m)
    }

    /// Query parameters in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("categories", self.category.clone()),
            ("filter", self.filter()),
            ("limit", self.limit.to_string()),
            ("apiKey", self.api_key.expose().to_string()),
        ]
    }

    /// Full request URL for `endpoint`.
    pub fn to_url(&self, endpoint: &str) -> Result<Url> {
        Url::parse_with_params(endpoint, self.params())
            .with_context(|| format!("invalid places endpoint '{endpoint}'"))
    }
}

/// Issues places searches.
#[async_trait]
pub trait PlacesTransport: Send + Sync {
    async fn search(&self, query: &PlacesQuery) -> Result<PlacesResponse>;
}

/// HTTP transport backed by a blocking `ureq` agent.
#[derive(Clone)]
pub struct GeoapifyClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl GeoapifyClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: http_agent(timeout),
            endpoint: endpoint.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_agent(agent: ureq::Agent, endpoint: impl Into<String>) -> Self {
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    fn search_blocking(&self, url: Url) -> Result<PlacesResponse> {
        let mut response = self.agent.get(url.as_str()).call()?;
        let body = response
            .body_mut()
            .read_json::<PlacesResponse>()
            .context("malformed places response")?;
        Ok(body)
    }
}

#[async_trait]
impl PlacesTransport for GeoapifyClient {
    async fn search(&self, query: &PlacesQuery) -> Result<PlacesResponse> {
        let url = query.to_url(&self.endpoint)?;
        log::debug!(
            "GET {} filter={} limit={}",
            self.endpoint,
            query.filter(),
            query.limit
        );
        let this = self.clone();
        spawn_blocking_task(move || this.search_blocking(url))
            .await
            .context("places request task failed")?
    }
}
