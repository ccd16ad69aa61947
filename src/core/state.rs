use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::{
    api::{location::Coordinates, places::Place},
    core::error::PanelError,
};

/// Everything the renderer looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub coordinates: Option<Coordinates>,
    pub places: Vec<Place>,
    pub loading: bool,
    pub error: Option<PanelError>,
}

impl Default for PanelState {
    /// State at mount: loading, no error, no places.
    fn default() -> Self {
        Self {
            coordinates: None,
            places: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl PanelState {
    /// Record a terminal failure and stop the loading indicator.
    pub fn fail(&mut self, error: PanelError) {
        self.error = Some(error);
        self.loading = false;
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "coordinates": self.coordinates,
            "loading": self.loading,
            "error": self.error.as_ref().map(|err| serde_json::json!({
                "kind": err.kind(),
                "message": err.to_string(),
            })),
            "places": self.places,
        })
    }
}

struct Inner {
    mounted: bool,
    state: PanelState,
}

/// Shared panel state.
///
/// Writes only land while the panel is mounted; the mounted flag lives under
/// the same lock as the state so an unmount cannot interleave with a write.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<RwLock<Inner>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(PanelState::default())
    }
}

impl SharedState {
    pub fn new(state: PanelState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                mounted: true,
                state,
            })),
        }
    }

    /// Read accessor. The closure result is returned as-is.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&PanelState) -> R,
    {
        let guard = self.inner.read();
        f(&guard.state)
    }

    pub fn snapshot(&self) -> PanelState {
        self.read(|state| state.clone())
    }

    /// Write accessor. Fails without running `f` once the panel is unmounted.
    pub fn write<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut PanelState) -> R,
    {
        let mut guard = self.inner.write();
        if !guard.mounted {
            return Err(anyhow!("panel is unmounted"));
        }
        Ok(f(&mut guard.state))
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.read().mounted
    }

    /// Stop accepting writes. Idempotent.
    pub fn unmount(&self) {
        self.inner.write().mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PanelState::default();
        assert!(state.loading);
        assert!(state.error.is_none());
        assert!(state.places.is_empty());
        assert!(state.coordinates.is_none());
    }

    #[test]
    fn test_fail_stops_loading() {
        let mut state = PanelState::default();
        state.fail(PanelError::ConfigurationMissing);
        assert!(!state.loading);
        assert_eq!(state.error, Some(PanelError::ConfigurationMissing));
    }

    #[test]
    fn test_writes_rejected_after_unmount() {
        let shared = SharedState::default();
        shared
            .write(|state| state.loading = false)
            .expect("mounted panel accepts writes");
        shared.unmount();
        assert!(!shared.is_mounted());
        assert!(shared.write(|state| state.loading = true).is_err());
        assert!(!shared.snapshot().loading);
    }

    #[test]
    fn test_json_shape() {
        let mut state = PanelState::default();
        state.fail(PanelError::FetchFailed("boom".to_string()));
        let json = state.to_json();
        assert_eq!(json["loading"], false);
        assert_eq!(json["error"]["kind"], "fetch_failed");
        assert_eq!(
            json["error"]["message"],
            "Failed to fetch nearby resources: boom"
        );
        assert!(json["places"].as_array().is_some_and(|p| p.is_empty()));
        assert!(json["coordinates"].is_null());
    }
}
