/// Core runtime of the nearby panel
///
/// A mounted [`Panel`] owns two tasks:
/// - the location acquirer, which asks the provider once and publishes the
///   coordinates on the bus
/// - the resource fetcher, which serves coordinate events one at a time and
///   coalesces events that queue up while a request is in flight, so at
///   most one request is outstanding and the newest position is fetched last
///
/// Both tasks write through [`SharedState`], which rejects writes after
/// unmount, and wake the front end over the `CoreToUi` channel.
use anyhow::Result;
use flume::Receiver;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::{
    bus::{recv_latest, Bus, CoreToUi, LocationEvent},
    config::{ApiKey, PlacesConfig},
    error::PanelError,
    state::{PanelState, SharedState},
    task_manager::{abort_all, spawn_task},
};
use crate::api::{
    location::{Coordinates, LocationProvider},
    places::{PlacesQuery, PlacesTransport},
};

/// Query parameters fixed at mount time.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub api_key: Option<ApiKey>,
    pub category: String,
    pub radius_m: u32,
    pub limit: u32,
}

impl From<&PlacesConfig> for FetchSettings {
    fn from(config: &PlacesConfig) -> Self {
        Self {
            api_key: config.api_key(),
            category: config.category.clone(),
            radius_m: config.radius_m,
            limit: config.limit,
        }
    }
}

impl FetchSettings {
    fn query(&self, center: Coordinates, api_key: ApiKey) -> PlacesQuery {
        PlacesQuery {
            center,
            category: self.category.clone(),
            radius_m: self.radius_m,
            limit: self.limit,
            api_key,
        }
    }
}

/// Store new coordinates and tell the fetcher. No-op when unchanged.
///
/// Loading is raised here so the flag already covers the queued fetch.
fn publish_coordinates(state: &SharedState, bus: &Bus, coords: Coordinates) -> Result<()> {
    let changed = state.write(|s| {
        if s.coordinates == Some(coords) {
            return false;
        }
        s.coordinates = Some(coords);
        s.loading = true;
        true
    })?;
    if changed {
        log::info!(
            "Location acquired: lat={} lon={}",
            coords.latitude,
            coords.longitude
        );
        bus.location_tx
            .send(LocationEvent::CoordinatesChanged(coords))
            .map_err(|err| anyhow::anyhow!("fetcher is gone: {err}"))?;
        bus.notify(CoreToUi::Changed);
    }
    Ok(())
}

async fn acquire_location(provider: Arc<dyn LocationProvider>, state: SharedState, bus: Bus) {
    log::info!("Requesting current position");
    let outcome = match provider.current_position().await {
        Ok(coords) => publish_coordinates(&state, &bus, coords),
        Err(err) => {
            log::warn!("{err}");
            state.write(|s| s.fail(err))
        }
    };
    if let Err(err) = outcome {
        log::debug!("Location result dropped: {err}");
        return;
    }
    bus.notify(CoreToUi::Changed);
}

struct ResourceFetcher {
    state: SharedState,
    bus: Bus,
    transport: Arc<dyn PlacesTransport>,
    settings: FetchSettings,
}

impl ResourceFetcher {
    async fn run(self, rx: Receiver<LocationEvent>) {
        while let Some(LocationEvent::CoordinatesChanged(center)) = recv_latest(&rx).await {
            if let Err(err) = self.fetch(center).await {
                log::debug!("Fetcher stopping: {err}");
                break;
            }
        }
    }

    /// One fetch cycle. Errors only when the panel went away.
    async fn fetch(&self, center: Coordinates) -> Result<()> {
        self.state.write(|s| {
            s.loading = true;
            s.error = None;
        })?;
        self.bus.notify(CoreToUi::Changed);

        let Some(api_key) = self.settings.api_key.clone() else {
            log::warn!("No places API key configured, not fetching");
            self.state.write(|s| s.fail(PanelError::ConfigurationMissing))?;
            self.bus.notify(CoreToUi::Changed);
            return Ok(());
        };

        let query = self.settings.query(center, api_key);
        log::info!("Fetching places, filter={}", query.filter());
        let outcome = self.transport.search(&query).await;

        self.state.write(|s| {
            // A newer position is queued; its fetch will settle the flags.
            let superseded = s.coordinates != Some(center);
            match outcome {
                Ok(response) if superseded => {
                    log::debug!(
                        "Dropping {} results for superseded position",
                        response.features.len()
                    );
                }
                Ok(response) => {
                    s.places = response.into_places();
                    s.loading = false;
                    log::info!("Fetched {} places", s.places.len());
                }
                Err(err) if superseded => {
                    log::debug!("Dropping fetch error for superseded position: {err:#}");
                }
                Err(err) => {
                    log::error!("Failed to fetch nearby resources: {err:?}");
                    s.fail(PanelError::FetchFailed(format!("{err:#}")));
                }
            }
        })?;
        self.bus.notify(CoreToUi::Changed);
        Ok(())
    }
}

/// A mounted panel.
///
/// Must be created inside a tokio runtime. Dropping it unmounts: pending
/// completions are discarded and the tasks are aborted.
pub struct Panel {
    state: SharedState,
    bus: Bus,
    core_rx: Receiver<CoreToUi>,
    tasks: Vec<JoinHandle<()>>,
}

impl Panel {
    pub fn mount(
        config: &PlacesConfig,
        provider: Arc<dyn LocationProvider>,
        transport: Arc<dyn PlacesTransport>,
    ) -> Self {
        let state = SharedState::default();
        let (location_tx, location_rx) = flume::unbounded::<LocationEvent>();
        let (core_tx, core_rx) = flume::unbounded::<CoreToUi>();
        let bus = Bus::new(location_tx, core_tx);

        let settings = FetchSettings::from(config);
        if settings.api_key.is_none() {
            log::warn!("Places API key is not configured");
        }

        let fetcher = ResourceFetcher {
            state: state.clone(),
            bus: bus.clone(),
            transport,
            settings,
        };
        let tasks = vec![
            spawn_task(fetcher.run(location_rx)),
            spawn_task(acquire_location(provider, state.clone(), bus.clone())),
        ];
        log::info!("Panel mounted");

        Self {
            state,
            bus,
            core_rx,
            tasks,
        }
    }

    pub fn snapshot(&self) -> PanelState {
        self.state.snapshot()
    }

    /// Handle for observers that outlive a borrow of the panel (the UI thread).
    pub fn state_handle(&self) -> SharedState {
        self.state.clone()
    }

    /// Wake-up channel; every state change sends at least one message.
    pub fn updates(&self) -> Receiver<CoreToUi> {
        self.core_rx.clone()
    }

    /// Feed a new position, as a position watch would.
    pub fn push_coordinates(&self, coords: Coordinates) -> Result<()> {
        publish_coordinates(&self.state, &self.bus, coords)
    }

    /// Wait until nothing is loading and return that state.
    pub async fn wait_settled(&self) -> PanelState {
        loop {
            let snapshot = self.state.snapshot();
            if !snapshot.loading {
                return snapshot;
            }
            if self.core_rx.recv_async().await.is_err() {
                return self.state.snapshot();
            }
        }
    }

    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.state.unmount();
        abort_all(&mut self.tasks);
        log::info!("Panel unmounted");
    }
}
