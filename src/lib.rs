//! Nearby: a terminal panel listing places around your current position
//!
//! The panel acquires a position once, queries the Geoapify places API for
//! shopping venues within 10 km and renders the result list. The `core`
//! module holds the UI-independent state machine; `api` holds the location
//! providers and the places client; `tui` is the ratatui front end.

pub mod api;
#[doc(hidden)]
pub mod boot;
pub mod cli;
pub mod core;
#[doc(hidden)]
pub mod tui;

pub use api::*;
pub use crate::core::{NearbyConfig, Panel, PanelError, PanelState};
