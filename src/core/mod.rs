/// Core panel logic
///
/// This module contains the UI-independent parts of the panel:
/// - Message bus between the panel tasks and the front end
/// - Configuration and API key validation
/// - Panel state with the unmount guard
/// - The runtime that sequences location acquisition and the places fetch
/// - The pure view renderer
///
/// The terminal UI and the one-shot printer both sit on top of this.
pub mod bus;
pub mod config;
pub mod error;
pub mod runtime;
pub mod state;
pub mod task_manager;
pub mod view;

pub use bus::{CoreToUi, LocationEvent};
pub use config::{ApiKey, NearbyConfig};
pub use error::PanelError;
pub use runtime::Panel;
pub use state::{PanelState, SharedState};
