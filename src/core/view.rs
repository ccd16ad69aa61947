//! Pure rendering of [`PanelState`] into lines.
//!
//! The terminal UI styles these lines and the one-shot mode prints them, so
//! both front ends show the same layering: heading, loading indicator, error,
//! then either the list or the empty-state message.

use std::fmt;

use crate::core::state::PanelState;

pub const HEADING: &str = "Nearby Renewable Energy Resources";
pub const LOADING_TEXT: &str = "Loading nearby resources...";
pub const EMPTY_TEXT: &str = "No resources found nearby.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewLine {
    Heading,
    Loading,
    Error(String),
    /// 1-based position in the list.
    Place {
        index: usize,
        name: String,
        formatted: String,
    },
    Empty,
}

impl fmt::Display for ViewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewLine::Heading => f.write_str(HEADING),
            ViewLine::Loading => f.write_str(LOADING_TEXT),
            ViewLine::Error(message) => write!(f, "Error: {message}"),
            ViewLine::Place {
                index,
                name,
                formatted,
            } => write!(f, "{index}. {name} — {formatted}"),
            ViewLine::Empty => f.write_str(EMPTY_TEXT),
        }
    }
}

pub fn render(state: &PanelState) -> Vec<ViewLine> {
    let mut lines = vec![ViewLine::Heading];
    if state.loading {
        lines.push(ViewLine::Loading);
    }
    if let Some(err) = &state.error {
        lines.push(ViewLine::Error(err.to_string()));
    }
    if state.places.is_empty() {
        lines.push(ViewLine::Empty);
    } else {
        lines.extend(
            state
                .places
                .iter()
                .enumerate()
                .map(|(i, place)| ViewLine::Place {
                    index: i + 1,
                    name: place.name.clone(),
                    formatted: place.formatted.clone(),
                }),
        );
    }
    lines
}

/// Plain-text form, one line per [`ViewLine`].
pub fn render_text(state: &PanelState) -> String {
    render(state)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::places::Place, core::error::PanelError};

    fn place(name: &str, formatted: &str) -> Place {
        Place {
            name: name.to_string(),
            formatted: formatted.to_string(),
        }
    }

    #[test]
    fn test_mount_state_shows_loading_and_empty() {
        let lines = render(&PanelState::default());
        assert_eq!(
            lines,
            vec![ViewLine::Heading, ViewLine::Loading, ViewLine::Empty]
        );
    }

    #[test]
    fn test_error_layered_above_list() {
        let state = PanelState {
            coordinates: None,
            places: vec![place("Mall A", "123 Main St")],
            loading: true,
            error: Some(PanelError::FetchFailed("timeout".to_string())),
        };
        assert_eq!(
            render_text(&state),
            "Nearby Renewable Energy Resources\n\
             Loading nearby resources...\n\
             Error: Failed to fetch nearby resources: timeout\n\
             1. Mall A — 123 Main St"
        );
    }

    #[test]
    fn test_list_keeps_order() {
        let state = PanelState {
            coordinates: None,
            places: vec![place("B", "2"), place("A", "1"), place("C", "3")],
            loading: false,
            error: None,
        };
        let names: Vec<String> = render(&state)
            .into_iter()
            .filter_map(|line| match line {
                ViewLine::Place { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let state = PanelState {
            coordinates: None,
            places: vec![place("X", "x st"), place("Y", "y st")],
            loading: false,
            error: None,
        };
        assert_eq!(render(&state), render(&state));
        assert_eq!(render_text(&state), render_text(&state));
    }

    #[test]
    fn test_error_without_places() {
        let mut state = PanelState::default();
        state.fail(PanelError::GeolocationUnavailable);
        assert_eq!(
            render_text(&state),
            "Nearby Renewable Energy Resources\n\
             Error: Geolocation is not supported by this browser.\n\
             No resources found nearby."
        );
    }
}
