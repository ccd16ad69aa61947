use derive_more::Display;

/// User-visible failure of the panel.
///
/// Every variant is terminal for the operation that produced it. The panel
/// stores it in its state and the renderer prints the `Display` text; it is
/// never propagated to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PanelError {
    /// No location provider is configured.
    #[display("Geolocation is not supported by this browser.")]
    GeolocationUnavailable,
    /// The provider was asked but could not produce a position.
    #[display("Geolocation error: {_0}")]
    GeolocationFailed(String),
    /// No usable places API key.
    #[display("Please set the GEOAPIFY_API_KEY environment variable.")]
    ConfigurationMissing,
    /// Network, HTTP status or response decoding failure.
    #[display("Failed to fetch nearby resources: {_0}")]
    FetchFailed(String),
}

impl std::error::Error for PanelError {}

impl PanelError {
    /// Short machine-friendly name, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            PanelError::GeolocationUnavailable => "geolocation_unavailable",
            PanelError::GeolocationFailed(_) => "geolocation_failed",
            PanelError::ConfigurationMissing => "configuration_missing",
            PanelError::FetchFailed(_) => "fetch_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_texts() {
        assert_eq!(
            PanelError::GeolocationUnavailable.to_string(),
            "Geolocation is not supported by this browser."
        );
        assert_eq!(
            PanelError::GeolocationFailed("User denied Geolocation".to_string()).to_string(),
            "Geolocation error: User denied Geolocation"
        );
        assert_eq!(
            PanelError::ConfigurationMissing.to_string(),
            "Please set the GEOAPIFY_API_KEY environment variable."
        );
        assert_eq!(
            PanelError::FetchFailed("connection refused".to_string()).to_string(),
            "Failed to fetch nearby resources: connection refused"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(PanelError::ConfigurationMissing.kind(), "configuration_missing");
        assert_eq!(PanelError::FetchFailed(String::new()).kind(), "fetch_failed");
    }
}
