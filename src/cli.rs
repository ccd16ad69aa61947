use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::core::config::{LocationSource, NearbyConfig};

pub fn build_command() -> Command {
    Command::new("nearby")
        .about("List places near your current position")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .value_name("KEY")
                .help("Places API key (overrides GEOAPIFY_API_KEY)"),
        )
        .arg(
            Arg::new("lat")
                .long("lat")
                .value_name("DEG")
                .help("Latitude of the current position")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .requires("lon"),
        )
        .arg(
            Arg::new("lon")
                .long("lon")
                .value_name("DEG")
                .help("Longitude of the current position")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .requires("lat"),
        )
        .arg(
            Arg::new("locate")
                .long("locate")
                .value_name("SOURCE")
                .help("Where the position comes from: fixed, ip or none")
                .value_parser(["fixed", "ip", "none"]),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Print the settled panel once instead of opening the TUI")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("With --once, print the settled state as JSON")
                .action(ArgAction::SetTrue),
        )
}

/// Parse the process arguments.
pub fn parse_args() -> ArgMatches {
    build_command().get_matches()
}

/// Overlay command line flags on `config`.
pub fn apply_overrides(config: &mut NearbyConfig, matches: &ArgMatches) -> Result<()> {
    if let Some(key) = matches.get_one::<String>("api-key") {
        config.places.api_key = Some(key.clone());
    }
    if let (Some(lat), Some(lon)) = (
        matches.get_one::<f64>("lat").copied(),
        matches.get_one::<f64>("lon").copied(),
    ) {
        config.location.latitude = Some(lat);
        config.location.longitude = Some(lon);
    }
    if let Some(source) = matches.get_one::<String>("locate") {
        config.location.provider = Some(source.parse::<LocationSource>()?);
    }
    Ok(())
}

/// Defaults, then the config file, then the environment, then flags.
pub fn load_config(matches: &ArgMatches) -> Result<NearbyConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            NearbyConfig::load(path)?
        }
        None => NearbyConfig::default(),
    };
    config.apply_env();
    apply_overrides(&mut config, matches)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::location::Coordinates;

    fn matches(args: &[&str]) -> ArgMatches {
        build_command()
            .try_get_matches_from(args)
            .expect("arguments should parse")
    }

    #[test]
    fn test_coordinates_flags() -> Result<()> {
        let m = matches(&["nearby", "--lat", "40.0", "--lon", "-75.0"]);
        let mut config = NearbyConfig::default();
        apply_overrides(&mut config, &m)?;
        assert_eq!(
            config.location.coordinates(),
            Some(Coordinates::new(40.0, -75.0))
        );
        assert_eq!(config.location.source(), LocationSource::Fixed);
        Ok(())
    }

    #[test]
    fn test_api_key_flag_wins() -> Result<()> {
        let m = matches(&["nearby", "--api-key", "cli-key"]);
        let mut config = NearbyConfig::default();
        config.places.api_key = Some("file-key".to_string());
        apply_overrides(&mut config, &m)?;
        assert_eq!(config.places.api_key.as_deref(), Some("cli-key"));
        Ok(())
    }

    #[test]
    fn test_locate_flag() -> Result<()> {
        let m = matches(&["nearby", "--locate", "ip", "--once", "--json"]);
        let mut config = NearbyConfig::default();
        apply_overrides(&mut config, &m)?;
        assert_eq!(config.location.source(), LocationSource::Ip);
        assert!(m.get_flag("once"));
        assert!(m.get_flag("json"));
        Ok(())
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(build_command()
            .try_get_matches_from(["nearby", "--lat", "1.0"])
            .is_err());
    }

    #[test]
    fn test_unknown_locate_rejected() {
        assert!(build_command()
            .try_get_matches_from(["nearby", "--locate", "gps"])
            .is_err());
    }
}
