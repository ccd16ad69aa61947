use anyhow::{anyhow, Result};
use chrono::Local;
use log::LevelFilter;
use std::{
    future::Future,
    io::{self, Write},
    time::Duration,
};

use clap::ArgMatches;
use env_logger::{Builder, Target};

use crate::{
    api::places::GeoapifyClient,
    cli,
    core::{runtime::Panel, task_manager::spawn_blocking_task, view},
};

/// Logging setup shared by every entrypoint.
///
/// `NEARBY_LOG_FILE` (or a timestamped file in debug builds) sends logs to a
/// file. Without a file, the interactive TUI runs with logging off so stderr
/// never scribbles over the screen.
pub fn init_common(interactive: bool) {
    let log_file = std::env::var("NEARBY_LOG_FILE").ok().or_else(|| {
        #[cfg(debug_assertions)]
        {
            Some(format!("./log_{}.log", Local::now().format("%Y%m%d%H%M%S")))
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    });

    if let Some(path) = log_file {
        if let Err(err) = init_file_logger(&path) {
            eprintln!("Failed to initialize file logger at '{path}': {err}");
            env_logger::init();
        }
    } else if interactive {
        Builder::new().filter_level(LevelFilter::Off).init();
    } else {
        env_logger::init();
    }
}

/// Whether the arguments select the interactive TUI.
pub fn is_interactive(matches: &ArgMatches) -> bool {
    !(matches.get_flag("once") || matches.get_flag("json"))
}

fn init_file_logger(path: &str) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    log::info!("File logger initialized at {path}");

    Ok(())
}

/// How long shutdown waits for blocking HTTP calls still in flight.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Drive `future` on a fresh multi-threaded runtime.
///
/// Shutdown does not wait for blocking tasks past [`SHUTDOWN_GRACE`], so
/// quitting never hangs on an outstanding request.
pub fn block_on<F>(future: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to create tokio runtime: {e}"))?;
    let result = runtime.block_on(future);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

/// Mount the panel per the parsed arguments and drive the chosen front end.
pub async fn run(matches: &ArgMatches) -> Result<()> {
    let config = cli::load_config(matches)?;
    let provider = config.location.provider();
    let transport = GeoapifyClient::new(config.places.endpoint.clone(), config.places.timeout());
    let panel = Panel::mount(&config.places, provider, std::sync::Arc::new(transport));

    if !is_interactive(matches) {
        let state = panel.wait_settled().await;
        let mut stdout = io::stdout();
        if matches.get_flag("json") {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&state.to_json())?)?;
        } else {
            writeln!(stdout, "{}", view::render_text(&state))?;
        }
        panel.unmount();
        return Ok(());
    }

    let state = panel.state_handle();
    let updates = panel.updates();
    let result = spawn_blocking_task(move || crate::tui::start(state, updates)).await?;
    panel.unmount();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_block_on_does_not_wait_for_blocking_work() -> Result<()> {
        let started = Instant::now();
        block_on(async {
            drop(spawn_blocking_task(|| {
                std::thread::sleep(Duration::from_secs(10));
            }));
            Ok(())
        })?;
        assert!(started.elapsed() < Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn test_block_on_returns_future_error() {
        let err = block_on(async { Err(anyhow!("boom")) }).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
