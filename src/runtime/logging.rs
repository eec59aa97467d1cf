use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::xdg_dir;

const LOG_ENV: &str = "PLAYDECK_LOG";
const DEFAULT_FILTER: &str = "playdeck=info";

/// `$XDG_STATE_HOME/playdeck` or `~/.local/state/playdeck`.
fn log_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("playdeck"))
}

/// Route `tracing` output to a log file; the terminal belongs to the TUI.
///
/// Returns the writer guard, which must live until shutdown so buffered
/// lines get flushed. `None` means logging is off.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("playdeck: logging disabled, cannot create {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(&dir, "playdeck.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(filter)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("playdeck: logging disabled: {e}");
        return None;
    }

    Some(guard)
}
