use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use leave_core::settings::{DEFAULT_DATA_FILE, DEFAULT_DATA_FILES};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Per-user directory holding persisted settings, logs and an optional copy
/// of the data file.
pub const APP_DIR: &str = ".leave-dashboard";

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.leave-dashboard/` and `~/.leave-dashboard/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map `DEBUG/INFO/WARNING/ERROR/CRITICAL` onto a tracing filter directive.
fn level_directive(log_level: &str) -> String {
    let upper = log_level.to_uppercase();
    match upper.as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, output is appended to that file without ANSI colours
/// so it does not fight the dashboard for the terminal. Otherwise it goes to
/// stderr.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Pick the leave file to load.
///
/// An explicit path always wins, existing or not, so a typo surfaces as a
/// missing-file error. Otherwise each of [`DEFAULT_DATA_FILES`] (workbook
/// first) is looked up in `cwd` and then in `~/.leave-dashboard/`; when none
/// exists the bare [`DEFAULT_DATA_FILE`] is returned and the loader reports it
/// missing.
pub fn resolve_data_path_in(explicit: Option<&Path>, cwd: &Path, app_dir: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    [cwd, app_dir]
        .into_iter()
        .flat_map(|dir| DEFAULT_DATA_FILES.iter().map(move |name| dir.join(name)))
        .find(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

pub fn resolve_data_path(explicit: Option<&Path>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_data_path_in(explicit, &cwd, &app_dir())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
