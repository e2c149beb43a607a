use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};

use crate::models::{EmployeeFilter, FilterState, InvalidRowPolicy, LeaveTypeSelection};

/// File name reported when no `--data-file` is given and nothing is found.
pub const DEFAULT_DATA_FILE: &str = "employee_leave_2025.xlsx";

/// Names looked up, in order, when no `--data-file` is given.
pub const DEFAULT_DATA_FILES: [&str; 2] = [DEFAULT_DATA_FILE, "employee_leave_2025.csv"];

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Leave trend analysis by month and type
#[derive(Parser, Debug, Clone)]
#[command(
    name = "leave-dashboard",
    about = "Leave trend analysis by month and type",
    version
)]
pub struct Settings {
    /// Leave applications workbook or CSV (Employee_Name, Start_Date, End_Date, Reason)
    #[arg(long, env = "LEAVE_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "report", "json"])]
    pub view: String,

    /// Initial employee filter ("All" for everyone)
    #[arg(long, default_value = "All")]
    pub employee: String,

    /// Initial leave type filter; repeat to select several (default: all)
    #[arg(long = "leave-type")]
    pub leave_types: Vec<String>,

    /// Number of employees in the most / least leave rankings
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=50))]
    pub top_n: u32,

    /// What to do with rows that fail validation
    #[arg(long, default_value = "skip", value_parser = ["skip", "abort"])]
    pub on_invalid_row: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.leave-dashboard/last_used.json`.
///
/// Filters and the data file are not persisted: every run starts from the
/// command-line selection and its own data-file discovery.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_invalid_row: Option<String>,
}

impl LastUsedParams {
    /// Default location: `~/.leave-dashboard/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".leave-dashboard").join("last_used.json")
    }

    /// Load from an explicit path, returning `Default` when the file is absent
    /// or unparseable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, merge with last-used params where no
    /// explicit CLI value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("could not clear {}: {}", config_path.display(), e);
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path);

        // Explicit CLI values always win over persisted ones.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top_n") {
            if let Some(v) = last.top_n {
                settings.top_n = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "on_invalid_row") {
            if let Some(v) = last.on_invalid_row {
                settings.on_invalid_row = v;
            }
        }

        let settings = settings.apply_debug();

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::warn!("could not persist settings: {}", e);
        }

        settings
    }

    /// Filter selected on the command line.
    pub fn filter_state(&self) -> FilterState {
        let leave_types = if self.leave_types.is_empty() {
            LeaveTypeSelection::All
        } else {
            LeaveTypeSelection::Only(self.leave_types.iter().cloned().collect::<BTreeSet<_>>())
        };
        FilterState {
            employee: EmployeeFilter::from_selection(&self.employee),
            leave_types,
        }
    }

    pub fn invalid_row_policy(&self) -> InvalidRowPolicy {
        InvalidRowPolicy::from_name(&self.on_invalid_row)
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
            top_n: Some(s.top_n),
            on_invalid_row: Some(s.on_invalid_row.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
