//! Configuration system for the `TaskFlow` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskflow/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};

use crate::app::{DEFAULT_DATE_FORMAT, DEFAULT_MAX_TITLE_LEN};
use crate::sync::DEFAULT_CHANNEL_CAPACITY;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    service: ServiceFileConfig,
    ui: UiFileConfig,
    preferences: PreferencesFileConfig,
}

/// `[service]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServiceFileConfig {
    url: Option<String>,
    project_id: Option<String>,
    public_key: Option<String>,
    request_timeout_secs: Option<u64>,
    channel_capacity: Option<usize>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    max_task_title_len: Option<usize>,
    date_format: Option<String>,
}

/// `[preferences]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct PreferencesFileConfig {
    path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Service --
    /// Base URL of the record service; `None` runs against in-process
    /// demo tables.
    pub service_url: Option<String>,
    /// Project identifier sent with every request.
    pub project_id: Option<String>,
    /// Public key sent with every request.
    pub public_key: Option<String>,
    /// Timeout for a single service request.
    pub request_timeout: Duration,
    /// Capacity of the sync command/event channels.
    pub channel_capacity: usize,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Maximum task title length in characters.
    pub max_task_title_len: usize,
    /// Due date display format (chrono).
    pub date_format: String,

    // -- Preferences --
    /// Preferences file; `None` uses the platform default.
    pub preferences_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            project_id: None,
            public_key: None,
            request_timeout: Duration::from_secs(15),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            poll_timeout: Duration::from_millis(50),
            max_task_title_len: DEFAULT_MAX_TITLE_LEN,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            preferences_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/taskflow/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        let date_format = cli
            .date_format
            .clone()
            .or_else(|| file.ui.date_format.clone())
            .filter(|f| {
                let valid = is_valid_date_format(f);
                if !valid {
                    tracing::warn!(format = %f, "ignoring invalid date format");
                }
                valid
            })
            .unwrap_or(defaults.date_format);

        Self {
            service_url: cli.url.clone().or_else(|| file.service.url.clone()),
            project_id: cli
                .project_id
                .clone()
                .or_else(|| file.service.project_id.clone()),
            public_key: cli
                .public_key
                .clone()
                .or_else(|| file.service.public_key.clone()),
            request_timeout: cli
                .request_timeout_secs
                .or(file.service.request_timeout_secs)
                .map_or(defaults.request_timeout, Duration::from_secs),
            channel_capacity: file
                .service
                .channel_capacity
                .filter(|c| *c > 0)
                .unwrap_or(defaults.channel_capacity),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            max_task_title_len: file
                .ui
                .max_task_title_len
                .unwrap_or(defaults.max_task_title_len),
            date_format,
            preferences_path: cli
                .preferences
                .clone()
                .or_else(|| file.preferences.path.clone()),
        }
    }
}

fn is_valid_date_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal task board backed by a hosted record service")]
pub struct CliArgs {
    /// Base URL of the record service (omit for offline demo data).
    #[arg(long, env = "TASKFLOW_URL")]
    pub url: Option<String>,

    /// Project identifier sent as `x-project-id`.
    #[arg(long, env = "TASKFLOW_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Public key sent as `x-public-key`.
    #[arg(long, env = "TASKFLOW_PUBLIC_KEY")]
    pub public_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Path to config file (default: `~/.config/taskflow/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the preferences file.
    #[arg(long)]
    pub preferences: Option<PathBuf>,

    /// Due date display format (chrono format string).
    #[arg(long)]
    pub date_format: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKFLOW_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskflow.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskflow").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
