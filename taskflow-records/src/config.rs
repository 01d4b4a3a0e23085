//! Record server settings.
//!
//! Each setting is taken from the first source that provides it: a command
//! line flag, its `TASKFLOW_*` environment variable, the `[server]` table of
//! `taskflow-records/config.toml` under the user config directory, and
//! finally [`RecordsConfig::default`]. The log level has no file entry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::store::DEFAULT_OWNER;

/// Address the server binds when nothing else is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Why the settings file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists (or was named explicitly) but could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        /// File that was read.
        path: PathBuf,
        /// I/O failure.
        source: std::io::Error,
    },

    /// The file is not valid TOML for the `[server]` table.
    #[error("invalid settings file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

/// Contents of the settings file. Absent keys leave the value to the
/// defaults.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SettingsFile {
    server: ServerTable,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerTable {
    bind_addr: Option<String>,
    owner: Option<String>,
    project_id: Option<String>,
    public_key: Option<String>,
}

impl SettingsFile {
    /// Reads an explicitly named file, which must exist.
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Reads the per-user file if there is one.
    fn read_default() -> Result<Self, ConfigError> {
        let Some(path) = default_settings_path() else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::ReadFile { path, source }),
        }
    }
}

/// `<config dir>/taskflow-records/config.toml`, when the platform has a
/// config directory.
#[must_use]
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskflow-records").join("config.toml"))
}

/// Command line of the `taskflow-records` binary.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "TaskFlow record server")]
pub struct RecordsCliArgs {
    /// Socket address to listen on.
    #[arg(short, long, env = "TASKFLOW_RECORDS_ADDR")]
    pub bind: Option<String>,

    /// Settings file to use instead of the per-user one.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Value stamped into `Owner` and `CreatedBy` of new records.
    #[arg(long)]
    pub owner: Option<String>,

    /// Require this `x-project-id` header on every request.
    #[arg(long, env = "TASKFLOW_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Require this `x-public-key` header on every request.
    #[arg(long, env = "TASKFLOW_PUBLIC_KEY")]
    pub public_key: Option<String>,

    /// `tracing` filter directive, e.g. `info` or `taskflow_records=debug`.
    #[arg(long, default_value = "info", env = "TASKFLOW_RECORDS_LOG")]
    pub log_level: String,
}

/// Settings the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsConfig {
    /// Socket address to listen on.
    pub bind_addr: String,
    /// Owner stamped on new records.
    pub owner: String,
    /// Project id clients must send, if any.
    pub project_id: Option<String>,
    /// Public key clients must send, if any.
    pub public_key: Option<String>,
    /// `tracing` filter directive.
    pub log_level: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            project_id: None,
            public_key: None,
            log_level: "info".to_string(),
        }
    }
}

impl RecordsConfig {
    /// Builds the settings from the command line and the settings file.
    ///
    /// # Errors
    ///
    /// Fails if `--config` names a file that cannot be read, or if the file
    /// in use is not valid TOML. A missing per-user file is not an error.
    pub fn load(cli: &RecordsCliArgs) -> Result<Self, ConfigError> {
        let file = match cli.config.as_deref() {
            Some(path) => SettingsFile::read(path)?,
            None => SettingsFile::read_default()?,
        };
        Ok(Self::merge(cli, file.server))
    }

    fn merge(cli: &RecordsCliArgs, table: ServerTable) -> Self {
        let pick = |flag: &Option<String>, file: Option<String>| flag.clone().or(file);
        let defaults = Self::default();
        Self {
            bind_addr: pick(&cli.bind, table.bind_addr).unwrap_or(defaults.bind_addr),
            owner: pick(&cli.owner, table.owner).unwrap_or(defaults.owner),
            project_id: pick(&cli.project_id, table.project_id),
            public_key: pick(&cli.public_key, table.public_key),
            log_level: cli.log_level.clone(),
        }
    }

    /// Whether clients must present credentials.
    #[must_use]
    pub const fn requires_credentials(&self) -> bool {
        self.project_id.is_some() || self.public_key.is_some()
    }
}
