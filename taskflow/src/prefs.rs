//! Persisted user preferences.
//!
//! Only the theme is persisted: `dark_mode = true|false` in
//! `<config_dir>/taskflow/preferences.toml`. When the file or the key is
//! absent, the terminal's colour scheme (`COLORFGBG`) decides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors reading or writing the preferences file.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    /// The file exists but could not be read or written.
    #[error("failed to access preferences file {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML.
    #[error("failed to parse preferences: {0}")]
    Parse(#[from] toml::de::Error),

    /// The preferences could not be serialized.
    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Contents of the preferences file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Dark (`true`) or light (`false`) theme; unset falls back to the
    /// environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

/// Default preferences location, if a config directory exists.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskflow").join("preferences.toml"))
}

/// Whether `COLORFGBG` describes a dark background.
///
/// The variable looks like `fg;bg` (sometimes `fg;default;bg`); the last
/// field is the background colour index. Indices 7 and 15 are light; any
/// other recognised index, and an unset or unparseable value, mean dark.
#[must_use]
pub fn prefers_dark(colorfgbg: Option<&str>) -> bool {
    let Some(bg) = colorfgbg
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
    else {
        return true;
    };
    !matches!(bg, 7 | 15)
}

/// Reads and writes the preferences file.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the preferences. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Preferences, PrefsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(source) => Err(PrefsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes the preferences, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file cannot be written.
    pub fn save(&self, prefs: &Preferences) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string(prefs)?;
        std::fs::write(&self.path, contents).map_err(io_err)
    }

    /// Resolves the theme: the saved value, else the environment.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file exists but cannot be read or parsed.
    pub fn dark_mode(&self) -> Result<bool, PrefsError> {
        let env = std::env::var("COLORFGBG").ok();
        Ok(self
            .load()?
            .dark_mode
            .unwrap_or_else(|| prefers_dark(env.as_deref())))
    }

    /// Persists the theme, keeping any other preferences.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the file cannot be read or written.
    pub fn set_dark_mode(&self, dark: bool) -> Result<(), PrefsError> {
        let mut prefs = self.load()?;
        prefs.dark_mode = Some(dark);
        self.save(&prefs)
    }
}
