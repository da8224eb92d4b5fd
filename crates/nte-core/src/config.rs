use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "NTE_CONFIG";
pub const CONFIG_FILENAME: &str = ".nte_config.json";
pub const DEFAULT_NOTES_DIR: &str = "~/.ntes";
pub const FALLBACK_EDITOR: &str = "vim";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not determine the home directory")]
    MissingHome,
}

/// Options as they appear in the JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    pub notes_dir: Option<String>,
    pub editor: Option<String>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub sync: Option<String>,
}

/// Resolved configuration, read once at startup and passed to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NteConfig {
    pub notes_dir: PathBuf,
    pub editor: String,
    pub before: Option<String>,
    pub after: Option<String>,
    pub sync: Option<String>,
}

impl NteConfig {
    /// Configuration rooted at `notes_dir` with no hooks, mostly useful for tests.
    pub fn with_notes_dir(notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            notes_dir: notes_dir.into(),
            editor: default_editor(),
            before: None,
            after: None,
            sync: None,
        }
    }

    pub fn from_raw(raw: RawConfig, home: Option<&Path>) -> Self {
        let notes_dir = raw
            .notes_dir
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_NOTES_DIR);
        Self {
            notes_dir: expand_user(notes_dir, home),
            editor: raw
                .editor
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(default_editor),
            before: raw.before,
            after: raw.after,
            sync: raw.sync,
        }
    }
}

pub fn resolve_user_home_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        let trimmed = profile.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    None
}

pub fn default_editor() -> String {
    std::env::var("EDITOR")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

pub fn expand_user(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        }
        _ => PathBuf::from(path),
    }
}

/// Config path: `$NTE_CONFIG` when set, otherwise `~/.nte_config.json`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    resolve_user_home_dir()
        .map(|home| home.join(CONFIG_FILENAME))
        .ok_or(ConfigError::MissingHome)
}

pub fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    if !path.is_file() {
        return Ok(RawConfig::default());
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Load the configuration from `path` (or the default location) and apply defaults.
pub fn load_config(path: Option<&Path>) -> Result<NteConfig, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };
    let raw = read_raw_config(&path)?;
    let config = NteConfig::from_raw(raw, resolve_user_home_dir().as_deref());
    tracing::debug!(path = %path.display(), notes_dir = %config.notes_dir.display(), "loaded config");
    Ok(config)
}
