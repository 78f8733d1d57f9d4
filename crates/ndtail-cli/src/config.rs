//! TOML configuration for ndtail.
//!
//! Reads an optional settings file with precedence:
//! CLI flags > env vars > config file > defaults

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub request: RequestSettings,
}

/// Authentication section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    pub token: Option<String>,
}

/// Stock headers and query parameters sent with every request, ahead of any
/// command-line pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestSettings {
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Get the ndtail config directory path (~/.ndtail/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NDTAIL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ndtail")
}

/// Load settings from the config directory.
pub fn load_settings() -> SettingsFile {
    load_settings_file(&config_dir().join("config.toml"))
}

/// Resolve the bearer token: CLI flag > NDTAIL_TOKEN env > config file.
/// Empty values count as absent, so an empty flag or env var falls
/// through to the next source instead of sending a blank token.
pub fn resolve_token(
    flag: Option<String>,
    env: Option<String>,
    settings: &SettingsFile,
) -> Option<String> {
    flag.filter(|t| !t.is_empty())
        .or_else(|| env.filter(|t| !t.is_empty()))
        .or_else(|| settings.auth.token.clone().filter(|t| !t.is_empty()))
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &std::path::Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
