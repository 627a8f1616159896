// LiveTail - GPL-3.0-or-later
// This file is part of LiveTail.
//
// Copyright (C) 2026 Daniel Freiermuth
//
// LiveTail is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LiveTail is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LiveTail.  If not, see <https://www.gnu.org/licenses/>.

use crate::core::Namespace;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Live polling period unless configured otherwise
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// User settings stored in the config directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the log-viewer API
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Location of the viewer config, absolute or relative to `server_url`
    #[serde(default = "default_log_config_path")]
    pub log_config_path: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Source to open instead of the first one the backend lists
    #[serde(default)]
    pub source_id: Option<String>,

    #[serde(default)]
    pub namespace: Option<Namespace>,
}

fn default_server_url() -> String {
    "http://localhost:8888/api".to_string()
}

fn default_log_config_path() -> String {
    "config/logviewer".to_string()
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            log_config_path: default_log_config_path(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            source_id: None,
            namespace: None,
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config_dir| config_dir.join("livetail").join("config.json"))
    }

    /// Load settings from the config directory, returning defaults if not found
    pub fn load() -> Self {
        Self::config_path().map_or_else(Self::default, |path| Self::load_from(&path))
    }

    /// Load settings from `path`, returning defaults if missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No settings found at {}, using defaults", path.display());
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Could not read settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    /// Save settings to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Polling period, never shorter than one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Absolute URL of the viewer config
    pub fn log_config_url(&self) -> String {
        let path = self.log_config_path.as_str();
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.server_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let settings = Settings {
            poll_interval_secs: 3,
            namespace: Some(Namespace::new("syslog", "autogen")),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_or_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(Settings::load_from(&path), Settings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server_url":"http://logs.internal:9000/api"}"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.server_url, "http://logs.internal:9000/api");
        assert_eq!(settings.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn test_log_config_url() {
        let mut settings = Settings {
            server_url: "http://host:8888/api/".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.log_config_url(), "http://host:8888/api/config/logviewer");

        settings.log_config_path = "https://other/cfg".to_string();
        assert_eq!(settings.log_config_url(), "https://other/cfg");
    }

    #[test]
    fn test_poll_interval_floor() {
        let settings = Settings {
            poll_interval_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));
    }
}
