//! Application settings.
//!
//! Stored at `~/.config/tvshelf/settings.toml`. Every field has a default, so
//! a missing file or a partial one is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::scanner::DEFAULT_VIDEO_EXTENSIONS;

const APP_DIR: &str = "tvshelf";

/// Canonical path to the settings file: `~/.config/tvshelf/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join(APP_DIR).join("settings.toml")
}

/// Default database location: `<data dir>/tvshelf/metadata.db`.
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join(APP_DIR).join("metadata.db")
}

/// Default poster cache: `<cache dir>/tvshelf/posters`.
pub fn default_poster_cache_dir() -> PathBuf {
    let cache = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    cache.join(APP_DIR).join("posters")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_cache_dir: Option<PathBuf>,
    /// Minimum gap between catalog requests.
    pub request_interval_ms: u64,
    pub request_timeout_secs: u64,
    /// Raise the acceptance threshold from 60 to 80.
    pub require_exact_match: bool,
    pub video_extensions: Vec<String>,
    pub download_posters: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            poster_cache_dir: None,
            request_interval_ms: 200,
            request_timeout_secs: 30,
            require_exact_match: false,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            download_posters: true,
        }
    }
}

impl Settings {
    /// Load from [`settings_path`], falling back to defaults if the file is absent.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically via a temp file and rename.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    pub fn poster_cache_dir(&self) -> PathBuf {
        self.poster_cache_dir
            .clone()
            .unwrap_or_else(default_poster_cache_dir)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The in-process options handed to the scan pipeline.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            require_exact_match: self.require_exact_match,
            video_extensions: self.video_extensions.clone(),
            request_interval: Duration::from_millis(self.request_interval_ms),
            poster_cache_dir: self.download_posters.then(|| self.poster_cache_dir()),
        }
    }
}

/// Options for a [`ScanPipeline`](crate::pipeline::ScanPipeline).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub require_exact_match: bool,
    pub video_extensions: Vec<String>,
    /// Minimum gap between catalog calls, shared by the worker and
    /// resolution threads.
    pub request_interval: Duration,
    /// Where posters are cached. `None` disables poster downloads.
    pub poster_cache_dir: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Settings {
            download_posters: false,
            ..Settings::default()
        }
        .pipeline_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.request_interval_ms, 200);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "require_exact_match = true\nvideo_extensions = [\"mkv\"]\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.require_exact_match);
        assert_eq!(settings.video_extensions, vec!["mkv"]);
        assert_eq!(settings.request_timeout_secs, 30);
        assert!(settings.download_posters);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "request_interval_ms = \"soon\"").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.toml");
        let settings = Settings {
            database_path: Some(dir.path().join("db.sqlite")),
            request_interval_ms: 500,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn disabled_posters_clear_cache_dir() {
        let settings = Settings {
            download_posters: false,
            ..Settings::default()
        };
        assert!(settings.pipeline_options().poster_cache_dir.is_none());
        assert!(PipelineOptions::default().poster_cache_dir.is_none());
    }
}
