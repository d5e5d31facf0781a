use crate::error::GlobeError;
use crate::logging;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub globe: GlobeSettings,
}

/// The `[globe]` table. Every key is optional; CLI flags win over it.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    pub reduced_motion: Option<bool>,
    pub locations: Option<PathBuf>,
    pub landmass: Option<PathBuf>,
    /// Map texture candidates: paths, file:// or http(s):// URLs.
    pub textures: Vec<String>,
    pub start_rotation_y: Option<f64>,
    pub start_tilt: Option<f64>,
    pub auto_rotate: Option<bool>,
    pub log_file: Option<PathBuf>,
    /// Hover radius in braille dots.
    pub hit_threshold: Option<f64>,
    /// Milliseconds before the globe mounts even if barely visible.
    pub init_fallback_ms: Option<u64>,
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self, GlobeError> {
        Ok(toml::from_str(content)?)
    }

    pub fn try_load(path: &Path) -> Result<Self, GlobeError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load the user config and start file logging. A broken file is
    /// reported and ignored.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Logging comes up before anything is reported, using the config's
    /// `log_file` when the file parses.
    pub fn load_from(path: &Path) -> Self {
        let loaded = Self::try_load(path);
        let log_file = match &loaded {
            Ok(settings) => settings.log_path(),
            Err(_) => logging::default_log_path(),
        };
        logging::init(&log_file);

        match loaded {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), log = %log_file.display(), "settings loaded");
                settings
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.globe.log_file.clone().unwrap_or_else(logging::default_log_path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termglobe")
            .join("config.toml")
    }
}
