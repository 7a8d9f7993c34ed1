/// Application settings
///
/// Loaded from `settings.json` in the user config directory:
/// - Linux: ~/.config/folio-gallery/settings.json
/// - macOS: ~/Library/Application Support/folio-gallery/settings.json
/// - Windows: %APPDATA%\folio-gallery\settings.json
///
/// Every field is optional; missing ones take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::carousel::lightbox::SwipeConfig;
use crate::carousel::{EdgePolicy, SurfaceConfig};
use crate::error::Result;

/// Remote catalog API used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://apirayfogportfolio.nearbydoctors.in/public/api/admin";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "FOLIO_API_URL";

/// Serialized form of a `SurfaceConfig` (durations in milliseconds)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SurfaceSettings {
    pub policy: EdgePolicy,
    pub autoplay_ms: u64,
    pub cooldown_ms: u64,
    pub aspect_ratio: f32,
    pub transition_ms: u64,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        SurfaceConfig::grid().into()
    }
}

impl From<SurfaceConfig> for SurfaceSettings {
    fn from(config: SurfaceConfig) -> Self {
        Self {
            policy: config.policy,
            autoplay_ms: config.autoplay_interval.as_millis() as u64,
            cooldown_ms: config.resume_cooldown.as_millis() as u64,
            aspect_ratio: config.aspect_ratio,
            transition_ms: config.transition.as_millis() as u64,
        }
    }
}

impl From<SurfaceSettings> for SurfaceConfig {
    fn from(settings: SurfaceSettings) -> Self {
        let aspect_ratio = if settings.aspect_ratio.is_finite() && settings.aspect_ratio > 0.0 {
            settings.aspect_ratio
        } else {
            16.0 / 9.0
        };
        Self {
            policy: settings.policy,
            // A zero interval would fire on every tick
            autoplay_interval: Duration::from_millis(settings.autoplay_ms.max(100)),
            resume_cooldown: Duration::from_millis(settings.cooldown_ms),
            aspect_ratio,
            transition: Duration::from_millis(settings.transition_ms),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub grid: SurfaceSettings,
    pub lightbox: SurfaceSettings,
    pub admin: SurfaceSettings,
    pub swipe_threshold_px: f32,
    pub swipe_cooldown_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let swipe = SwipeConfig::default();
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            grid: SurfaceConfig::grid().into(),
            lightbox: SurfaceConfig::lightbox().into(),
            admin: SurfaceConfig::admin().into(),
            swipe_threshold_px: swipe.threshold_px,
            swipe_cooldown_ms: swipe.cooldown.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Load from the default location, then apply the environment override.
    ///
    /// A missing or unreadable file is not fatal: defaults are used and the
    /// problem is logged.
    pub fn load() -> Self {
        let mut settings = match Self::default_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }),
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                settings.api_base_url = url.trim().to_string();
            }
        }
        settings
    }

    /// Read settings from `path`. An absent file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("folio-gallery");
        path.push("settings.json");
        Some(path)
    }

    pub fn grid_surface(&self) -> SurfaceConfig {
        self.grid.into()
    }

    pub fn lightbox_surface(&self) -> SurfaceConfig {
        self.lightbox.into()
    }

    pub fn admin_surface(&self) -> SurfaceConfig {
        self.admin.into()
    }

    pub fn swipe(&self) -> SwipeConfig {
        SwipeConfig {
            threshold_px: self.swipe_threshold_px.max(0.0),
            cooldown: Duration::from_millis(self.swipe_cooldown_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.lightbox_surface(), SurfaceConfig::lightbox());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"api_base_url": "http://localhost:8000/api", "grid": {{"policy": "clamp", "autoplay_ms": 2500}}}}"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.api_base_url, "http://localhost:8000/api");

        let grid = settings.grid_surface();
        assert_eq!(grid.policy, EdgePolicy::Clamp);
        assert_eq!(grid.autoplay_interval, Duration::from_millis(2500));
        assert_eq!(grid.transition, Duration::from_millis(300));
        assert_eq!(settings.swipe().threshold_px, 40.0);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_degenerate_values_are_sanitized() {
        let settings = SurfaceSettings {
            autoplay_ms: 0,
            aspect_ratio: -1.0,
            ..SurfaceSettings::default()
        };
        let config: SurfaceConfig = settings.into();
        assert_eq!(config.autoplay_interval, Duration::from_millis(100));
        assert!((config.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }
}
