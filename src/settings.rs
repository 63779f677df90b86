//! Player settings and preferences
//!
//! Persisted separately from scores in LocalStorage (web) or a JSON file
//! (native). Also carries the balance sheet so it can be tweaked without a
//! rebuild.

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;
use crate::tuning::{ConfigError, Tuning};

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display name submitted with scores
    pub username: String,
    /// Mode preselected on the start screen
    pub default_mode: GameMode,
    /// Game balance
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: "Guest".to_string(),
            default_mode: GameMode::Classic,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.tuning.validate()?;
        settings.username = settings.username.trim().to_string();
        if settings.username.is_empty() {
            settings.username = Self::default().username;
        }
        Ok(settings)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "brain_flip_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json(r#"{ "username": "Ada", "default_mode": "Speed" }"#).unwrap();
        assert_eq!(settings.username, "Ada");
        assert_eq!(settings.default_mode, GameMode::Speed);
        assert_eq!(settings.tuning, Tuning::default());
    }

    #[test]
    fn test_blank_username_falls_back() {
        let settings = Settings::from_json(r#"{ "username": "   " }"#).unwrap();
        assert_eq!(settings.username, "Guest");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        // Older builds stored audio and accessibility prefs here
        let json = r#"{ "username": "Ada", "master_volume": 0.5, "reduced_motion": true }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.username, "Ada");
        let saved = serde_json::to_value(&settings).unwrap();
        assert!(saved.get("master_volume").is_none());
        assert!(saved.get("reduced_motion").is_none());
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let json = r#"{ "tuning": { "scoring": { "base_points": 0 } } }"#;
        assert!(matches!(Settings::from_json(json), Err(ConfigError::ZeroBasePoints)));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("brain_flip_settings_{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.username = "Grace".to_string();
        settings.default_mode = GameMode::Marathon;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.username, "Grace");
        assert_eq!(loaded.tuning.progression, settings.tuning.progression);
        assert_eq!(loaded.default_mode, GameMode::Marathon);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_defaults() {
        let loaded = Settings::load_from(std::path::Path::new("/nonexistent/brain_flip.json"));
        assert_eq!(loaded, Settings::default());
    }
}
