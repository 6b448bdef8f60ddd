//! Editor settings persistence
//!
//! Settings are stored in a JSON file at the platform-appropriate config location:
//! - macOS: ~/Library/Application Support/bi-rs/settings.json
//! - Windows: %APPDATA%/bi-rs/settings.json
//! - Linux: ~/.config/bi-rs/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Editor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Whether `n`, `N` and `/` searches wrap around the buffer ends
    pub wraparound: bool,

    /// Where the buffer is dumped if the session fails unexpectedly
    pub emergency_save_path: PathBuf,

    /// How deeply `t`/`T` scripts may call each other
    pub max_script_depth: usize,

    /// Rows of 16 bytes shown by the console renderer
    pub dump_rows: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            wraparound: true,
            emergency_save_path: PathBuf::from("file.save"),
            max_script_depth: 32,
            dump_rows: 16,
        }
    }
}

impl EditorSettings {
    /// Get the path to the settings file
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("bi-rs");
            path.push("settings.json");
            path
        })
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                log::warn!("Failed to parse settings file: {}, using defaults", e);
                Self::default()
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read settings file: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let settings = serde_json::from_str(contents)?;
        log::info!("Loaded settings");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert!(settings.wraparound);
        assert_eq!(settings.emergency_save_path, PathBuf::from("file.save"));
        assert_eq!(settings.max_script_depth, 32);
        assert_eq!(settings.dump_rows, 16);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = EditorSettings::from_json(r#"{ "wraparound": false }"#).unwrap();
        assert!(!settings.wraparound);
        assert_eq!(settings.max_script_depth, 32);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(EditorSettings::from_json("{ wraparound: ").is_err());
    }

    #[test]
    fn test_serialize_deserialize() {
        let mut settings = EditorSettings::default();
        settings.dump_rows = 4;
        settings.emergency_save_path = PathBuf::from("/tmp/rescue.bin");

        let json = serde_json::to_string(&settings).unwrap();
        let loaded = EditorSettings::from_json(&json).unwrap();

        assert_eq!(loaded.dump_rows, 4);
        assert_eq!(loaded.emergency_save_path, PathBuf::from("/tmp/rescue.bin"));
    }
}
