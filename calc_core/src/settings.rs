//! # Engine Settings
//!
//! Host-level knobs shared by every calculator: default locale and the size
//! caps applied to chart and table metadata.
//!
//! Settings files are TOML (`.toml`) or JSON (anything else):
//!
//! ```toml
//! default_locale = "es"
//! max_chart_points = 25
//! max_table_rows = 60
//! ```
//!
//! Saves are atomic: write `.tmp`, fsync, rename.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calc_core::settings::{load_settings, save_settings, EngineSettings};
//! use std::path::Path;
//!
//! let settings = EngineSettings { default_locale: "es".to_string(), ..Default::default() };
//! save_settings(&settings, Path::new("engine.toml"))?;
//! let loaded = load_settings(Path::new("engine.toml"))?;
//! assert_eq!(loaded.default_locale, "es");
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Locale used when a request names none
    pub default_locale: String,

    /// Upper bound on chart points for long horizons
    pub max_chart_points: usize,

    /// Upper bound on breakdown table rows
    pub max_table_rows: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_locale: "en".to_string(),
            max_chart_points: 30,
            max_table_rows: 100,
        }
    }
}

impl EngineSettings {
    /// Reject settings that would produce empty charts or tables.
    pub fn validate(&self) -> CalcResult<()> {
        if self.default_locale.trim().is_empty() {
            return Err(CalcError::invalid_input("default_locale", "", "Locale must not be empty"));
        }
        if self.max_chart_points < 2 {
            return Err(CalcError::invalid_input(
                "max_chart_points",
                self.max_chart_points.to_string(),
                "Charts need at least two points",
            ));
        }
        if self.max_table_rows == 0 {
            return Err(CalcError::invalid_input("max_table_rows", "0", "Tables need at least one row"));
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> CalcResult<Self> {
        let settings: EngineSettings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(s: &str) -> CalcResult<Self> {
        let settings: EngineSettings = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("toml")
}

/// Load settings from a TOML or JSON file.
pub fn load_settings(path: &Path) -> CalcResult<EngineSettings> {
    let mut file = File::open(path).map_err(|e| {
        CalcError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CalcError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    let parsed = if is_toml(path) {
        EngineSettings::from_toml_str(&contents)
    } else {
        EngineSettings::from_json_str(&contents)
    };

    parsed.map_err(|e| match e {
        CalcError::SerializationError { reason } => CalcError::SerializationError {
            reason: format!("Invalid settings in {}: {}", path.display(), reason),
        },
        other => other,
    })
}

/// Save settings with atomic write semantics.
pub fn save_settings(settings: &EngineSettings, path: &Path) -> CalcResult<()> {
    settings.validate()?;

    let contents = if is_toml(path) {
        toml::to_string_pretty(settings).map_err(|e| CalcError::serialization(e.to_string()))?
    } else {
        serde_json::to_string_pretty(settings)?
    };

    let tmp_path = path.with_extension("tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), "settings saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_settings_path(name: &str, ext: &str) -> PathBuf {
        temp_dir().join(format!("calc_core_settings_{}_{}.{}", name, std::process::id(), ext))
    }

    #[test]
    fn test_defaults() {
        let s = EngineSettings::default();
        assert_eq!(s.default_locale, "en");
        assert_eq!(s.max_chart_points, 30);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let s = EngineSettings::from_toml_str("default_locale = \"es\"").unwrap();
        assert_eq!(s.default_locale, "es");
        assert_eq!(s.max_table_rows, 100);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = EngineSettings::from_json_str(r#"{"max_chart_points": 1}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(EngineSettings::from_toml_str("max_table_rows = \"many\"").is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip_toml() {
        let path = temp_settings_path("roundtrip", "toml");
        let settings = EngineSettings {
            default_locale: "es".to_string(),
            max_chart_points: 12,
            max_table_rows: 40,
        };
        save_settings(&settings, &path).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_load_roundtrip_json() {
        let path = temp_settings_path("roundtrip", "json");
        let settings = EngineSettings::default();
        save_settings(&settings, &path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(load_settings(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_settings(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
