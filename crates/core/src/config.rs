//! Editor configuration.
//!
//! Holds the tunables shared by the interaction controller, placement, file
//! intake and the export compositor. Loaded from defaults, then an optional
//! JSON file, then environment variables.

use crate::snapping::SnapConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

pub const ENV_MAX_UPLOAD_MB: &str = "FOLIO_MAX_UPLOAD_MB";
pub const ENV_REFERENCE_SCALE: &str = "FOLIO_REFERENCE_SCALE";

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Display scale at which text font sizes are authored.
    pub reference_scale: f32,
    /// Line height as a multiple of the output font size.
    pub line_height: f32,
    /// Baseline offset below the top of a text box, as a multiple of font size.
    pub ascent_factor: f32,
    /// Axis-snap distance in percentage units.
    pub snap_distance: f32,
    /// Axis-snap angle tolerance in degrees.
    pub snap_angle: f32,
    /// Rotation gestures snap to multiples of this many degrees.
    pub rotation_snap: f32,
    pub min_element_size: f32,
    pub min_image_size: f32,
    /// Width of a newly placed image, percent of page width.
    pub image_default_width: f32,
    /// Height cap of a newly placed image, percent of page height.
    pub image_max_height: f32,
    pub max_upload_bytes: u64,
    pub default_stroke_width: f32,
    pub default_font_size: f32,
    /// Appended to the original base name of exported files.
    pub output_suffix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            reference_scale: 1.5,
            line_height: 1.2,
            ascent_factor: 0.82,
            snap_distance: 1.2,
            snap_angle: 2.5,
            rotation_snap: 15.0,
            min_element_size: 0.1,
            min_image_size: 1.0,
            image_default_width: 30.0,
            image_max_height: 50.0,
            max_upload_bytes: 10 * MIB,
            default_stroke_width: 2.0,
            default_font_size: 16.0,
            output_suffix: "_edited".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Sets the upload limit in megabytes, saturating at `u64::MAX` bytes.
    pub fn with_max_upload_mb(mut self, mb: u64) -> Self {
        self.max_upload_bytes = mb.saturating_mul(MIB);
        self
    }

    pub fn with_reference_scale(mut self, scale: f32) -> Self {
        self.reference_scale = scale;
        self
    }

    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }

    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_bytes / MIB
    }

    pub fn snap_config(&self) -> SnapConfig {
        SnapConfig {
            distance_threshold: self.snap_distance,
            angle_threshold: self.snap_angle,
            rotation_increment: self.rotation_snap,
        }
    }

    /// Defaults, overlaid with `path` when given, overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Loads configuration from environment variables only.
    ///
    /// - `FOLIO_MAX_UPLOAD_MB`: upload limit in MB (default: 10)
    /// - `FOLIO_REFERENCE_SCALE`: display scale text sizes refer to (default: 1.5)
    ///
    /// # Errors
    /// Returns an error if a variable is set to something unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = std::env::var(ENV_MAX_UPLOAD_MB) {
            self.max_upload_bytes = val
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|mb| mb.checked_mul(MIB))
                .ok_or_else(|| ConfigError::InvalidValue(ENV_MAX_UPLOAD_MB.to_owned()))?;
        }

        if let Ok(val) = std::env::var(ENV_REFERENCE_SCALE) {
            self.reference_scale = val
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|scale| scale.is_finite() && *scale > 0.0)
                .ok_or_else(|| ConfigError::InvalidValue(ENV_REFERENCE_SCALE.to_owned()))?;
        }

        Ok(self)
    }

    /// Loads configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("reference_scale", self.reference_scale),
            ("line_height", self.line_height),
            ("rotation_snap", self.rotation_snap),
            ("min_element_size", self.min_element_size),
            ("min_image_size", self.min_image_size),
            ("image_default_width", self.image_default_width),
            ("image_max_height", self.image_max_height),
            ("default_font_size", self.default_font_size),
        ];

        match positive.iter().find(|(_, value)| !(value.is_finite() && *value > 0.0)) {
            Some((key, _)) => Err(ConfigError::InvalidValue((*key).to_owned())),
            None => Ok(()),
        }
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for configuration key: {0}")]
    InvalidValue(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.reference_scale, 1.5);
        assert_eq!(config.output_suffix, "_edited");
        assert_eq!(config.snap_config().rotation_increment, 15.0);
    }

    #[test]
    fn test_builder_methods() {
        let config = EditorConfig::default()
            .with_max_upload_mb(25)
            .with_reference_scale(2.0)
            .with_output_suffix("_signed");

        assert_eq!(config.max_upload_mb(), 25);
        assert_eq!(config.reference_scale, 2.0);
        assert_eq!(config.output_suffix, "_signed");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "snap_distance": 2.0 }"#).expect("parse");
        assert_eq!(config.snap_distance, 2.0);
        assert_eq!(config.default_font_size, 16.0);
    }

    #[test]
    fn nonsense_values_are_rejected() {
        let err = EditorConfig::from_json(r#"{ "reference_scale": 0 }"#).expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "reference_scale"));

        assert!(matches!(EditorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("folio.json");

        let config = EditorConfig::default().with_max_upload_mb(3);
        config.save_to_file(&path).expect("save");

        assert_eq!(EditorConfig::from_file(&path).expect("load"), config);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let _guard = EnvGuard::new(&[ENV_MAX_UPLOAD_MB, ENV_REFERENCE_SCALE]);

        env::set_var(ENV_MAX_UPLOAD_MB, "20");
        env::set_var(ENV_REFERENCE_SCALE, "2");

        let config = EditorConfig::from_env().expect("env config");
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.reference_scale, 2.0);
    }

    #[test]
    #[serial]
    fn env_overrides_file_values() {
        let _guard = EnvGuard::new(&[ENV_MAX_UPLOAD_MB, ENV_REFERENCE_SCALE]);
        env::remove_var(ENV_REFERENCE_SCALE);
        env::set_var(ENV_MAX_UPLOAD_MB, "1");

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("folio.json");
        fs::write(&path, r#"{ "max_upload_bytes": 99, "line_height": 1.5 }"#).expect("write");

        let config = EditorConfig::load(Some(&path)).expect("load");
        assert_eq!(config.max_upload_bytes, 1024 * 1024);
        assert_eq!(config.line_height, 1.5);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid() {
        let _guard = EnvGuard::new(&[ENV_MAX_UPLOAD_MB, ENV_REFERENCE_SCALE]);
        env::remove_var(ENV_REFERENCE_SCALE);

        env::set_var(ENV_MAX_UPLOAD_MB, "lots");
        assert!(EditorConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_upload_limit_overflow() {
        let _guard = EnvGuard::new(&[ENV_MAX_UPLOAD_MB, ENV_REFERENCE_SCALE]);
        env::remove_var(ENV_REFERENCE_SCALE);

        env::set_var(ENV_MAX_UPLOAD_MB, u64::MAX.to_string());
        let err = EditorConfig::from_env().expect_err("overflow");
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == ENV_MAX_UPLOAD_MB));
    }

    #[test]
    fn test_builder_upload_limit_saturates() {
        let config = EditorConfig::default().with_max_upload_mb(u64::MAX);
        assert_eq!(config.max_upload_bytes, u64::MAX);
    }

    // Helper to save and restore environment variables
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(var_names: &[&str]) -> Self {
            let vars = var_names
                .iter()
                .map(|name| (name.to_string(), env::var(name).ok()))
                .collect();
            Self { vars }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }
}
