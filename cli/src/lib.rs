use contour::ContourParameters;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Missing 'input' field or --input argument")]
    MissingInput,
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Tracing job configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct TraceConfig {
    /// Label image; luma values are class ids
    pub input: Option<PathBuf>,
    /// GeoJSON destination, standard output when absent
    pub output: Option<PathBuf>,
    /// Number of classes to trace, defaults to the largest label plus one
    pub classes: Option<usize>,
    /// Binarize at this luma level and trace the bright cells as one class
    pub threshold: Option<u8>,
    pub contour: ContourParameters,
}

impl TraceConfig {
    /// Load TraceConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load TraceConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load TraceConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load TraceConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ConfigError::UnsupportedFileFormat),
        }
    }

    /// Convert TraceConfig to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert TraceConfig to JSON string
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn input_path(&self) -> Result<&Path, ConfigError> {
        self.input.as_deref().ok_or(ConfigError::MissingInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contour::{PixelOrigin, Simplification};

    #[test]
    fn test_toml_round_trip() {
        let config = TraceConfig {
            input: Some(PathBuf::from("labels.png")),
            output: Some(PathBuf::from("labels.geojson")),
            classes: Some(5),
            threshold: None,
            contour: ContourParameters {
                simplification: Simplification::Rdp,
                rdp_max_error: 1.25,
                pixel_origin: PixelOrigin::Center,
            },
        };
        let text = config.to_toml().expect("Should serialize");
        assert!(text.contains("simplification = \"rdp\""));
        let parsed = TraceConfig::from_toml(&text).expect("Should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TraceConfig::from_json(r#"{"input":"mask.png","threshold":100}"#)
            .expect("Should parse");
        assert_eq!(config.threshold, Some(100));
        assert_eq!(config.contour, ContourParameters::default());
        assert_eq!(config.input_path().ok(), Some(Path::new("mask.png")));
    }

    #[test]
    fn test_missing_input() {
        let config = TraceConfig::default();
        assert!(matches!(config.input_path(), Err(ConfigError::MissingInput)));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = TraceConfig::from_file("config.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFileFormat)));
    }
}
