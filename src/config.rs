//! Configuration management for wall response prediction

use crate::types::key::{ModelKind, OutputVariable};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub artifacts: ArtifactsConfig,
    pub prediction: PredictionConfig,
    pub logging: LoggingConfig,
}

/// Artifact store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory containing `Scalers/` and one directory per output variable
    pub models_dir: PathBuf,
    /// Number of threads for ONNX inference per model (default: 1)
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("Models"),
            onnx_threads: 1,
        }
    }
}

/// Default prediction selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Output variables to predict (default: all)
    pub variables: Vec<OutputVariable>,
    /// Models to predict with (default: all)
    pub models: Vec<ModelKind>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            variables: OutputVariable::ALL.to_vec(),
            models: ModelKind::ALL.to_vec(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file, if present
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH, false)
    }

    /// Load configuration from a specific path.
    ///
    /// Environment variables prefixed with `WALL_ML__` override file values,
    /// e.g. `WALL_ML__ARTIFACTS__MODELS_DIR=/srv/models` or
    /// `WALL_ML__PREDICTION__MODELS=RF,ANN` (comma-separated lists).
    pub fn load_from_path<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        Self::load_with_environment(path.as_ref(), required, None)
    }

    /// Load configuration with environment variables taken from `env`
    /// instead of the process environment when it is given.
    fn load_with_environment(
        path: &Path,
        required: bool,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix("WALL_ML")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("prediction.variables")
                    .with_list_parse_key("prediction.models")
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
