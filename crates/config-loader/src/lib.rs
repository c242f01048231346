use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Extensions tried, in order, when looking a document up by name.
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    ConfigFileNotFound { path: String },

    #[error("Unsupported config format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Config parsing failed for {path}: {message}")]
    ParsingFailed { path: String, message: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

/// Finds named configuration documents in one directory and deserializes
/// them from YAML or JSON.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_dir: Self::find_config_dir(),
        }
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn find_config_dir() -> PathBuf {
        std::env::var("PORTAL_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    /// Path of the first `<name>.<ext>` that exists in the config dir.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.config_dir.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file())
    }

    #[instrument(skip(self))]
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, ConfigError> {
        let path = self
            .locate(name)
            .ok_or_else(|| ConfigError::ConfigFileNotFound {
                path: self.config_dir.join(name).to_string_lossy().to_string(),
            })?;
        Self::load_path(&path)
    }

    /// Like [`load`](Self::load), but a missing document yields `T::default()`.
    #[instrument(skip(self))]
    pub fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        name: &str,
    ) -> Result<T, ConfigError> {
        match self.locate(name) {
            Some(path) => Self::load_path(&path),
            None => {
                debug!(
                    "No {} document in {:?}, using defaults",
                    name, self.config_dir
                );
                Ok(T::default())
            }
        }
    }

    /// Reads one file, picking the format from its extension.
    pub fn load_path<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        })?;
        let parsing_failed = |message: String| ConfigError::ParsingFailed {
            path: path.to_string_lossy().to_string(),
            message,
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| parsing_failed(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| parsing_failed(e.to_string()))
            }
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_string_lossy().to_string(),
            }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
