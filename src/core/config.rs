//! Configuration management with layered hierarchy
//!
//! Built-in defaults, then the global config file, then an explicit
//! `--config` file, then environment variables and command-line flags.
//! The merged [`Config`] is immutable once loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_TEMPLATE: &str = "recibo_predial.docx";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_PORT: u16 = 8080;

/// Log output format
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, colored
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Process-wide service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Directory holding `.docx` templates (read-only at runtime)
    pub templates_dir: PathBuf,

    /// Template used when a request names none
    pub default_template: String,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,

    /// Origins allowed for cross-origin requests; `*` allows any
    pub allowed_origins: Vec<String>,

    /// The port to listen for HTTP requests on
    pub port: u16,

    pub log_format: LogFormat,
}

/// One configuration layer; unset fields defer to lower layers
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub templates_dir: Option<PathBuf>,
    pub default_template: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub allowed_origins: Option<Vec<String>>,
    pub port: Option<u16>,
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            default_template: DEFAULT_TEMPLATE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_origins: vec!["*".to_string()],
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(config_file: Option<&Path>, overrides: PartialConfig) -> Result<Self, ConfigError> {
        // 1. Built-in defaults
        let mut config = Config::default();

        // 2. Global user config (~/.config/cdg/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(PartialConfig::from_file(&global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            config.merge(PartialConfig::from_file(path)?);
        }

        // 4. Environment variables and flags
        config.merge(overrides);

        config.validate()?;
        Ok(config)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cdg").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge a layer into this one (the layer takes precedence)
    pub fn merge(&mut self, other: PartialConfig) {
        if let Some(templates_dir) = other.templates_dir {
            self.templates_dir = templates_dir;
        }
        if let Some(default_template) = other.default_template {
            self.default_template = default_template;
        }
        if let Some(max_upload_bytes) = other.max_upload_bytes {
            self.max_upload_bytes = max_upload_bytes;
        }
        if let Some(allowed_origins) = other.allowed_origins {
            self.allowed_origins = allowed_origins
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(port) = other.port {
            self.port = port;
        }
        if let Some(log_format) = other.log_format {
            self.log_format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.default_template.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_template must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl PartialConfig {
    /// Read one YAML layer
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
