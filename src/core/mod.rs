//! Core module - configuration, logging and output naming

pub mod config;
pub mod filename;
pub mod logging;

pub use config::{Config, ConfigError, LogFormat, PartialConfig};
pub use filename::{content_disposition, normalize_output_name, DOCX_CONTENT_TYPE};
