//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    render::RenderArgs, serve::ServeArgs, templates::TemplatesArgs, validate::ValidateArgs,
};
use crate::core::{Config, ConfigError, LogFormat, PartialConfig};

#[derive(Parser)]
#[command(name = "cdg")]
#[command(author, version, about = "Cadastral document generator")]
#[command(
    long_about = "Validates cadastral property records given as JSON and merges them into .docx templates, over HTTP or from the command line."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Extra YAML config file, applied over the global one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding .docx templates
    #[arg(long, global = true, env = "CDG_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Template used when a request names none
    #[arg(long, global = true, env = "CDG_DEFAULT_TEMPLATE")]
    pub default_template: Option<String>,

    /// Largest accepted request body, in bytes
    #[arg(long, global = true, env = "CDG_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Allowed CORS origins, comma separated ("*" for any)
    #[arg(long, global = true, env = "CDG_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Option<Vec<String>>,

    /// Port to listen on
    #[arg(long, global = true, env = "PORT")]
    pub port: Option<u16>,

    /// Log output format
    #[arg(long, global = true, env = "CDG_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

impl GlobalOpts {
    /// Flags and environment as the top configuration layer
    pub fn overrides(&self) -> PartialConfig {
        PartialConfig {
            templates_dir: self.templates_dir.clone(),
            default_template: self.default_template.clone(),
            max_upload_bytes: self.max_upload_bytes,
            allowed_origins: self.allowed_origins.clone(),
            port: self.port,
            log_format: self.log_format,
        }
    }

    pub fn load_config(&self) -> Result<Config, ConfigError> {
        Config::load(self.config.as_deref(), self.overrides())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Validate a request file and report every violation
    Validate(ValidateArgs),

    /// Render a request file to a .docx document
    Render(RenderArgs),

    /// List available templates
    Templates(TemplatesArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// JSON format (for programming)
    Json,
}
