//! `cdg serve` command - run the HTTP API

use miette::{IntoDiagnostic, Result};

use crate::api::{self, ApiContext};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct ServeArgs {}

pub fn run(_args: ServeArgs, config: Config) -> Result<()> {
    if !config.templates_dir.is_dir() {
        tracing::warn!(
            templates_dir=%config.templates_dir.display(),
            "templates directory does not exist; every generation will fail"
        );
    }

    tracing::info!(
        templates_dir=%config.templates_dir.display(),
        default_template=%config.default_template,
        max_upload_bytes=config.max_upload_bytes,
        origins=?config.allowed_origins,
        "starting server"
    );

    let context = ApiContext::new(config).map_err(|e| miette::miette!("{}", e))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    runtime
        .block_on(api::setup_and_serve(context))
        .map_err(|e| miette::miette!("Server error: {}", e))
}
