//! `cdg render` command - generate a document without the server

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;

use crate::cli::helpers::load_request;
use crate::core::{normalize_output_name, Config};
use crate::render::{build_context, DocumentRenderer, DocxRenderer, TemplateStore};

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Request file (JSON)
    pub file: PathBuf,

    /// Output path (default: the request's `archivo`, normalized, in the current directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Template identifier, overriding the request's `plantilla_tipo_documento`
    #[arg(long, short = 't')]
    pub template: Option<String>,
}

pub fn run(args: RenderArgs, config: Config) -> Result<()> {
    let request = load_request(&args.file)?;

    let template_id = args
        .template
        .as_deref()
        .unwrap_or_else(|| request.template_or(&config.default_template));

    let store = TemplateStore::new(&config.templates_dir);
    let template = store
        .resolve(template_id)
        .map_err(|e| miette::miette!("{} (templates directory: {})", e, store.root().display()))?;

    let context = build_context(&request, chrono::Local::now().date_naive());
    let document = DocxRenderer
        .render(&template, &context)
        .map_err(|e| miette::miette!("{}", e))?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(normalize_output_name(&request.output_file_name)));

    std::fs::write(&output, &document)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

    tracing::debug!(template=%template.display(), bytes=document.len(), "document rendered");

    println!(
        "{} Wrote {} ({} bytes, template {})",
        style("✓").green(),
        style(output.display()).cyan(),
        document.len(),
        template_id
    );

    Ok(())
}
