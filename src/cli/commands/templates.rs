//! `cdg templates` command - list the templates directory

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::core::Config;
use crate::render::TemplateStore;

#[derive(clap::Args, Debug)]
pub struct TemplatesArgs {
    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,
}

pub fn run(args: TemplatesArgs, config: Config) -> Result<()> {
    let store = TemplateStore::new(&config.templates_dir);
    let names = store.list().map_err(|e| miette::miette!("{}", e))?;

    match args.format {
        OutputFormat::Json => {
            let listing = json!({ "default": config.default_template, "templates": names });
            println!("{}", serde_json::to_string_pretty(&listing).into_diagnostic()?);
        }
        OutputFormat::Text => {
            if names.is_empty() {
                println!(
                    "{} No templates in {}",
                    style("!").yellow(),
                    store.root().display()
                );
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(["Template", "Default"]);
            for name in &names {
                let is_default = name == &config.default_template;
                builder.push_record([name.as_str(), if is_default { "yes" } else { "" }]);
            }
            println!("{}", builder.build().with(Style::markdown()));

            if !names.contains(&config.default_template) {
                println!(
                    "\n{} Default template {} is missing",
                    style("!").yellow(),
                    config.default_template
                );
            }
        }
    }

    Ok(())
}
