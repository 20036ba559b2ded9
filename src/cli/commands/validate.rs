//! `cdg validate` command - check a request file without rendering

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{embedded_validator, read_request_file, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::CATASTRAL_KEY_FORMAT;
use crate::schema::registry::{embedded_schema, GENERATION_REQUEST_SCHEMA};
use crate::schema::{Violation, ViolationKind};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Request file (JSON)
    #[arg(required_unless_present = "print_schema")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Print the embedded request schema and exit
    #[arg(long, conflicts_with = "file")]
    pub print_schema: bool,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    if args.print_schema {
        return print_schema();
    }

    let Some(path) = args.file else {
        return Err(miette::miette!("No request file given"));
    };

    let (name, bytes) = read_request_file(&path)?;
    let validator = embedded_validator()?;

    match validator.validate(&bytes, &name) {
        Ok(request) => {
            match args.format {
                OutputFormat::Json => {
                    let report = json!({ "file": name, "valid": true, "violations": [] });
                    println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
                }
                OutputFormat::Text => {
                    println!(
                        "{} {} is valid ({} property record(s))",
                        style("✓").green(),
                        path.display(),
                        request.properties.len()
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            let count = e.violation_count();
            match args.format {
                OutputFormat::Json => {
                    let report = json!({ "file": name, "valid": false, "violations": e.violations() });
                    println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
                }
                OutputFormat::Text => {
                    println!(
                        "{} {} - {} error(s)\n",
                        style("✗").red(),
                        path.display(),
                        count
                    );
                    println!("{}", violation_table(e.violations()));
                    println!();

                    let report = miette::Report::new(e);
                    eprintln!("{:?}", report);
                }
            }

            Err(miette::miette!("Validation failed: {} error(s)", count))
        }
    }
}

fn print_schema() -> Result<()> {
    let schema = embedded_schema(GENERATION_REQUEST_SCHEMA)
        .ok_or_else(|| miette::miette!("Embedded schema {} is missing", GENERATION_REQUEST_SCHEMA))?;
    println!("{}", String::from_utf8_lossy(&schema));
    Ok(())
}

pub fn violation_table(violations: &[Violation]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Path", "Kind", "Detail", "Reason"]);

    for v in violations {
        builder.push_record([
            v.path.clone(),
            v.kind.name().to_string(),
            kind_detail(&v.kind),
            truncate_str(&v.reason, 60),
        ]);
    }

    builder.build().with(Style::markdown()).to_string()
}

fn kind_detail(kind: &ViolationKind) -> String {
    match kind {
        ViolationKind::MalformedInput { line, column } => format!("line {}, column {}", line, column),
        ViolationKind::MissingField | ViolationKind::EmptyCollection => String::new(),
        ViolationKind::TypeMismatch { expected, actual } => {
            format!("expected {}, got {}", expected, actual)
        }
        ViolationKind::RangeViolation { constraint } => constraint.clone(),
        ViolationKind::PatternViolation { .. } => CATASTRAL_KEY_FORMAT.to_string(),
    }
}
