//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;

use crate::core::Config;
use crate::entities::GenerationRequest;
use crate::schema::Validator;
use crate::cli::GlobalOpts;

/// Load the layered configuration, reporting failures as diagnostics
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    global
        .load_config()
        .map_err(|e| miette::miette!("{}", e))
}

pub fn embedded_validator() -> Result<Validator> {
    Validator::embedded().map_err(|e| miette::miette!("{}", e))
}

/// Read a request file as raw bytes plus the name used in diagnostics
pub fn read_request_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = std::fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok((name, bytes))
}

/// Read and validate a request file
pub fn load_request(path: &Path) -> Result<GenerationRequest> {
    let (name, bytes) = read_request_file(path)?;
    let validator = embedded_validator()?;
    validator
        .validate(&bytes, &name)
        .map_err(miette::Report::new)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("contribuyente año", 10), "contrib...");
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_request_file(Path::new("/nonexistent/request.json")).is_err());
    }
}
