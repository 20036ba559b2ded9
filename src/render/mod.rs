//! Render module - template lookup and document generation

pub mod docx;
pub mod filters;
pub mod placeholders;
pub mod store;

pub use docx::DocxRenderer;
pub use store::{TemplateError, TemplateStore};

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::normalize_output_name;
use crate::entities::GenerationRequest;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template is not a valid .docx archive: {0}")]
    Archive(String),

    #[error("Template has no word/document.xml part")]
    MissingDocumentPart,

    #[error("Failed to render {part}: {message}")]
    Template { part: String, message: String },
}

/// Merges data into a template, producing document bytes
///
/// Implementations must not keep state between calls; the server invokes
/// them from many requests at once.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, template: &Path, data: &JsonValue) -> Result<Vec<u8>, RenderError>;
}

/// Template context for a validated request
///
/// The serialized request with `archivo` replaced by the normalized output
/// name and `fecha_generacion` set to `today`.
pub fn build_context(request: &GenerationRequest, today: NaiveDate) -> JsonValue {
    let mut context = serde_json::to_value(request).unwrap_or(JsonValue::Null);

    if let JsonValue::Object(map) = &mut context {
        map.insert(
            "archivo".to_string(),
            JsonValue::String(normalize_output_name(&request.output_file_name)),
        );
        map.insert(
            "fecha_generacion".to_string(),
            JsonValue::String(today.format("%Y-%m-%d").to_string()),
        );
    }

    context
}
