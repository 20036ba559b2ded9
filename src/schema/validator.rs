//! Payload validation with complete violation reporting
//!
//! A payload goes through three stages: JSON parsing, JSON Schema checks
//! (every violation is collected, not just the first), and deserialization
//! into a typed [`GenerationRequest`].

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

use crate::entities::{GenerationRequest, CATASTRAL_KEY_FORMAT};
use crate::schema::diagnostics::{find_path_span, line_col_to_offset, parse_error_help};
use crate::schema::registry::{SchemaRegistry, GENERATION_REQUEST_SCHEMA};

/// Path reported for problems with the document as a whole
pub const ROOT_PATH: &str = "$";

/// What went wrong at a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ViolationKind {
    MalformedInput { line: usize, column: usize },
    MissingField,
    TypeMismatch { expected: String, actual: String },
    RangeViolation { constraint: String },
    PatternViolation { pattern: String },
    EmptyCollection,
}

impl ViolationKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::MalformedInput { .. } => "MalformedInput",
            ViolationKind::MissingField => "MissingField",
            ViolationKind::TypeMismatch { .. } => "TypeMismatch",
            ViolationKind::RangeViolation { .. } => "RangeViolation",
            ViolationKind::PatternViolation { .. } => "PatternViolation",
            ViolationKind::EmptyCollection => "EmptyCollection",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            ViolationKind::MalformedInput { .. } => "invalid JSON",
            ViolationKind::MissingField => "required field missing",
            ViolationKind::TypeMismatch { .. } => "wrong type",
            ViolationKind::RangeViolation { .. } => "out of range",
            ViolationKind::PatternViolation { .. } => "pattern mismatch",
            ViolationKind::EmptyCollection => "empty",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single problem in a payload, addressed by dotted path (`predio.0.folio`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
    pub reason: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// A violation rendered as a labelled diagnostic
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }
}

/// Validation error carrying every violation found in a payload
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed: {summary}")]
#[diagnostic(code(cdg::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    diagnostics: Vec<SchemaViolation>,

    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<Violation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };

        let diagnostics = violations
            .iter()
            .map(|v| violation_to_diagnostic(source, v))
            .collect();

        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            diagnostics,
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// True when the payload was not JSON at all
    pub fn is_malformed(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v.kind, ViolationKind::MalformedInput { .. }))
    }
}

/// The registry did not contain a usable request schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema not registered: {0}")]
    Missing(String),

    #[error("Schema {name} is not valid JSON: {message}")]
    Parse { name: String, message: String },

    #[error("Schema {name} failed to compile: {message}")]
    Compile { name: String, message: String },
}

/// Compiled validator for generation requests
pub struct Validator {
    compiled: JsonValidator,
}

impl Validator {
    /// Compile the generation request schema from the registry
    pub fn new(registry: &SchemaRegistry) -> Result<Self, SchemaError> {
        let name = GENERATION_REQUEST_SCHEMA;
        let schema_str = registry
            .get(name)
            .ok_or_else(|| SchemaError::Missing(name.to_string()))?;

        let schema_json: JsonValue =
            serde_json::from_str(schema_str).map_err(|e| SchemaError::Parse {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let compiled = validator_for(&schema_json).map_err(|e| SchemaError::Compile {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { compiled })
    }

    /// Compile the embedded schemas
    pub fn embedded() -> Result<Self, SchemaError> {
        Self::new(&SchemaRegistry::default())
    }

    /// Parse, check and type a raw payload
    ///
    /// `filename` only labels diagnostics.
    pub fn validate(&self, bytes: &[u8], filename: &str) -> Result<GenerationRequest, ValidationError> {
        let source = String::from_utf8_lossy(bytes);

        let value: JsonValue = match serde_json::from_slice(bytes) {
            Ok(v) => v,
            Err(e) => {
                let violation = Violation::new(
                    ROOT_PATH,
                    ViolationKind::MalformedInput {
                        line: e.line(),
                        column: e.column(),
                    },
                    format!("JSON parse error: {}", e),
                );
                return Err(ValidationError::new(filename, &source, vec![violation]));
            }
        };

        self.validate_value(value)
            .map_err(|violations| ValidationError::new(filename, &source, violations))
    }

    /// Check an already-parsed value, collecting every violation
    pub fn validate_value(&self, value: JsonValue) -> Result<GenerationRequest, Vec<Violation>> {
        let violations: Vec<Violation> = self
            .compiled
            .iter_errors(&value)
            .map(|e| error_to_violation(&e))
            .collect();

        if !violations.is_empty() {
            return Err(violations);
        }

        // The schema bounds every integer to its Rust type, so this only fires
        // if the schema and the record model drift apart.
        serde_json::from_value(value).map_err(|e| {
            vec![Violation::new(
                ROOT_PATH,
                ViolationKind::TypeMismatch {
                    expected: "GenerationRequest".to_string(),
                    actual: e.to_string(),
                },
                format!("payload does not match the record model: {}", e),
            )]
        })
    }
}

/// Turn a JSON pointer (`/predio/0/folio`) into a dotted path (`predio.0.folio`)
pub fn dotted_path(pointer: &str) -> String {
    let parts: Vec<String> = pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect();

    if parts.is_empty() {
        ROOT_PATH.to_string()
    } else {
        parts.join(".")
    }
}

fn join_path(parent: &str, field: &str) -> String {
    if parent == ROOT_PATH {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

/// JSON type name of a value as used in error messages
pub fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn describe_type_kind(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(ty) => ty.to_string(),
        TypeKind::Multiple(types) => types
            .clone()
            .into_iter()
            .map(|ty| ty.to_string())
            .filter(|ty| ty != "null")
            .collect::<Vec<_>>()
            .join(" or "),
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(error: &JsonSchemaError<'_>) -> Violation {
    let path = dotted_path(error.instance_path.as_str());

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let field = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Violation::new(
                join_path(&path, &field),
                ViolationKind::MissingField,
                format!("required field '{}' is missing", field),
            )
        }
        ValidationErrorKind::Type { kind } => {
            let expected = describe_type_kind(kind);
            let actual = json_type_name(&error.instance).to_string();
            let reason = format!("expected {}, found {}", expected, actual);
            Violation::new(
                path,
                ViolationKind::TypeMismatch { expected, actual },
                reason,
            )
        }
        ValidationErrorKind::Minimum { limit } => range_violation(path, format!(">= {}", limit)),
        ValidationErrorKind::ExclusiveMinimum { limit } => {
            range_violation(path, format!("> {}", limit))
        }
        ValidationErrorKind::Maximum { limit } => range_violation(path, format!("<= {}", limit)),
        ValidationErrorKind::ExclusiveMaximum { limit } => {
            range_violation(path, format!("< {}", limit))
        }
        ValidationErrorKind::Pattern { pattern } => Violation::new(
            path,
            ViolationKind::PatternViolation {
                pattern: pattern.to_string(),
            },
            format!("value does not match pattern {}", pattern),
        ),
        ValidationErrorKind::MinItems { .. } => Violation::new(
            path,
            ViolationKind::EmptyCollection,
            "at least one item is required",
        ),
        ValidationErrorKind::MinLength { .. } => Violation::new(
            path,
            ViolationKind::EmptyCollection,
            "value must not be empty",
        ),
        _ => Violation::new(
            path,
            ViolationKind::TypeMismatch {
                expected: "valid value".to_string(),
                actual: json_type_name(&error.instance).to_string(),
            },
            error.to_string(),
        ),
    }
}

fn range_violation(path: String, constraint: String) -> Violation {
    let reason = format!("value must be {}", constraint);
    Violation::new(path, ViolationKind::RangeViolation { constraint }, reason)
}

fn violation_to_diagnostic(source: &str, violation: &Violation) -> SchemaViolation {
    let span = match violation.kind {
        ViolationKind::MalformedInput { line, column } => {
            let offset = line_col_to_offset(source, line, column);
            let len = usize::from(offset < source.len());
            (offset, len).into()
        }
        _ => find_path_span(source, &violation.path),
    };

    let message = if violation.path == ROOT_PATH {
        violation.reason.clone()
    } else {
        format!("{} at '{}'", violation.reason, violation.path)
    };

    SchemaViolation::new(
        message,
        violation.kind.hint().to_string(),
        span,
        generate_help_message(violation),
    )
}

/// Generate a help message with suggestions for fixing the violation
fn generate_help_message(violation: &Violation) -> Option<String> {
    match &violation.kind {
        ViolationKind::MalformedInput { .. } => parse_error_help(&violation.reason),
        ViolationKind::MissingField => {
            let field = violation.path.rsplit('.').next().unwrap_or(&violation.path);
            Some(format!("Add the '{}' field to the record", field))
        }
        ViolationKind::PatternViolation { .. } if violation.path.ends_with("clave_catastral") => Some(
            format!(
                "Catastral key format: {}, e.g., 123-45-678-90-12-AB1",
                CATASTRAL_KEY_FORMAT
            ),
        ),
        ViolationKind::TypeMismatch { expected, .. } => {
            Some(format!("Expected value of type: {}", expected))
        }
        ViolationKind::RangeViolation { constraint } => {
            Some(format!("Use a value {}", constraint))
        }
        ViolationKind::EmptyCollection if violation.path == "predio" => {
            Some("Include at least one property record in 'predio'".to_string())
        }
        _ => None,
    }
}
