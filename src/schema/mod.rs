//! Schema system - embedded schemas, payload validation and diagnostics

pub mod diagnostics;
pub mod registry;
pub mod validator;

pub use registry::SchemaRegistry;
pub use validator::{SchemaError, ValidationError, Validator, Violation, ViolationKind};
