//! CDG: Cadastral Document Generator
//!
//! Validates cadastral property records supplied as JSON and merges them
//! into `.docx` templates, served over HTTP or run from the command line.

pub mod api;
pub mod cli;
pub mod core;
pub mod entities;
pub mod render;
pub mod schema;
