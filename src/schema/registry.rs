//! Embedded JSON schemas

use rust_embed::Embed;
use std::borrow::Cow;
use std::collections::HashMap;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// File name of the generation request schema
pub const GENERATION_REQUEST_SCHEMA: &str = "generation_request.schema.json";

/// Registry of schema documents keyed by file name
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Build an empty registry (use [`SchemaRegistry::default`] for the embedded set)
    pub fn empty() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Register or replace a schema document
    pub fn insert(&mut self, name: impl Into<String>, schema: impl Into<String>) {
        self.schemas.insert(name.into(), schema.into());
    }

    /// Get a schema document by file name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.schemas.get(name).map(String::as_str)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        for file in EmbeddedSchemas::iter() {
            let name: &str = file.as_ref();
            if let Some(content) = EmbeddedSchemas::get(name) {
                if let Ok(text) = std::str::from_utf8(&content.data) {
                    registry.insert(name, text);
                }
            }
        }

        registry
    }
}

/// Raw bytes of an embedded schema, for `cdg validate --print-schema`
pub fn embedded_schema(name: &str) -> Option<Cow<'static, [u8]>> {
    EmbeddedSchemas::get(name).map(|file| file.data)
}
