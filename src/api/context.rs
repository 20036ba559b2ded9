use std::sync::Arc;

use crate::core::Config;
use crate::render::{DocumentRenderer, DocxRenderer, TemplateStore};
use crate::schema::{SchemaError, Validator};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<Config>,
    pub validator: Arc<Validator>,
    pub templates: TemplateStore,
    pub renderer: Arc<dyn DocumentRenderer>,
}

impl ApiContext {
    /// Context with the embedded schema and the bundled `.docx` renderer
    pub fn new(config: Config) -> Result<Self, SchemaError> {
        Ok(Self::with_renderer(
            config,
            Validator::embedded()?,
            Arc::new(DocxRenderer),
        ))
    }

    pub fn with_renderer(
        config: Config,
        validator: Validator,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        let templates = TemplateStore::new(config.templates_dir.clone());
        Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
            templates,
            renderer,
        }
    }
}
