//! `GET /templates`

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::context::ApiContext;
use crate::api::error::ApiError;

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub default: String,
    pub templates: Vec<String>,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ApiContext>,
) -> Result<Json<TemplateListResponse>, ApiError> {
    let templates = state.templates.list()?;

    Ok(Json(TemplateListResponse {
        default: state.config.default_template.clone(),
        templates,
    }))
}
