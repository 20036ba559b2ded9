//! `POST /generate-document`

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use ulid::Ulid;

use crate::api::context::ApiContext;
use crate::api::error::ApiError;
use crate::core::{content_disposition, normalize_output_name, DOCX_CONTENT_TYPE};
use crate::render::build_context;

/// File name reported for a JSON body sent without a multipart wrapper
const BODY_FILENAME: &str = "request.json";

enum Upload {
    Json,
    Multipart,
}

#[tracing::instrument(skip(state, request), fields(request_id = %Ulid::new()))]
pub async fn handler(
    State(state): State<ApiContext>,
    request: Request,
) -> Result<Response, ApiError> {
    let upload = upload_kind(request.headers())?;

    let limit = state.config.max_upload_bytes;
    let (parts, body) = request.into_parts();
    let bytes = read_limited(body, limit).await?;

    let (filename, payload) = match upload {
        Upload::Json => (BODY_FILENAME.to_string(), bytes),
        Upload::Multipart => {
            let request = Request::from_parts(parts, Body::from(bytes));
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| ApiError::MalformedUpload(e.body_text()))?;
            json_file_part(multipart, limit).await?
        }
    };

    let generation = state.validator.validate(&payload, &filename)?;

    let template_id = generation.template_or(&state.config.default_template);
    let template = state.templates.resolve(template_id)?;
    let output_name = normalize_output_name(&generation.output_file_name);
    let context = build_context(&generation, chrono::Local::now().date_naive());

    tracing::info!(
        template=%template.display(),
        output=%output_name,
        properties=generation.properties.len(),
        "rendering document"
    );

    let renderer = state.renderer.clone();
    let document = tokio::task::spawn_blocking(move || renderer.render(&template, &context))
        .await
        .map_err(|e| ApiError::RenderTask(e.to_string()))??;

    tracing::info!(output=%output_name, bytes=document.len(), "document generated");

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (CONTENT_DISPOSITION, content_disposition(&output_name)),
        ],
        document,
    )
        .into_response())
}

fn upload_kind(headers: &HeaderMap) -> Result<Upload, ApiError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "multipart/form-data" {
        Ok(Upload::Multipart)
    } else if essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
    {
        Ok(Upload::Json)
    } else if essence.is_empty() {
        Err(ApiError::UnsupportedMediaType("missing Content-Type".to_string()))
    } else {
        Err(ApiError::UnsupportedMediaType(essence))
    }
}

async fn read_limited(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ApiError::PayloadTooLarge { limit })
        }
        Err(e) => Err(ApiError::MalformedUpload(e.to_string())),
    }
}

/// The single `.json` file part of a multipart upload
async fn json_file_part(
    mut multipart: Multipart,
    limit: usize,
) -> Result<(String, Bytes), ApiError> {
    let mut found: Option<(String, Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e, limit)),
        };

        // Plain form fields carry no file name and are ignored
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if !filename.to_lowercase().ends_with(".json") {
            return Err(ApiError::UnsupportedMediaType(format!(
                "uploaded file {:?} is not a .json file",
                filename
            )));
        }
        if found.is_some() {
            return Err(ApiError::UnsupportedMediaType(
                "expected exactly one uploaded file".to_string(),
            ));
        }

        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        found = Some((filename, data));
    }

    found.ok_or_else(|| ApiError::UnsupportedMediaType("no .json file part in upload".to_string()))
}

fn multipart_error(error: axum::extract::multipart::MultipartError, limit: usize) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::MalformedUpload(error.body_text())
    }
}
