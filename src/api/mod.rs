//! HTTP surface of the document generator

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::Config;

pub mod context;
pub mod error;
pub mod generate;
mod health;
pub mod templates;

pub use context::ApiContext;
pub use error::{ApiError, ErrorResponse};

/// Bind the configured port and serve until interrupted
pub async fn setup_and_serve(context: ApiContext) -> std::io::Result<()> {
    let port = context.config.port;
    let app = router(context);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!(port, "cadastral document generator listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Application router with CORS, body limit and request tracing applied
pub fn router(context: ApiContext) -> Router {
    let cors = cors_layer(&context.config);
    let limit = context.config.max_upload_bytes;

    Router::new()
        .route("/generate-document", post(generate::handler))
        .route("/templates", get(templates::handler))
        .with_state(context)
        .layer(DefaultBodyLimit::max(limit))
        .merge(health::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin=%origin, error=?e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error=?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
