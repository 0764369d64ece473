//! HTTP handlers for the syllabus server
//!
//! - `GET /` serves the form
//! - `POST /generate` fills the template and returns it as a download
//! - `GET /health` reports liveness

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use syllabus_core::{render_template, DocxError, FieldMap, FormSubmission, DOCX_MIME_TYPE};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::error::ServerError;
use crate::AppState;

/// Filename offered to the browser for the generated document
pub const DOWNLOAD_FILENAME: &str = "Course_Syllabus.docx";

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/generate", post(handle_generate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "syllabus-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler: POST /generate
///
/// The body is decoded as ordered pairs so repeated `objective` keys keep
/// their order.
pub async fn handle_generate(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let submission = FormSubmission::from_pairs(pairs);
    info!(
        "Generate request: {} field(s), {} objective(s)",
        submission.fields().len(),
        submission.objectives().len()
    );

    let recorder = Arc::clone(&state.recorder);
    let template_path = state.template_path.clone();

    let bytes = tokio::task::spawn_blocking(move || {
        if let Err(e) = recorder.record(submission.fields()) {
            warn!("Failed to record form fields: {}", e);
        }
        generate(template_path, &submission.into_field_map())
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Generation task panicked: {}", e)))??;

    info!("Generated document ({} bytes)", bytes.len());

    let disposition = format!("attachment; filename=\"{}\"", DOWNLOAD_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Read the template fresh, fill it, and serialize it
fn generate(template_path: PathBuf, fields: &FieldMap) -> Result<Vec<u8>, ServerError> {
    let template = std::fs::read(&template_path).map_err(|e| {
        let e = DocxError::from(e);
        if e.is_not_found() {
            ServerError::TemplateNotFound(template_path.display().to_string())
        } else {
            ServerError::Template(e)
        }
    })?;

    Ok(render_template(&template, fields)?)
}
