use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use shipcheck_core::{inspect_batch, inspect_upload, ImageUpload, InspectionError, VisionClient};
use shipcheck_logging::redact_sensitive_data;

use crate::config::Config;
use crate::cors::cors_layer;

/// Shared application state for API handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<dyn VisionClient>,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = match state.config.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api/health", post(health))
        .route("/api/analyze", post(analyze))
        .route("/api/analyze/batch", post(analyze_batch))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Failures surfaced by the analysis endpoints.
#[derive(Debug)]
pub enum ApiError {
    Rejected(MultipartRejection),
    Multipart(MultipartError),
    MissingField(&'static str),
    /// Upstream call failed; already logged, answered with a bare 500.
    Upstream(anyhow::Error),
}

impl ApiError {
    fn upstream(err: anyhow::Error) -> Self {
        error!(error = %redact_sensitive_data(&format!("{err:#}")), "Inspection failed");
        Self::Upstream(err)
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(rejection) => {
                (rejection.status(), Json(json!({ "error": rejection.body_text() }))).into_response()
            }
            Self::Multipart(err) => {
                (err.status(), Json(json!({ "error": err.body_text() }))).into_response()
            }
            Self::MissingField(name) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": format!("missing multipart field `{name}`") })),
            )
                .into_response(),
            Self::Upstream(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "model": state.config.model,
    }))
}

/// Inspect a single uploaded photo (multipart field `file`).
async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let span = info_span!("analyze", request_id = %Uuid::new_v4());
    async move {
        if !state.config.has_api_key() {
            return Ok(missing_credential());
        }

        let upload = read_uploads(multipart?, "file")
            .await?
            .into_iter()
            .next()
            .ok_or(ApiError::MissingField("file"))?;

        let result = inspect_upload(state.client.as_ref(), &upload)
            .await
            .map_err(ApiError::upstream)?;
        Ok(Json(result).into_response())
    }
    .instrument(span)
    .await
}

/// Inspect several photos (repeated multipart field `files`), in upload order.
async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let span = info_span!("analyze_batch", request_id = %Uuid::new_v4());
    async move {
        if !state.config.has_api_key() {
            return Ok(missing_credential());
        }

        let uploads = read_uploads(multipart?, "files").await?;
        if uploads.is_empty() {
            return Err(ApiError::MissingField("files"));
        }
        info!(files = uploads.len(), "Batch received");

        let report = inspect_batch(state.client.as_ref(), &uploads)
            .await
            .map_err(ApiError::upstream)?;
        Ok(Json(report).into_response())
    }
    .instrument(span)
    .await
}

fn missing_credential() -> Response {
    warn!("Rejecting analysis request: no upstream credential configured");
    Json(json!({ "error": InspectionError::MissingCredential.to_string() })).into_response()
}

/// Collect every file under `field_name`, in stream order. Other fields are skipped.
async fn read_uploads(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Vec<ImageUpload>, ApiError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        uploads.push(ImageUpload::new(filename, bytes));
    }
    Ok(uploads)
}
