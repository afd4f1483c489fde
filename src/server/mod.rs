//! HTTP surface: health checks and the prediction endpoint.
//!
//! Request bodies are only shape-checked; numeric ranges are not enforced.
//! Bodies are never logged.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::adapters::artifacts::load_artifacts;
use crate::application::InferenceService;
use crate::config::ServiceConfig;
use crate::domain::{EncodeError, InferenceError, PatientRecord, PredictionResult};
use crate::ports::{Classifier, Scaler};

pub const HEALTH_MESSAGE: &str = "Heart Disease API running.";

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error half of a handler result.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn rejected(rejection: &JsonRejection) -> Self {
        let (status, detail) = match rejection {
            JsonRejection::MissingJsonContentType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Expected request with `Content-Type: application/json`",
            ),
            JsonRejection::JsonSyntaxError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Malformed JSON body")
            }
            JsonRejection::JsonDataError(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Request body is missing a field or has a field of the wrong type",
            ),
            _ => (StatusCode::UNPROCESSABLE_ENTITY, "Unreadable request body"),
        };
        // Rejection texts can quote offending values; only the status is logged.
        tracing::debug!("Rejected prediction request with status {}", status);
        Self {
            status,
            detail: detail.to_string(),
        }
    }

    fn internal(error: &InferenceError) -> Self {
        let kind = match error {
            InferenceError::Encode(EncodeError::SchemaMismatch { .. }) => "schema mismatch",
            InferenceError::DimensionMismatch { .. } => "dimension mismatch",
            InferenceError::NonFinite { .. } => "non-finite value",
        };
        tracing::error!("Prediction failed: {}", kind);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

/// Build the router around a shared inference service.
pub fn router<S, C>(service: Arc<InferenceService<S, C>>) -> Router
where
    S: Scaler + 'static,
    C: Classifier + 'static,
{
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/predict", post(predict::<S, C>))
        .with_state(service)
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        message: HEALTH_MESSAGE,
    })
}

async fn predict<S, C>(
    State(service): State<Arc<InferenceService<S, C>>>,
    payload: Result<Json<PatientRecord>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError>
where
    S: Scaler + 'static,
    C: Classifier + 'static,
{
    let Json(record) = payload.map_err(|r| ApiError::rejected(&r))?;
    let result = service.predict(&record).map_err(|e| ApiError::internal(&e))?;
    Ok(Json(result))
}

/// Load the artifact set, bind, and serve until Ctrl-C.
///
/// # Errors
/// Returns `HeartRiskError::Artifact` or `Validation` if the artifacts cannot
/// back a service, and `Io` on bind or accept failure.
pub async fn run(config: ServiceConfig) -> crate::Result<()> {
    let service = load_artifacts(&config.artifact_dir, &config.artifact_policy)?.into_service()?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
