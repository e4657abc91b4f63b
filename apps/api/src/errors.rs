use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::recommender::RecommenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Recommender error: {0}")]
    Recommender(#[from] RecommenderError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Recommender(RecommenderError::Api { status, message })
                if (400..=499).contains(status) && *status != 429 =>
            {
                tracing::warn!("Recommender rejected the profile ({status}): {message}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "RECOMMENDER_REJECTED",
                    message.clone(),
                )
            }
            AppError::Recommender(RecommenderError::EmptyPrediction) => {
                tracing::error!("Recommender returned an empty prediction");
                (
                    StatusCode::BAD_GATEWAY,
                    "RECOMMENDER_ERROR",
                    "The recommendation service returned no career".to_string(),
                )
            }
            AppError::Recommender(e) => {
                tracing::error!("Recommender error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "RECOMMENDER_ERROR",
                    "The recommendation service could not be reached".to_string(),
                )
            }
            AppError::Export(ExportError::Precondition(_)) => {
                (StatusCode::BAD_REQUEST, "EXPORT_PRECONDITION", self.to_string())
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR", e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
