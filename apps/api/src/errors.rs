use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::StageFailure;
use crate::source::DataSourceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] StageFailure),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::DataSource(e) => {
                tracing::error!("data source error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATA_SOURCE_ERROR",
                    e.to_string(),
                )
            }
            AppError::Pipeline(e) => {
                tracing::error!("pipeline error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STAGE_FAILURE",
                    format!("screening run aborted: {e}"),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
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
