use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::models::PeriodRecord;

/// Error taxonomy: validation failures are rejected synchronously with a
/// user-facing message and no state change; persistence failures are logged
/// and surfaced as a 500. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("dates in the future cannot be recorded")]
    FutureDate,
    #[error("a period already covers the selected date")]
    PeriodExists(PeriodRecord),
    #[error("a period started on {0} is still open; end it or delete it first")]
    OpenPeriod(NaiveDate),
    #[error("no period start has been chosen yet")]
    NoPendingStart,
    #[error("the end date cannot be before the start date")]
    EndBeforeStart,
    #[error("choose start and end dates before saving")]
    NothingToSave,
    #[error("{0}")]
    Invalid(String),
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::PeriodExists(existing) => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "a period already covers the selected date; delete it instead",
                    "existing": existing,
                })),
            )
                .into_response(),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "record not found" })),
            )
                .into_response(),
            AppError::Storage(e) => {
                tracing::error!("❌ storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "storage error" })),
                )
                    .into_response()
            }
            other => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": other.to_string() })),
            )
                .into_response(),
        }
    }
}
