//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error responses so every
//! endpoint fails the same way. The `code` field lets a client distinguish
//! "your chosen slot was just taken" (reselect) from "nothing was booked,
//! try again" (retry) without parsing messages.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use slotbook_core::errors::ScheduleError;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `ScheduleError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub ScheduleError);

impl AppError {
    /// Stable machine-readable identifier for the error class.
    fn code(&self) -> &'static str {
        match &self.0 {
            ScheduleError::InvalidTimeZone(_) => "invalid_time_zone",
            ScheduleError::RegistryUnavailable(_) => "registry_unavailable",
            ScheduleError::SlotNoLongerAvailable { .. } => "slot_no_longer_available",
            ScheduleError::CommitFailed(_) => "commit_failed",
            ScheduleError::InvalidTransition { .. } => "invalid_transition",
            ScheduleError::Validation(_) => "validation",
            ScheduleError::NotFound(_) => "not_found",
            ScheduleError::Database(_) => "database",
        }
    }
}

/// Converts application errors to HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            ScheduleError::InvalidTimeZone(_) => StatusCode::BAD_REQUEST,
            ScheduleError::Validation(_) => StatusCode::BAD_REQUEST,
            ScheduleError::NotFound(_) => StatusCode::NOT_FOUND,
            ScheduleError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ScheduleError::SlotNoLongerAvailable { .. } => StatusCode::CONFLICT,
            ScheduleError::RegistryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScheduleError::CommitFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScheduleError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.0.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

/// Automatic conversion from ScheduleError to AppError
///
/// Allows using the `?` operator with functions that return
/// `Result<T, ScheduleError>` in handlers returning `Result<T, AppError>`.
impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// Wraps the eyre error in a ScheduleError::Database variant.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ScheduleError::Database(err))
    }
}
