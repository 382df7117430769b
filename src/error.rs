// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Garmin API unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("No data recorded for {0}")]
    NoDataForDate(NaiveDate),

    #[error("Division undefined: {0} is zero")]
    DivisionUndefined(&'static str),

    #[error("Insufficient data: {0} not available")]
    InsufficientData(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Marker message for an upstream 401 on a data request (session expired).
    pub const SESSION_EXPIRED: &'static str = "Session expired";

    /// Whether the error is a transient upstream failure worth one retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::UpstreamUnavailable(_))
    }

    /// Whether the upstream rejected our session token on a data request.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::Authentication(msg) if msg == Self::SESSION_EXPIRED)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Authentication(msg) => {
                tracing::warn!(error = %msg, "Garmin authentication failed");
                (StatusCode::UNAUTHORIZED, "authentication_failed", None)
            }
            AppError::UpstreamUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "upstream_unavailable",
                Some(msg.clone()),
            ),
            AppError::NoDataForDate(_) => {
                (StatusCode::NOT_FOUND, "no_data_for_date", Some(self.to_string()))
            }
            AppError::DivisionUndefined(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "division_undefined",
                Some(self.to_string()),
            ),
            AppError::InsufficientData(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_data",
                Some(self.to_string()),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers and services
pub type Result<T> = std::result::Result<T, AppError>;
