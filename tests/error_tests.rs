// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::to_bytes,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use garmin_insights::error::AppError;
use serde_json::Value;

#[test]
fn test_is_session_expired_matches() {
    let err = AppError::Authentication(AppError::SESSION_EXPIRED.to_string());
    assert!(err.is_session_expired());
}

#[test]
fn test_is_session_expired_no_match() {
    let err = AppError::Authentication("Garmin rejected the account credentials".to_string());
    assert!(!err.is_session_expired());

    let err = AppError::UpstreamUnavailable(AppError::SESSION_EXPIRED.to_string());
    assert!(!err.is_session_expired());
}

#[test]
fn test_only_upstream_failures_are_retryable() {
    assert!(AppError::UpstreamUnavailable("HTTP 503".to_string()).is_retryable());

    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert!(!AppError::NoDataForDate(date).is_retryable());
    assert!(!AppError::Authentication("nope".to_string()).is_retryable());
    assert!(!AppError::DivisionUndefined("steps").is_retryable());
    assert!(!AppError::BadRequest("bad".to_string()).is_retryable());
}

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_status_mapping() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let cases = [
        (
            AppError::Authentication("x".to_string()),
            StatusCode::UNAUTHORIZED,
            "authentication_failed",
        ),
        (
            AppError::UpstreamUnavailable("x".to_string()),
            StatusCode::SERVICE_UNAVAILABLE,
            "upstream_unavailable",
        ),
        (
            AppError::NoDataForDate(date),
            StatusCode::NOT_FOUND,
            "no_data_for_date",
        ),
        (
            AppError::DivisionUndefined("steps"),
            StatusCode::UNPROCESSABLE_ENTITY,
            "division_undefined",
        ),
        (
            AppError::InsufficientData("awake count"),
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_data",
        ),
        (
            AppError::BadRequest("x".to_string()),
            StatusCode::BAD_REQUEST,
            "bad_request",
        ),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
        ),
    ];

    for (err, status, code) in cases {
        let (actual_status, body) = render(err).await;
        assert_eq!(actual_status, status);
        assert_eq!(body["error"], code);
    }
}

#[tokio::test]
async fn test_details_name_the_missing_day() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let (_, body) = render(AppError::NoDataForDate(date)).await;
    assert_eq!(body["details"], "No data recorded for 2024-06-01");
}

#[tokio::test]
async fn test_internal_details_are_hidden() {
    let (_, body) = render(AppError::Internal(anyhow::anyhow!("secret stack"))).await;
    assert!(body.get("details").is_none());
}
