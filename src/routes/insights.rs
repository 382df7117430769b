// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Insight routes: `/insights/{family}/{metric}?date=YYYY-MM-DD`.

use crate::error::{AppError, Result};
use crate::insights::{self, activity, sleep, HealthStatus, Insight};
use crate::models::InsightValue;
use crate::time_utils::{parse_calendar_date, today_utc};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/insights/activity/health", get(activity_health))
        .route("/insights/sleep/health", get(sleep_health))
        .route("/insights/{family}/{metric}", get(get_insight))
}

#[derive(Deserialize)]
struct InsightQuery {
    /// Calendar day (defaults to today, UTC)
    date: Option<String>,
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(today_utc()),
        Some(raw) => parse_calendar_date(raw).ok_or_else(|| {
            AppError::BadRequest("Invalid 'date' parameter: must be YYYY-MM-DD".to_string())
        }),
    }
}

/// Compute one insight for one day.
async fn get_insight(
    State(state): State<Arc<AppState>>,
    Path((family, metric)): Path<(String, String)>,
    Query(params): Query<InsightQuery>,
) -> Result<Json<InsightValue>> {
    let insight = Insight::parse(&family, &metric)?;
    let date = parse_date(params.date.as_deref())?;

    tracing::debug!(insight = %insight, date = %date, "Computing insight");

    let value = insights::compute(&state.garmin, &state.config.insights, insight, date).await?;
    Ok(Json(value))
}

// ─── Health ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FamilyHealthResponse {
    pub family: &'static str,
    pub status: HealthStatus,
}

async fn activity_health() -> Json<FamilyHealthResponse> {
    Json(FamilyHealthResponse {
        family: activity::FAMILY,
        status: activity::health(),
    })
}

async fn sleep_health() -> Json<FamilyHealthResponse> {
    Json(FamilyHealthResponse {
        family: sleep::FAMILY,
        status: sleep::health(),
    })
}
