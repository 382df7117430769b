// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived health metrics.
//!
//! Every insight is a pure function of one raw record. [`Insight`] is the
//! closed set of names the API exposes; [`compute`] fetches the record the
//! insight needs and evaluates it.

pub mod activity;
pub mod sleep;

pub use activity::ActivityInsight;
pub use sleep::SleepInsight;

use crate::config::InsightsConfig;
use crate::error::{AppError, Result};
use crate::models::InsightValue;
use crate::services::GarminService;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// A named insight from either family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insight {
    Activity(ActivityInsight),
    Sleep(SleepInsight),
}

impl Insight {
    /// Resolve a `family`/`name` pair such as `sleep`/`sleep_efficiency`.
    pub fn parse(family: &str, name: &str) -> Result<Self> {
        match family {
            activity::FAMILY => name.parse().map(Insight::Activity),
            sleep::FAMILY => name.parse().map(Insight::Sleep),
            other => Err(AppError::BadRequest(format!(
                "Unknown insight family '{}'",
                other
            ))),
        }
    }

    pub fn family(self) -> &'static str {
        match self {
            Insight::Activity(_) => activity::FAMILY,
            Insight::Sleep(_) => sleep::FAMILY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Insight::Activity(a) => a.as_str(),
            Insight::Sleep(s) => s.as_str(),
        }
    }

    /// Every insight, activity first.
    pub fn all() -> impl Iterator<Item = Insight> {
        ActivityInsight::ALL
            .into_iter()
            .map(Insight::Activity)
            .chain(SleepInsight::ALL.into_iter().map(Insight::Sleep))
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family(), self.name())
    }
}

/// Fetch the record an insight depends on and evaluate it for `date`.
pub async fn compute(
    garmin: &GarminService,
    config: &InsightsConfig,
    insight: Insight,
    date: NaiveDate,
) -> Result<InsightValue> {
    match insight {
        Insight::Activity(which) => {
            let record = garmin.get_activity(date).await?;
            which.evaluate(&record)
        }
        Insight::Sleep(which) => {
            let record = garmin.get_sleep(date).await?;
            which.evaluate(&record, config)
        }
    }
}

/// Static liveness signal for a calculator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// `numerator / denominator`, refusing a zero denominator.
pub(crate) fn ratio(numerator: f64, denominator: f64, what: &'static str) -> Result<f64> {
    if denominator == 0.0 {
        return Err(AppError::DivisionUndefined(what));
    }
    Ok(numerator / denominator)
}

/// `value / total * 100`, refusing a zero total.
pub(crate) fn percentage(value: f64, total: f64, what: &'static str) -> Result<f64> {
    Ok(ratio(value, total, what)? * 100.0)
}
