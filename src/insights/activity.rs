// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity insights derived from a daily summary.

use super::{percentage, ratio, HealthStatus};
use crate::error::{AppError, Result};
use crate::models::{InsightValue, Metric, RawActivityRecord};
use std::str::FromStr;

pub const FAMILY: &str = "activity";

const METERS_PER_KM: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityInsight {
    StepGoalPercent,
    CaloriesPerStep,
    CaloriesPerKm,
    StrideLength,
    SedentaryRatio,
    StepsPerKm,
    ActiveMinutesPercent,
    CaloriesPerActiveMin,
}

impl ActivityInsight {
    pub const ALL: [ActivityInsight; 8] = [
        ActivityInsight::StepGoalPercent,
        ActivityInsight::CaloriesPerStep,
        ActivityInsight::CaloriesPerKm,
        ActivityInsight::StrideLength,
        ActivityInsight::SedentaryRatio,
        ActivityInsight::StepsPerKm,
        ActivityInsight::ActiveMinutesPercent,
        ActivityInsight::CaloriesPerActiveMin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityInsight::StepGoalPercent => "step_goal_percent",
            ActivityInsight::CaloriesPerStep => "calories_per_step",
            ActivityInsight::CaloriesPerKm => "calories_per_km",
            ActivityInsight::StrideLength => "stride_length",
            ActivityInsight::SedentaryRatio => "sedentary_ratio",
            ActivityInsight::StepsPerKm => "steps_per_km",
            ActivityInsight::ActiveMinutesPercent => "active_minutes_percent",
            ActivityInsight::CaloriesPerActiveMin => "calories_per_active_min",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ActivityInsight::StepGoalPercent | ActivityInsight::ActiveMinutesPercent => "%",
            ActivityInsight::CaloriesPerStep => "kcal/step",
            ActivityInsight::CaloriesPerKm => "kcal/km",
            ActivityInsight::StrideLength => "m/step",
            ActivityInsight::SedentaryRatio => "ratio",
            ActivityInsight::StepsPerKm => "steps/km",
            ActivityInsight::CaloriesPerActiveMin => "kcal/min",
        }
    }

    /// Compute this insight for one record.
    pub fn evaluate(self, record: &RawActivityRecord) -> Result<InsightValue> {
        let value = match self {
            ActivityInsight::StepGoalPercent => step_goal_percent(record)?,
            ActivityInsight::CaloriesPerStep => calories_per_step(record)?,
            ActivityInsight::CaloriesPerKm => calories_per_km(record)?,
            ActivityInsight::StrideLength => stride_length(record)?,
            ActivityInsight::SedentaryRatio => sedentary_ratio(record)?,
            ActivityInsight::StepsPerKm => steps_per_km(record)?,
            ActivityInsight::ActiveMinutesPercent => active_minutes_percent(record)?,
            ActivityInsight::CaloriesPerActiveMin => calories_per_active_min(record)?,
        };

        Ok(InsightValue::Scalar(Metric::new(
            value,
            self.unit(),
            self.describe(value, record),
        )))
    }

    fn describe(self, value: f64, record: &RawActivityRecord) -> String {
        match self {
            ActivityInsight::StepGoalPercent => format!(
                "Step goal progress: {:.2}% ({} / {} steps)",
                value, record.steps, record.step_goal
            ),
            ActivityInsight::CaloriesPerStep => {
                format!("Average calories per step: {:.2} kcal/step", value)
            }
            ActivityInsight::CaloriesPerKm => {
                format!("Average calories per kilometer: {:.2} kcal/km", value)
            }
            ActivityInsight::StrideLength => {
                format!("Average stride length: {:.2} meters per step", value)
            }
            ActivityInsight::SedentaryRatio => format!(
                "Sedentary time ratio: {:.2} ({:.0} min sedentary / {:.0} min tracked)",
                value, record.sedentary_minutes, record.total_tracked_minutes
            ),
            ActivityInsight::StepsPerKm => {
                format!("Average steps per kilometer: {:.2} steps/km", value)
            }
            ActivityInsight::ActiveMinutesPercent => format!(
                "Active time percentage: {:.2}% ({:.0} min active / {:.0} min tracked)",
                value, record.active_minutes, record.total_tracked_minutes
            ),
            ActivityInsight::CaloriesPerActiveMin => {
                format!("Average calories per active minute: {:.2} kcal/min", value)
            }
        }
    }
}

impl FromStr for ActivityInsight {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|insight| insight.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown activity insight '{}'", s)))
    }
}

pub fn health() -> HealthStatus {
    HealthStatus::Healthy
}

/// steps / step goal * 100
pub fn step_goal_percent(record: &RawActivityRecord) -> Result<f64> {
    percentage(record.steps.into(), record.step_goal.into(), "step goal")
}

/// total kcal / steps
pub fn calories_per_step(record: &RawActivityRecord) -> Result<f64> {
    ratio(record.total_calories, record.steps.into(), "steps")
}

/// total kcal / km
pub fn calories_per_km(record: &RawActivityRecord) -> Result<f64> {
    ratio(
        record.total_calories,
        record.distance_meters / METERS_PER_KM,
        "distance",
    )
}

/// meters / step
pub fn stride_length(record: &RawActivityRecord) -> Result<f64> {
    ratio(record.distance_meters, record.steps.into(), "steps")
}

/// Sedentary share of tracked time, 0-1.
pub fn sedentary_ratio(record: &RawActivityRecord) -> Result<f64> {
    ratio(
        record.sedentary_minutes,
        record.total_tracked_minutes,
        "total tracked minutes",
    )
}

pub fn steps_per_km(record: &RawActivityRecord) -> Result<f64> {
    ratio(
        record.steps.into(),
        record.distance_meters / METERS_PER_KM,
        "distance",
    )
}

pub fn active_minutes_percent(record: &RawActivityRecord) -> Result<f64> {
    percentage(
        record.active_minutes,
        record.total_tracked_minutes,
        "total tracked minutes",
    )
}

pub fn calories_per_active_min(record: &RawActivityRecord) -> Result<f64> {
    ratio(
        record.active_calories,
        record.active_minutes,
        "active minutes",
    )
}
