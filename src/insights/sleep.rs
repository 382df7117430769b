// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sleep insights derived from a nightly sleep summary.
//!
//! Stage percentages are relative to total sleep time, so a night with no
//! recorded sleep yields [`AppError::DivisionUndefined`] for all of them.
//!
//! # Fragmentation index
//!
//! Disruptions per hour of sleep, `rate = (awakenings + stage transitions) /
//! sleep hours`, squashed onto `[0, 100)` as `100 * rate / (rate + K)`. `K` is
//! the configured half-saturation constant (6 events/hour by default), so a
//! night with `K` disruptions per hour scores exactly 50.
//!
//! # Stage composition
//!
//! Each stage is compared against its configured reference range. The label
//! reports the first stage out of range, checking deficits before excesses
//! and stages in deep, REM, light order. The quality score averages
//! per-stage scores that fall off linearly from the ideal mix
//! (24.5% deep, 47% light, 26% REM).

use super::{percentage, ratio, HealthStatus};
use crate::config::{InsightsConfig, PercentRange, StageThresholds};
use crate::error::{AppError, Result};
use crate::models::{CompositionLabel, InsightValue, Metric, RawSleepRecord, StageComposition};
use std::str::FromStr;

pub const FAMILY: &str = "sleep";

const MINUTES_PER_HOUR: f64 = 60.0;

// Ideal stage mix and how fast each stage's score decays per point of deviation.
const IDEAL_DEEP_PERCENT: f64 = 24.5;
const IDEAL_LIGHT_PERCENT: f64 = 47.0;
const IDEAL_REM_PERCENT: f64 = 26.0;
const DEEP_SCORE_SLOPE: f64 = 2.0;
const LIGHT_SCORE_SLOPE: f64 = 1.5;
const REM_SCORE_SLOPE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepInsight {
    TimeInBed,
    SleepEfficiency,
    AwakeningsPerHour,
    DeepSleepPercent,
    RemSleepPercent,
    LightSleepPercent,
    SleepFragmentationIndex,
    StageCompositionAnalysis,
    SleepNeedGapMinutes,
}

impl SleepInsight {
    pub const ALL: [SleepInsight; 9] = [
        SleepInsight::TimeInBed,
        SleepInsight::SleepEfficiency,
        SleepInsight::AwakeningsPerHour,
        SleepInsight::DeepSleepPercent,
        SleepInsight::RemSleepPercent,
        SleepInsight::LightSleepPercent,
        SleepInsight::SleepFragmentationIndex,
        SleepInsight::StageCompositionAnalysis,
        SleepInsight::SleepNeedGapMinutes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SleepInsight::TimeInBed => "time_in_bed",
            SleepInsight::SleepEfficiency => "sleep_efficiency",
            SleepInsight::AwakeningsPerHour => "awakenings_per_hour",
            SleepInsight::DeepSleepPercent => "deep_sleep_percent",
            SleepInsight::RemSleepPercent => "rem_sleep_percent",
            SleepInsight::LightSleepPercent => "light_sleep_percent",
            SleepInsight::SleepFragmentationIndex => "sleep_fragmentation_index",
            SleepInsight::StageCompositionAnalysis => "stage_composition_analysis",
            SleepInsight::SleepNeedGapMinutes => "sleep_need_gap_minutes",
        }
    }

    /// Compute this insight for one night.
    pub fn evaluate(self, record: &RawSleepRecord, config: &InsightsConfig) -> Result<InsightValue> {
        let metric = match self {
            SleepInsight::TimeInBed => {
                let minutes = time_in_bed(record);
                Metric::new(
                    minutes,
                    "minutes",
                    format!(
                        "Total time in bed: {:.2} minutes ({:.2} hours)",
                        minutes,
                        minutes / MINUTES_PER_HOUR
                    ),
                )
            }
            SleepInsight::SleepEfficiency => {
                let value = sleep_efficiency(record)?;
                Metric::new(
                    value,
                    "%",
                    format!("Sleep efficiency: {:.2}% of time in bed spent sleeping", value),
                )
            }
            SleepInsight::AwakeningsPerHour => {
                let value = awakenings_per_hour(record)?;
                Metric::new(
                    value,
                    "awakenings/hour",
                    format!("Average {:.2} awakenings per hour of sleep", value),
                )
            }
            SleepInsight::DeepSleepPercent => {
                let value = deep_sleep_percent(record)?;
                Metric::new(value, "%", format!("Deep sleep percent: {:.2}%", value))
            }
            SleepInsight::RemSleepPercent => {
                let value = rem_sleep_percent(record)?;
                Metric::new(value, "%", format!("REM sleep percent: {:.2}%", value))
            }
            SleepInsight::LightSleepPercent => {
                let value = light_sleep_percent(record)?;
                Metric::new(value, "%", format!("Light sleep percent: {:.2}%", value))
            }
            SleepInsight::SleepFragmentationIndex => {
                let value =
                    sleep_fragmentation_index(record, config.fragmentation_half_saturation)?;
                Metric::new(
                    value,
                    "index (0-100)",
                    format!("Sleep fragmentation index: {:.2} (lower is better)", value),
                )
            }
            SleepInsight::StageCompositionAnalysis => {
                return stage_composition_analysis(record, &config.thresholds)
                    .map(InsightValue::Composition);
            }
            SleepInsight::SleepNeedGapMinutes => {
                let value = sleep_need_gap_minutes(record)?;
                Metric::new(
                    value,
                    "minutes",
                    format!(
                        "Sleep need gap: {:.2} minutes (negative = deficit, positive = surplus)",
                        value
                    ),
                )
            }
        };

        Ok(InsightValue::Scalar(metric))
    }
}

impl FromStr for SleepInsight {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|insight| insight.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown sleep insight '{}'", s)))
    }
}

pub fn health() -> HealthStatus {
    HealthStatus::Healthy
}

pub fn time_in_bed(record: &RawSleepRecord) -> f64 {
    record.time_in_bed_minutes
}

pub fn sleep_efficiency(record: &RawSleepRecord) -> Result<f64> {
    percentage(
        record.total_sleep_minutes,
        record.time_in_bed_minutes,
        "time in bed",
    )
}

pub fn awakenings_per_hour(record: &RawSleepRecord) -> Result<f64> {
    let awakenings = record
        .awake_count
        .ok_or(AppError::InsufficientData("awake count"))?;
    ratio(awakenings.into(), sleep_hours(record), "total sleep")
}

pub fn deep_sleep_percent(record: &RawSleepRecord) -> Result<f64> {
    stage_percent(record.deep_minutes, record)
}

pub fn rem_sleep_percent(record: &RawSleepRecord) -> Result<f64> {
    stage_percent(record.rem_minutes, record)
}

pub fn light_sleep_percent(record: &RawSleepRecord) -> Result<f64> {
    stage_percent(record.light_minutes, record)
}

/// Bounded disruption score, see the module docs.
pub fn sleep_fragmentation_index(record: &RawSleepRecord, half_saturation: f64) -> Result<f64> {
    let events = match (record.awake_count, record.stage_transitions) {
        (None, None) => return Err(AppError::InsufficientData("awakenings or stage transitions")),
        (awakenings, transitions) => awakenings
            .unwrap_or(0)
            .saturating_add(transitions.unwrap_or(0)),
    };

    let rate = ratio(events.into(), sleep_hours(record), "total sleep")?;
    Ok(ratio(rate, rate + half_saturation, "fragmentation normalization")? * 100.0)
}

pub fn stage_composition_analysis(
    record: &RawSleepRecord,
    thresholds: &StageThresholds,
) -> Result<StageComposition> {
    let deep = deep_sleep_percent(record)?;
    let rem = rem_sleep_percent(record)?;
    let light = light_sleep_percent(record)?;
    let awake = percentage(
        record.awake_minutes,
        record.total_sleep_minutes + record.awake_minutes,
        "total sleep",
    )?;

    Ok(StageComposition {
        deep_percent: deep,
        rem_percent: rem,
        light_percent: light,
        awake_percent: awake,
        label: composition_label(deep, rem, light, thresholds),
        quality_score: quality_score(deep, rem, light),
    })
}

/// Signed difference between sleep obtained and sleep needed.
pub fn sleep_need_gap_minutes(record: &RawSleepRecord) -> Result<f64> {
    let need = record
        .sleep_need_minutes
        .ok_or(AppError::InsufficientData("sleep need"))?;
    Ok(record.total_sleep_minutes - f64::from(need))
}

fn sleep_hours(record: &RawSleepRecord) -> f64 {
    record.total_sleep_minutes / MINUTES_PER_HOUR
}

fn stage_percent(stage_minutes: f64, record: &RawSleepRecord) -> Result<f64> {
    percentage(stage_minutes, record.total_sleep_minutes, "total sleep")
}

fn composition_label(
    deep: f64,
    rem: f64,
    light: f64,
    thresholds: &StageThresholds,
) -> CompositionLabel {
    let stages: [(f64, PercentRange, CompositionLabel, CompositionLabel); 3] = [
        (
            deep,
            thresholds.deep,
            CompositionLabel::DeepDeficient,
            CompositionLabel::DeepExcess,
        ),
        (
            rem,
            thresholds.rem,
            CompositionLabel::RemDeficient,
            CompositionLabel::RemExcess,
        ),
        (
            light,
            thresholds.light,
            CompositionLabel::LightDeficient,
            CompositionLabel::LightExcess,
        ),
    ];

    if let Some((_, _, deficient, _)) = stages.iter().find(|(p, range, _, _)| *p < range.min) {
        return *deficient;
    }
    if let Some((_, _, _, excess)) = stages.iter().find(|(p, range, _, _)| *p > range.max) {
        return *excess;
    }
    CompositionLabel::Balanced
}

fn quality_score(deep: f64, rem: f64, light: f64) -> f64 {
    let stage_score =
        |percent: f64, ideal: f64, slope: f64| (100.0 - (percent - ideal).abs() * slope).max(0.0);

    (stage_score(deep, IDEAL_DEEP_PERCENT, DEEP_SCORE_SLOPE)
        + stage_score(light, IDEAL_LIGHT_PERCENT, LIGHT_SCORE_SLOPE)
        + stage_score(rem, IDEAL_REM_PERCENT, REM_SCORE_SLOPE))
        / 3.0
}
