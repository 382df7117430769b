// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Nightly sleep summary as fetched from Garmin Connect.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One night of sleep, attributed to the day the sleep ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSleepRecord {
    /// Calendar day (wake-up day)
    pub date: NaiveDate,
    /// Minutes between sleep start and sleep end
    pub time_in_bed_minutes: f64,
    /// Minutes actually asleep
    pub total_sleep_minutes: f64,
    /// Number of awakenings, if the device reported them
    pub awake_count: Option<u32>,
    /// Minutes awake during the night
    pub awake_minutes: f64,
    /// Deep sleep minutes
    pub deep_minutes: f64,
    /// REM sleep minutes
    pub rem_minutes: f64,
    /// Light sleep minutes
    pub light_minutes: f64,
    /// Garmin's sleep need estimate in minutes
    pub sleep_need_minutes: Option<u32>,
    /// Number of changes between sleep levels across the night
    pub stage_transitions: Option<u32>,
}
