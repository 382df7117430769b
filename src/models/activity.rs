// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily activity summary as fetched from Garmin Connect.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of activity totals.
///
/// Fields the upstream omits are zero; calculators treat zero denominators
/// as undefined rather than trusting these to be populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivityRecord {
    /// Calendar day the totals belong to
    pub date: NaiveDate,
    /// Total steps
    pub steps: u32,
    /// Daily step goal
    pub step_goal: u32,
    /// Total kilocalories (BMR + active)
    pub total_calories: f64,
    /// Active kilocalories only
    pub active_calories: f64,
    /// Distance in meters
    pub distance_meters: f64,
    /// Minutes classified as active
    pub active_minutes: f64,
    /// Minutes classified as sedentary
    pub sedentary_minutes: f64,
    /// All minutes the device tracked (active, sedentary, sleeping)
    pub total_tracked_minutes: f64,
}
