// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar dates.

use chrono::{NaiveDate, Utc};

/// Format used by Garmin Connect for calendar days.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, CALENDAR_DATE_FORMAT).ok()
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(CALENDAR_DATE_FORMAT).to_string()
}

/// Today's date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Convert a second count to fractional minutes, without rounding.
pub fn seconds_to_minutes(seconds: u64) -> f64 {
    seconds as f64 / SECONDS_PER_MINUTE
}
