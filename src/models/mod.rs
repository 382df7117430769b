// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod metric;
pub mod sleep;

pub use activity::RawActivityRecord;
pub use metric::{CompositionLabel, InsightValue, Metric, StageComposition};
pub use sleep::RawSleepRecord;
