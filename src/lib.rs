// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Garmin Insights: derived health metrics from a Garmin Connect account
//!
//! This crate fetches daily activity and sleep summaries from Garmin Connect,
//! caches them briefly, and computes secondary metrics (ratios, percentages,
//! composite sleep indices) on top of them.

pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::GarminService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub garmin: GarminService,
}
