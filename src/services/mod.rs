// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External service integrations.

pub mod cache;
pub mod garmin;

pub use cache::{CacheKey, RecordCache, RecordSource};
pub use garmin::{GarminClient, GarminService, Session, SessionHandle};
