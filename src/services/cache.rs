// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory TTL cache for raw Garmin records.
//!
//! Entries are never evicted; a stale entry is simply ignored until the next
//! successful fetch overwrites it. The key space is bounded by the number of
//! distinct days requested, which is small for a single account.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Which upstream endpoint a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSource {
    Activity,
    Sleep,
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Activity => f.write_str("activity"),
            RecordSource::Sleep => f.write_str("sleep"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: RecordSource,
    pub date: NaiveDate,
}

impl CacheKey {
    pub fn new(source: RecordSource, date: NaiveDate) -> Self {
        Self { source, date }
    }
}

/// Cached record with the time it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
}

/// Concurrent map from (source, date) to the last fetched record.
///
/// Cloning shares the underlying map.
#[derive(Clone)]
pub struct RecordCache<V> {
    entries: Arc<DashMap<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> RecordCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Return the record if it is still fresh.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    /// Return the record if it was fresh at `now`.
    pub fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<V> {
        let entry = self.entries.get(key)?;
        if now - entry.fetched_at <= self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Store or overwrite a record, stamped with the current time.
    pub fn put(&self, key: CacheKey, value: V) {
        self.put_at(key, value, Utc::now());
    }

    pub fn put_at(&self, key: CacheKey, value: V, fetched_at: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { value, fetched_at });
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
