// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect API client for fetching daily activity and sleep summaries.
//!
//! Handles:
//! - Login with account credentials
//! - Daily summary and sleep data fetching
//! - Mapping upstream payloads onto raw records
//! - Status classification (expired session, missing day, upstream failure)

use crate::error::AppError;
use crate::models::{RawActivityRecord, RawSleepRecord};
use crate::time_utils::{format_calendar_date, seconds_to_minutes};
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;

/// Raw Garmin Connect API client.
#[derive(Clone)]
pub struct GarminClient {
    http: reqwest::Client,
    auth_url: String,
    api_url: String,
}

impl GarminClient {
    /// Create a new client against the given login and data base URLs.
    pub fn new(auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url: auth_url.into().trim_end_matches('/').to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Log in and obtain a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let url = format!("{}/login", self.auth_url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("Login request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Authentication(
                "Garmin rejected the account credentials".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "Login failed with HTTP {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to parse login response: {}", e))
        })
    }

    /// Get the daily activity summary for a calendar day.
    pub async fn get_daily_summary(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<DailySummary, AppError> {
        let url = format!("{}/usersummary-service/usersummary/daily", self.api_url);
        self.get_json(&url, access_token, "calendarDate", date).await
    }

    /// Get sleep data for the night ending on a calendar day.
    pub async fn get_sleep_data(
        &self,
        access_token: &str,
        date: NaiveDate,
    ) -> Result<SleepDataResponse, AppError> {
        let url = format!("{}/wellness-service/wellness/dailySleepData", self.api_url);
        self.get_json(&url, access_token, "date", date).await
    }

    /// Generic GET for a per-day resource with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        date_param: &str,
        date: NaiveDate,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(&[(date_param, format_calendar_date(date))])
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

        self.check_response_json(response, date).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        date: NaiveDate,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Err(AppError::NoDataForDate(date));
        }

        // Unauthorized - session token expired or revoked
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Authentication(
                AppError::SESSION_EXPIRED.to_string(),
            ));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Garmin rate limit hit (429)");
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("JSON parse error: {}", e)))
    }
}

/// Login response from the account service.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Daily summary from `usersummary-service`.
///
/// Every field is optional upstream; a day the device never synced comes
/// back with `totalSteps: null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_steps: Option<u32>,
    pub daily_step_goal: Option<u32>,
    pub total_kilocalories: Option<f64>,
    pub active_kilocalories: Option<f64>,
    pub total_distance_meters: Option<f64>,
    pub active_seconds: Option<u64>,
    pub highly_active_seconds: Option<u64>,
    pub sedentary_seconds: Option<u64>,
    pub sleeping_seconds: Option<u64>,
}

impl DailySummary {
    /// Convert into a raw record, or `NoDataForDate` if nothing was recorded.
    pub fn into_record(self, date: NaiveDate) -> Result<RawActivityRecord, AppError> {
        let steps = self.total_steps.ok_or(AppError::NoDataForDate(date))?;

        let active = self.active_seconds.unwrap_or(0);
        let sedentary = self.sedentary_seconds.unwrap_or(0);
        let tracked = [
            self.highly_active_seconds.unwrap_or(0),
            sedentary,
            self.sleeping_seconds.unwrap_or(0),
        ]
        .into_iter()
        .try_fold(active, u64::checked_add)
        .ok_or_else(|| malformed("tracked seconds overflow"))?;

        Ok(RawActivityRecord {
            date,
            steps,
            step_goal: self.daily_step_goal.unwrap_or(0),
            total_calories: self.total_kilocalories.unwrap_or(0.0),
            active_calories: self.active_kilocalories.unwrap_or(0.0),
            distance_meters: self.total_distance_meters.unwrap_or(0.0),
            active_minutes: seconds_to_minutes(active),
            sedentary_minutes: seconds_to_minutes(sedentary),
            total_tracked_minutes: seconds_to_minutes(tracked),
        })
    }
}

fn malformed(what: &str) -> AppError {
    AppError::UpstreamUnavailable(format!("Malformed Garmin payload: {}", what))
}

/// Sleep response from `wellness-service`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepDataResponse {
    #[serde(rename = "dailySleepDTO")]
    pub daily_sleep: Option<DailySleep>,
    pub sleep_levels: Option<Vec<SleepLevel>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySleep {
    pub sleep_time_seconds: Option<u64>,
    pub deep_sleep_seconds: Option<u64>,
    pub light_sleep_seconds: Option<u64>,
    pub rem_sleep_seconds: Option<u64>,
    pub awake_sleep_seconds: Option<u64>,
    pub awake_count: Option<u32>,
    /// Epoch milliseconds
    #[serde(rename = "sleepStartTimestampGMT")]
    pub sleep_start_timestamp_gmt: Option<i64>,
    /// Epoch milliseconds
    #[serde(rename = "sleepEndTimestampGMT")]
    pub sleep_end_timestamp_gmt: Option<i64>,
    pub sleep_need: Option<SleepNeed>,
}

/// Garmin's sleep need estimate, in minutes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepNeed {
    pub baseline: Option<u32>,
    /// Baseline adjusted for recent training and sleep history
    pub actual: Option<u32>,
}

/// One segment of the night's hypnogram.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLevel {
    /// 0 = deep, 1 = light, 2 = REM, 3 = awake
    pub activity_level: f64,
}

impl SleepDataResponse {
    /// Convert into a raw record, or `NoDataForDate` if no sleep was recorded.
    pub fn into_record(self, date: NaiveDate) -> Result<RawSleepRecord, AppError> {
        let daily = self.daily_sleep.ok_or(AppError::NoDataForDate(date))?;
        let sleep_seconds = daily
            .sleep_time_seconds
            .ok_or(AppError::NoDataForDate(date))?;

        let time_in_bed_seconds = match (
            daily.sleep_start_timestamp_gmt,
            daily.sleep_end_timestamp_gmt,
        ) {
            (Some(start), Some(end)) if end > start => {
                let millis = end
                    .checked_sub(start)
                    .ok_or_else(|| malformed("sleep timestamps out of range"))?;
                // positive after the guard above
                millis.unsigned_abs() / 1000
            }
            _ => 0,
        };

        let sleep_need_minutes = daily
            .sleep_need
            .and_then(|need| need.actual.or(need.baseline));

        let stage_transitions = self.sleep_levels.map(|levels| {
            let changes = levels
                .windows(2)
                .filter(|pair| pair[0].activity_level != pair[1].activity_level)
                .count();
            u32::try_from(changes).unwrap_or(u32::MAX)
        });

        Ok(RawSleepRecord {
            date,
            time_in_bed_minutes: seconds_to_minutes(time_in_bed_seconds),
            total_sleep_minutes: seconds_to_minutes(sleep_seconds),
            awake_count: daily.awake_count,
            awake_minutes: seconds_to_minutes(daily.awake_sleep_seconds.unwrap_or(0)),
            deep_minutes: seconds_to_minutes(daily.deep_sleep_seconds.unwrap_or(0)),
            rem_minutes: seconds_to_minutes(daily.rem_sleep_seconds.unwrap_or(0)),
            light_minutes: seconds_to_minutes(daily.light_sleep_seconds.unwrap_or(0)),
            sleep_need_minutes,
            stage_transitions,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GarminService - High-level service with session management and caching
// ─────────────────────────────────────────────────────────────────────────────

use crate::config::Config;
use crate::services::cache::{CacheKey, RecordCache, RecordSource};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Margin before session expiration when we proactively log in again (1 minute).
const SESSION_REFRESH_MARGIN_SECS: i64 = 60;

/// Upper bound for durations taken from config or upstream (one year).
const MAX_DURATION_SECS: i64 = 365 * 24 * 60 * 60;

/// Authenticated session with the account service.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn from_login(login: LoginResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: login.access_token,
            expires_at: now + Duration::seconds(login.expires_in.clamp(0, MAX_DURATION_SECS)),
        }
    }

    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(SESSION_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Shared session slot for use in AppState.
pub type SessionHandle = Arc<RwLock<Option<Session>>>;

/// Per-key locks so concurrent misses on one day share a single fetch.
type FetchLocks = Arc<DashMap<CacheKey, Arc<Mutex<()>>>>;

/// Account credentials. `Debug` never prints the password.
#[derive(Clone)]
struct Credentials {
    email: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// High-level Garmin service that owns the session and the record caches.
///
/// This service encapsulates:
/// - Lazy login and transparent re-login when the session expires
/// - A single login in flight at a time
/// - TTL caching of raw records per (source, day)
/// - One fetch in flight per (source, day)
/// - A single retry with backoff for transient upstream failures
#[derive(Clone)]
pub struct GarminService {
    client: GarminClient,
    credentials: Arc<Credentials>,
    session: SessionHandle,
    /// Serializes logins.
    login_lock: Arc<Mutex<()>>,
    activity_cache: RecordCache<RawActivityRecord>,
    sleep_cache: RecordCache<RawSleepRecord>,
    fetch_locks: FetchLocks,
    retry_backoff: std::time::Duration,
    upstream_fetches: Arc<AtomicU64>,
}

impl GarminService {
    /// Create a new Garmin service.
    ///
    /// The `session` handle may be shared with other `GarminService` instances
    /// so they reuse one login.
    pub fn new(config: &Config, session: SessionHandle) -> Self {
        let ttl_secs = i64::try_from(config.cache_ttl_secs).unwrap_or(MAX_DURATION_SECS);
        let ttl = Duration::seconds(ttl_secs.min(MAX_DURATION_SECS));

        Self {
            client: GarminClient::new(&config.auth_url, &config.api_url),
            credentials: Arc::new(Credentials {
                email: config.garmin_email.clone(),
                password: config.garmin_password.clone(),
            }),
            session,
            login_lock: Arc::new(Mutex::new(())),
            activity_cache: RecordCache::new(ttl),
            sleep_cache: RecordCache::new(ttl),
            fetch_locks: Arc::new(DashMap::new()),
            retry_backoff: std::time::Duration::from_millis(config.retry_backoff_ms),
            upstream_fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of data requests sent upstream so far (retries included).
    pub fn upstream_fetches(&self) -> u64 {
        self.upstream_fetches.load(Ordering::Relaxed)
    }

    // ─── Records ─────────────────────────────────────────────────────────────

    /// Activity summary for a day, from cache when fresh.
    pub async fn get_activity(&self, date: NaiveDate) -> Result<RawActivityRecord, AppError> {
        let key = CacheKey::new(RecordSource::Activity, date);
        self.get_or_fetch(&self.activity_cache, key, move |service| async move {
            let summary = service
                .call_upstream(key, move |client, token| async move {
                    client.get_daily_summary(&token, date).await
                })
                .await?;
            summary.into_record(date)
        })
        .await
    }

    /// Sleep summary for the night ending on a day, from cache when fresh.
    pub async fn get_sleep(&self, date: NaiveDate) -> Result<RawSleepRecord, AppError> {
        let key = CacheKey::new(RecordSource::Sleep, date);
        self.get_or_fetch(&self.sleep_cache, key, move |service| async move {
            let response = service
                .call_upstream(key, move |client, token| async move {
                    client.get_sleep_data(&token, date).await
                })
                .await?;
            response.into_record(date)
        })
        .await
    }

    /// Serve from cache, or run `fetch` and cache its result.
    ///
    /// The fetch runs on its own task: if the caller goes away mid-request the
    /// fetch still completes and fills the cache.
    async fn get_or_fetch<V, F, Fut>(
        &self,
        cache: &RecordCache<V>,
        key: CacheKey,
        fetch: F,
    ) -> Result<V, AppError>
    where
        V: Clone + Send + Sync + 'static,
        F: FnOnce(GarminService) -> Fut,
        Fut: Future<Output = Result<V, AppError>> + Send + 'static,
    {
        if let Some(hit) = cache.get(&key) {
            tracing::debug!(source = %key.source, date = %key.date, "Cache hit");
            return Ok(hit);
        }

        let lock = self
            .fetch_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have filled the cache while we waited.
        if let Some(hit) = cache.get(&key) {
            tracing::debug!(source = %key.source, date = %key.date, "Cache hit after wait");
            return Ok(hit);
        }

        tracing::info!(source = %key.source, date = %key.date, "Fetching from Garmin");

        let pending = fetch(self.clone());
        let cache = cache.clone();
        let task = tokio::spawn(async move {
            let value = pending.await?;
            cache.put(key, value.clone());
            Ok::<_, AppError>(value)
        });

        task.await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Fetch task failed: {}", e)))?
    }

    /// Run one upstream data request with the current session.
    ///
    /// An expired session triggers one re-login; a transient failure triggers
    /// one retry after the configured backoff. Everything else surfaces as is.
    async fn call_upstream<T, F, Fut>(&self, key: CacheKey, call: F) -> Result<T, AppError>
    where
        F: Fn(GarminClient, String) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut relogged = false;
        let mut retried = false;

        loop {
            let token = self.access_token().await?;
            self.upstream_fetches.fetch_add(1, Ordering::Relaxed);

            match call(self.client.clone(), token.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_session_expired() && !relogged => {
                    tracing::info!(source = %key.source, "Garmin session expired, logging in again");
                    relogged = true;
                    self.invalidate_session(&token).await;
                }
                Err(e) if e.is_session_expired() => {
                    return Err(AppError::Authentication(
                        "Garmin rejected a freshly issued session".to_string(),
                    ));
                }
                Err(e) if e.is_retryable() && !retried => {
                    tracing::warn!(
                        source = %key.source,
                        date = %key.date,
                        error = %e,
                        "Garmin request failed, retrying once"
                    );
                    retried = true;
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => {
                    if e.is_retryable() {
                        tracing::error!(source = %key.source, date = %key.date, error = %e, "Garmin unavailable");
                    }
                    return Err(e);
                }
            }
        }
    }

    // ─── Session Management ──────────────────────────────────────────────────

    /// Get a valid session token, logging in if needed.
    ///
    /// 1. Check the shared session (fast path - no I/O)
    /// 2. Acquire the login lock so only one login is in flight
    /// 3. Re-check after the lock (another task may have logged in)
    /// 4. Log in (one retry on transient failure) and store the session
    async fn access_token(&self) -> Result<String, AppError> {
        if let Some(session) = self.session.read().await.as_ref() {
            if session.is_valid_at(Utc::now()) {
                return Ok(session.access_token.clone());
            }
        }

        let _guard = self.login_lock.lock().await;

        if let Some(session) = self.session.read().await.as_ref() {
            if session.is_valid_at(Utc::now()) {
                return Ok(session.access_token.clone());
            }
        }

        tracing::info!("Logging in to Garmin Connect");

        let login = match self.login().await {
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "Garmin login failed, retrying once");
                tokio::time::sleep(self.retry_backoff).await;
                self.login().await?
            }
            other => other?,
        };

        let session = Session::from_login(login, Utc::now());
        let token = session.access_token.clone();
        *self.session.write().await = Some(session);

        tracing::info!("Garmin session established");
        Ok(token)
    }

    async fn login(&self) -> Result<LoginResponse, AppError> {
        self.client
            .login(&self.credentials.email, &self.credentials.password)
            .await
    }

    /// Drop the session if it still holds `stale_token`.
    ///
    /// A concurrent task may already have replaced it with a fresh one.
    async fn invalidate_session(&self, stale_token: &str) {
        let mut session = self.session.write().await;
        if session
            .as_ref()
            .is_some_and(|s| s.access_token == stale_token)
        {
            *session = None;
        }
    }
}
