// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: an in-process fake of the Garmin Connect API.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use garmin_insights::config::Config;
use garmin_insights::routes::create_router;
use garmin_insights::services::GarminService;
use garmin_insights::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

pub const EMAIL: &str = "runner@example.com";
pub const PASSWORD: &str = "correct horse battery staple";

/// Fake Garmin Connect. Counts every request and can inject failures.
#[derive(Default)]
pub struct FakeGarmin {
    pub logins: AtomicUsize,
    pub activity_requests: AtomicUsize,
    pub sleep_requests: AtomicUsize,
    /// Upcoming data requests answered with 503.
    pub failures_pending: AtomicUsize,
    /// Upcoming data requests answered with 401 (token revoked).
    pub expirations_pending: AtomicUsize,
    pub reject_logins: AtomicBool,
    pub login_delay_ms: AtomicU64,
    pub fetch_delay_ms: AtomicU64,
    current_token: Mutex<Option<String>>,
    activity: Mutex<HashMap<String, Value>>,
    sleep: Mutex<HashMap<String, Value>>,
}

#[allow(dead_code)]
impl FakeGarmin {
    pub fn insert_activity(&self, date: NaiveDate, summary: Value) {
        self.activity
            .lock()
            .unwrap()
            .insert(date.format("%Y-%m-%d").to_string(), summary);
    }

    pub fn insert_sleep(&self, date: NaiveDate, sleep: Value) {
        self.sleep
            .lock()
            .unwrap()
            .insert(date.format("%Y-%m-%d").to_string(), sleep);
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn activity_requests(&self) -> usize {
        self.activity_requests.load(Ordering::SeqCst)
    }

    pub fn sleep_requests(&self) -> usize {
        self.sleep_requests.load(Ordering::SeqCst)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let current = self.current_token.lock().unwrap();
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        match (current.as_deref(), presented) {
            (Some(token), Some(presented)) => presented == format!("Bearer {}", token),
            _ => false,
        }
    }

    fn respond(
        &self,
        headers: &HeaderMap,
        records: &Mutex<HashMap<String, Value>>,
        date: Option<&String>,
        missing: Response,
    ) -> Response {
        if !self.authorized(headers) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        if take(&self.expirations_pending) {
            *self.current_token.lock().unwrap() = None;
            return StatusCode::UNAUTHORIZED.into_response();
        }
        if take(&self.failures_pending) {
            return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
        }

        let found = date.and_then(|d| records.lock().unwrap().get(d).cloned());
        match found {
            Some(value) => Json(value).into_response(),
            None => missing,
        }
    }
}

/// Decrement `counter` if positive; true if it was.
fn take(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

async fn delay(ms: &AtomicU64) {
    let ms = ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

async fn login(State(fake): State<Arc<FakeGarmin>>, Json(body): Json<Value>) -> Response {
    delay(&fake.login_delay_ms).await;
    let n = fake.logins.fetch_add(1, Ordering::SeqCst) + 1;

    if fake.reject_logins.load(Ordering::SeqCst)
        || body["email"] != EMAIL
        || body["password"] != PASSWORD
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let token = format!("token-{}", n);
    *fake.current_token.lock().unwrap() = Some(token.clone());
    Json(json!({ "access_token": token, "expires_in": 3600 })).into_response()
}

async fn daily_summary(
    State(fake): State<Arc<FakeGarmin>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.activity_requests.fetch_add(1, Ordering::SeqCst);
    delay(&fake.fetch_delay_ms).await;
    fake.respond(
        &headers,
        &fake.activity,
        query.get("calendarDate"),
        StatusCode::NOT_FOUND.into_response(),
    )
}

async fn sleep_data(
    State(fake): State<Arc<FakeGarmin>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    fake.sleep_requests.fetch_add(1, Ordering::SeqCst);
    delay(&fake.fetch_delay_ms).await;
    // Garmin answers an empty night with an empty object, not a 404
    fake.respond(
        &headers,
        &fake.sleep,
        query.get("date"),
        Json(json!({})).into_response(),
    )
}

/// Start a fake Garmin server and return it with a config pointing at it.
#[allow(dead_code)]
pub async fn spawn_fake_garmin() -> (Arc<FakeGarmin>, Config) {
    let fake = Arc::new(FakeGarmin::default());

    let app = Router::new()
        .route("/sso/login", post(login))
        .route("/usersummary-service/usersummary/daily", get(daily_summary))
        .route("/wellness-service/wellness/dailySleepData", get(sleep_data))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake Garmin server");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Fake Garmin server failed");
    });

    let config = Config {
        garmin_email: EMAIL.to_string(),
        garmin_password: PASSWORD.to_string(),
        auth_url: format!("http://{}/sso", addr),
        api_url: format!("http://{}", addr),
        ..Config::test_default()
    };

    (fake, config)
}

/// Create a Garmin service with a fresh session slot.
#[allow(dead_code)]
pub fn garmin_service(config: &Config) -> GarminService {
    GarminService::new(config, Arc::new(RwLock::new(None)))
}

/// Create a test app backed by the given config.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> (axum::Router, Arc<AppState>) {
    let garmin = garmin_service(&config);
    let state = Arc::new(AppState { config, garmin });
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).expect("valid test date")
}

/// 10k steps on a 10k goal, 7.2 km, 50 active / 600 sedentary / 720 tracked minutes.
#[allow(dead_code)]
pub fn reference_activity() -> Value {
    json!({
        "totalSteps": 10000,
        "dailyStepGoal": 10000,
        "totalKilocalories": 2200.0,
        "activeKilocalories": 400.0,
        "totalDistanceMeters": 7200.0,
        "activeSeconds": 3000,
        "highlyActiveSeconds": 0,
        "sedentarySeconds": 36000,
        "sleepingSeconds": 4200
    })
}

/// 8 h in bed, 7 h asleep (80 deep / 90 REM / 250 light), 5 awakenings, 450 min need.
#[allow(dead_code)]
pub fn reference_sleep() -> Value {
    json!({
        "dailySleepDTO": {
            "sleepTimeSeconds": 25200,
            "deepSleepSeconds": 4800,
            "lightSleepSeconds": 15000,
            "remSleepSeconds": 5400,
            "awakeSleepSeconds": 3600,
            "awakeCount": 5,
            "sleepStartTimestampGMT": 1717200000000i64,
            "sleepEndTimestampGMT": 1717228800000i64,
            "sleepNeed": { "baseline": 480, "actual": 450 }
        }
    })
}
