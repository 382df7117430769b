// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Credentials are read once at startup and handed to the Garmin service
//! as constructor parameters.

use std::env;
use std::str::FromStr;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Garmin account (secrets) ---
    /// Garmin Connect account email
    pub garmin_email: String,
    /// Garmin Connect account password
    pub garmin_password: String,

    // --- Upstream endpoints ---
    /// Base URL for the login endpoint
    pub auth_url: String,
    /// Base URL for the data endpoints
    pub api_url: String,

    // --- Caching & retry ---
    /// How long fetched records stay fresh in the cache
    pub cache_ttl_secs: u64,
    /// Delay before the single retry of a failed upstream request
    pub retry_backoff_ms: u64,

    /// Server port
    pub port: u16,

    /// Calculator tuning
    pub insights: InsightsConfig,
}

/// Tuning for calculators that need reference values.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsConfig {
    /// Events per hour of sleep at which the fragmentation index reaches 50.
    pub fragmentation_half_saturation: f64,
    /// Reference ranges used to label stage composition.
    pub thresholds: StageThresholds,
}

/// Reference ranges (percent of total sleep) per stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageThresholds {
    pub deep: PercentRange,
    pub rem: PercentRange,
    pub light: PercentRange,
}

/// Inclusive `min..=max` percentage band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentRange {
    pub min: f64,
    pub max: f64,
}

impl PercentRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl FromStr for PercentRange {
    type Err = ();

    /// Parse `"16-33"` style ranges.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s.split_once('-').ok_or(())?;
        let min: f64 = min.trim().parse().map_err(|_| ())?;
        let max: f64 = max.trim().parse().map_err(|_| ())?;
        if !(0.0..=100.0).contains(&min) || !(0.0..=100.0).contains(&max) || min > max {
            return Err(());
        }
        Ok(Self { min, max })
    }
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            deep: PercentRange::new(16.0, 33.0),
            rem: PercentRange::new(21.0, 31.0),
            light: PercentRange::new(30.0, 64.0),
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            fragmentation_half_saturation: DEFAULT_FRAGMENTATION_HALF_SATURATION,
            thresholds: StageThresholds::default(),
        }
    }
}

const DEFAULT_AUTH_URL: &str = "https://sso.garmin.com/sso";
const DEFAULT_API_URL: &str = "https://connectapi.garmin.com";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FRAGMENTATION_HALF_SATURATION: f64 = 6.0;

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            garmin_email: "test@example.com".to_string(),
            garmin_password: "test_password".to_string(),
            auth_url: "http://127.0.0.1:9/sso".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            retry_backoff_ms: 1,
            port: DEFAULT_PORT,
            insights: InsightsConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = StageThresholds::default();

        Ok(Self {
            garmin_email: env::var("GARMIN_EMAIL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GARMIN_EMAIL"))?,
            garmin_password: env::var("GARMIN_PASSWORD")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GARMIN_PASSWORD"))?,
            auth_url: env::var("GARMIN_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            api_url: env::var("GARMIN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            cache_ttl_secs: parse_var("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            retry_backoff_ms: parse_var("UPSTREAM_RETRY_BACKOFF_MS", DEFAULT_RETRY_BACKOFF_MS)?,
            port: parse_var("PORT", DEFAULT_PORT)?,
            insights: InsightsConfig {
                fragmentation_half_saturation: parse_positive_var(
                    "FRAGMENTATION_HALF_SATURATION",
                    DEFAULT_FRAGMENTATION_HALF_SATURATION,
                )?,
                thresholds: StageThresholds {
                    deep: parse_var("DEEP_RANGE", defaults.deep)?,
                    rem: parse_var("REM_RANGE", defaults.rem)?,
                    light: parse_var("LIGHT_RANGE", defaults.light)?,
                },
            },
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// Like [`parse_var`], but the value must be finite and strictly positive.
fn parse_positive_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let value = parse_var(name, default)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("GARMIN_EMAIL", "runner@example.com");
        env::set_var("GARMIN_PASSWORD", " hunter2 \n");
        env::set_var("DEEP_RANGE", "15-30");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.garmin_email, "runner@example.com");
        assert_eq!(config.garmin_password, "hunter2");
        assert_eq!(config.insights.thresholds.deep, PercentRange::new(15.0, 30.0));
        assert_eq!(config.insights.thresholds.rem, PercentRange::new(21.0, 31.0));

        env::remove_var("DEEP_RANGE");
    }

    #[test]
    fn test_half_saturation_must_be_positive() {
        const NAME: &str = "TEST_HALF_SATURATION";

        for bad in ["-6", "0", "NaN", "inf"] {
            env::set_var(NAME, bad);
            assert!(
                matches!(
                    parse_positive_var(NAME, DEFAULT_FRAGMENTATION_HALF_SATURATION),
                    Err(ConfigError::Invalid { .. })
                ),
                "{bad} should be rejected"
            );
        }

        env::set_var(NAME, "4.5");
        assert_eq!(parse_positive_var(NAME, 6.0).unwrap(), 4.5);

        env::remove_var(NAME);
        assert_eq!(parse_positive_var(NAME, 6.0).unwrap(), 6.0);
    }

    #[test]
    fn test_percent_range_parsing() {
        assert_eq!("16-33".parse(), Ok(PercentRange::new(16.0, 33.0)));
        assert_eq!(" 20.5 - 30 ".parse(), Ok(PercentRange::new(20.5, 30.0)));
        assert!("33-16".parse::<PercentRange>().is_err());
        assert!("10-120".parse::<PercentRange>().is_err());
        assert!("sixteen".parse::<PercentRange>().is_err());
    }
}
