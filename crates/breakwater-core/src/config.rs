//! Breaker configuration.
//!
//! Thresholds are validated at load time so a zero threshold never reaches
//! the state machine (a zero recovery denominator would divide by zero).

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Thresholds that drive breaker transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Failures counted while closed before the breaker opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Successes needed while closed to cancel out one failure.
    #[serde(default = "default_successes_per_recovered_failure")]
    pub successes_per_recovered_failure: u32,

    /// Failures further apart than this are treated as unrelated; the
    /// count restarts from zero.
    #[serde(default = "default_max_failure_gap")]
    #[serde(with = "humantime_serde")]
    pub max_failure_gap: Duration,

    /// How long the breaker stays open before probing.
    #[serde(default = "default_open_timeout")]
    #[serde(with = "humantime_serde")]
    pub open_timeout: Duration,

    /// Successes while half-open needed to close the breaker.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_successes_per_recovered_failure() -> u32 {
    10
}

fn default_max_failure_gap() -> Duration {
    Duration::from_secs(60)
}

fn default_open_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_success_threshold() -> u32 {
    2
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            successes_per_recovered_failure: default_successes_per_recovered_failure(),
            max_failure_gap: default_max_failure_gap(),
            open_timeout: default_open_timeout(),
            success_threshold: default_success_threshold(),
        }
    }
}

impl BreakerConfig {
    /// Builds a configuration from whole counts and whole seconds.
    #[must_use]
    pub fn from_counts(
        max_failures_to_trip: u32,
        successes_to_recover_one_failure: u32,
        max_seconds_between_failures: u64,
        seconds_until_half_open: u64,
        successes_to_close: u32,
    ) -> Self {
        Self {
            failure_threshold: max_failures_to_trip,
            successes_per_recovered_failure: successes_to_recover_one_failure,
            max_failure_gap: Duration::from_secs(max_seconds_between_failures),
            open_timeout: Duration::from_secs(seconds_until_half_open),
            success_threshold: successes_to_close,
        }
    }

    /// Sets the failure threshold.
    #[must_use]
    pub fn with_failure_threshold(mut self, failures: u32) -> Self {
        self.failure_threshold = failures;
        self
    }

    /// Sets how many successes cancel one failure.
    #[must_use]
    pub fn with_successes_per_recovered_failure(mut self, successes: u32) -> Self {
        self.successes_per_recovered_failure = successes;
        self
    }

    /// Sets the maximum gap between related failures.
    #[must_use]
    pub fn with_max_failure_gap(mut self, gap: Duration) -> Self {
        self.max_failure_gap = gap;
        self
    }

    /// Sets the open cooldown.
    #[must_use]
    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    /// Sets the half-open success threshold.
    #[must_use]
    pub fn with_success_threshold(mut self, successes: u32) -> Self {
        self.success_threshold = successes;
        self
    }

    /// Amount one closed-state success removes from the failure count.
    #[must_use]
    pub fn recovery_rate(&self) -> f64 {
        recovery_rate(self.successes_per_recovered_failure)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if any count threshold is zero.
    pub fn validate(&self) -> Result<()> {
        positive("failure_threshold", self.failure_threshold)?;
        positive(
            "successes_per_recovered_failure",
            self.successes_per_recovered_failure,
        )?;
        positive("success_threshold", self.success_threshold)?;
        Ok(())
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::load(format!("failed to read config: {e}")))?;
        content.parse()
    }
}

impl FromStr for BreakerConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| ConfigError::load(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn positive(field: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::invalid(field, "must be greater than 0"));
    }
    Ok(())
}

pub(crate) fn recovery_rate(successes_per_failure: u32) -> f64 {
    1.0 / f64::from(successes_per_failure)
}

/// Serde helper for humantime durations.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
