//! Breaker state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BreakerState {
    /// Circuit is closed (calls pass through, failures are counted).
    #[default]
    Closed,
    /// Circuit is open (calls rejected until the cooldown elapses).
    Open,
    /// Circuit is half-open (calls pass through to probe recovery).
    HalfOpen,
}

impl BreakerState {
    /// Returns the state's canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        }
    }

    /// Returns true if calls in this state invoke the operation.
    #[must_use]
    pub const fn admits_calls(self) -> bool {
        matches!(self, Self::Closed | Self::HalfOpen)
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakerState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closed" => Ok(Self::Closed),
            "open" => Ok(Self::Open),
            "half-open" | "half_open" | "halfopen" => Ok(Self::HalfOpen),
            other => Err(ConfigError::invalid(
                "state",
                format!("unknown breaker state '{other}'"),
            )),
        }
    }
}
