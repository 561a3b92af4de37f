// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # breakwater-core
//!
//! Circuit breaker for guarding synchronous or async calls to an
//! unreliable dependency.
//!
//! This crate provides:
//! - [`Breaker`]: the three-state (closed, open, half-open) decision gate
//! - [`BreakerConfig`]: validated thresholds, loadable from TOML
//! - [`Clock`]: monotonic time source, with [`ManualClock`] for tests
//! - [`CallError`]: distinguishes a rejected call from an operation failure
//!
//! ## Example
//!
//! ```rust
//! use breakwater_core::{Breaker, BreakerState, CallError};
//!
//! let breaker = Breaker::configure(3, 10, 60, 30, 2)?;
//!
//! match breaker.execute(|| Ok::<_, std::io::Error>(2 * 3)) {
//!     Ok(area) => assert_eq!(area, 6),
//!     Err(CallError::Rejected) => { /* breaker open, call not attempted */ }
//!     Err(CallError::Operation(e)) => return Err(e.into()),
//! }
//! assert_eq!(breaker.state(), BreakerState::Closed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod breaker;
pub mod clock;
pub mod config;
pub mod error;
pub mod state;

pub use breaker::{Breaker, BreakerSnapshot};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::BreakerConfig;
pub use error::{CallError, ConfigError, Result};
pub use state::BreakerState;
