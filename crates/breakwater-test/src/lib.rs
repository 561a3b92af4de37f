// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # breakwater-test
//!
//! Testing infrastructure for Breakwater circuit breakers.
//!
//! This crate provides:
//! - **Mock operation**: scripted success/failure with invocation tracking
//! - **Test harness**: a breaker on a manual clock, with helpers to trip it,
//!   reach half-open, and run batches of calls
//! - **Falsification tests**: each test tries to refute one claim about
//!   the breaker's state machine
//!
//! ## Example
//!
//! ```rust
//! use breakwater_core::BreakerState;
//! use breakwater_test::BreakerTestHarness;
//!
//! let harness = BreakerTestHarness::reference()?;
//! harness.trip()?;
//! harness.advance_secs(3);
//! assert!(harness.call().unwrap_err().is_rejected());
//! assert_eq!(harness.state(), BreakerState::HalfOpen);
//! # Ok::<(), breakwater_test::TestError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod harness;
pub mod mock;

pub use error::{Result, TestError};
pub use harness::{BreakerTestHarness, BreakerTestHarnessBuilder, RunSummary};
pub use mock::{MockFailure, MockOperation};
