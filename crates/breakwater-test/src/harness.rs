//! Breaker test harness.
//!
//! Pairs a [`Breaker`] with a [`ManualClock`] and a [`MockOperation`] so
//! tests can walk the state machine without real delays.

use std::time::Duration;

use breakwater_core::{Breaker, BreakerConfig, BreakerState, CallError, ManualClock};

use crate::error::{Result, TestError};
use crate::mock::{MockFailure, MockOperation};

/// Tally of a batch of guarded calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Calls where the operation ran and succeeded.
    pub succeeded: u32,
    /// Calls where the operation ran and failed.
    pub failed: u32,
    /// Calls the breaker refused.
    pub rejected: u32,
}

impl RunSummary {
    fn tally(&mut self, outcome: &std::result::Result<String, CallError<MockFailure>>) {
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(CallError::Operation(_)) => self.failed += 1,
            Err(CallError::Rejected) => self.rejected += 1,
        }
    }
}

/// Test harness for breaker state-machine testing.
#[derive(Debug)]
pub struct BreakerTestHarness {
    breaker: Breaker,
    clock: ManualClock,
    operation: MockOperation,
}

impl BreakerTestHarness {
    /// Creates a new test harness builder.
    #[must_use]
    pub fn builder() -> BreakerTestHarnessBuilder {
        BreakerTestHarnessBuilder::default()
    }

    /// Creates a harness with the given configuration, starting at time zero.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: BreakerConfig) -> Result<Self> {
        Self::builder().with_config(config).build()
    }

    /// Creates a harness with 3 failures to trip, 10 successes per
    /// recovered failure, a 5s failure gap, a 2s open timeout and 2
    /// successes to close.
    ///
    /// # Errors
    /// Never fails in practice; the configuration is valid.
    pub fn reference() -> Result<Self> {
        Self::new(BreakerConfig::from_counts(3, 10, 5, 2, 2))
    }

    /// Returns the breaker under test.
    #[must_use]
    pub const fn breaker(&self) -> &Breaker {
        &self.breaker
    }

    /// Returns the clock driving the breaker.
    #[must_use]
    pub const fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Returns the mock operation.
    #[must_use]
    pub const fn operation(&self) -> &MockOperation {
        &self.operation
    }

    /// Returns the breaker's current state.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        self.breaker.state()
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta: Duration) {
        self.clock.advance(delta);
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Runs one guarded call against the mock with its current outcome.
    pub fn call(&self) -> std::result::Result<String, CallError<MockFailure>> {
        let operation = &self.operation;
        self.breaker.execute(|| operation.call())
    }

    /// Runs `n` guarded calls with the mock scripted to succeed.
    pub fn run_successes(&self, n: u32) -> RunSummary {
        self.operation.succeed_with("ok");
        self.run(n)
    }

    /// Runs `n` guarded calls with the mock scripted to fail.
    ///
    /// The mock is restored to succeeding afterwards.
    pub fn run_failures(&self, n: u32) -> RunSummary {
        self.operation.fail_with("injected failure");
        let summary = self.run(n);
        self.operation.succeed_with("ok");
        summary
    }

    fn run(&self, n: u32) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..n {
            summary.tally(&self.call());
        }
        summary
    }

    /// Drives the breaker from closed to open with consecutive failures.
    ///
    /// # Errors
    /// Returns an error if the breaker is not open afterwards.
    pub fn trip(&self) -> Result<()> {
        let threshold = self.breaker.closed_failure_threshold();
        self.run_failures(threshold);
        self.operation.reset();
        self.expect_state(BreakerState::Open)
    }

    /// Drives the breaker to half-open: trips it, lets the open timeout
    /// elapse, and spends one rejected call to observe the expiry.
    ///
    /// # Errors
    /// Returns an error if the breaker is not half-open afterwards.
    pub fn half_open(&self) -> Result<()> {
        self.trip()?;
        self.advance(self.breaker.open_timeout() + Duration::from_secs(1));
        if !matches!(self.call(), Err(CallError::Rejected)) {
            return Err(TestError::harness(
                "call crossing the open deadline was not rejected",
            ));
        }
        self.operation.reset();
        self.expect_state(BreakerState::HalfOpen)
    }

    /// Checks the breaker's state.
    ///
    /// # Errors
    /// Returns an assertion error if the state differs.
    pub fn expect_state(&self, expected: BreakerState) -> Result<()> {
        let actual = self.state();
        if actual != expected {
            return Err(TestError::assertion(format!(
                "expected breaker {expected}, found {actual}"
            )));
        }
        Ok(())
    }
}

/// Builder for test harness.
#[derive(Debug, Default)]
pub struct BreakerTestHarnessBuilder {
    config: Option<BreakerConfig>,
    start: Duration,
    operation: Option<MockOperation>,
}

impl BreakerTestHarnessBuilder {
    /// Sets the breaker configuration.
    #[must_use]
    pub fn with_config(mut self, config: BreakerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the clock's initial reading.
    #[must_use]
    pub fn starting_at(mut self, start: Duration) -> Self {
        self.start = start;
        self
    }

    /// Shares an existing mock operation with the harness.
    #[must_use]
    pub fn with_operation(mut self, operation: MockOperation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Builds the test harness.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<BreakerTestHarness> {
        let clock = ManualClock::starting_at(self.start);
        let config = self.config.unwrap_or_default();
        let breaker = Breaker::with_clock(config, clock.clone())?;
        tracing::debug!(start = ?self.start, "breaker test harness ready");

        Ok(BreakerTestHarness {
            breaker,
            clock,
            operation: self.operation.unwrap_or_default(),
        })
    }
}
