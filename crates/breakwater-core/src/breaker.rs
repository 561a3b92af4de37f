//! Circuit breaker state machine.
//!
//! # Reference
//! Fowler, M. (2014). Circuit Breaker pattern. martinfowler.com.
//!
//! # Transitions
//! ```text
//! Closed   → Open:      failure count >= failure threshold
//! Open     → HalfOpen:  now > open deadline (detected by a rejected call)
//! HalfOpen → Closed:    success count >= success threshold
//! HalfOpen → Open:      any failure
//! any      → any:       administrative override
//! ```
//!
//! Every transition resets both counters and recomputes the open deadline
//! from the moment of the transition.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::{Clock, MonotonicClock};
use crate::config::{self, BreakerConfig};
use crate::error::{CallError, Result};
use crate::state::BreakerState;

/// Consistent view of the breaker's mutable state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakerSnapshot {
    /// Current state.
    pub state: BreakerState,
    /// Accumulated failure weight while closed.
    pub failure_count: f64,
    /// Successes observed while half-open.
    pub half_open_successes: u32,
    /// Clock reading after which an open breaker moves to half-open.
    pub open_deadline: Duration,
}

/// Circuit breaker guarding calls to one downstream dependency.
///
/// Implements the three-state circuit breaker pattern:
/// - **Closed**: calls pass through; failures accumulate and decay with
///   successes or with time
/// - **Open**: calls are rejected without running the operation
/// - **Half-Open**: calls pass through to test whether the dependency
///   has recovered
///
/// All bookkeeping sits behind one mutex. The operation itself runs with
/// the lock released, so a slow call never blocks other callers.
#[derive(Debug)]
pub struct Breaker {
    inner: Mutex<Inner>,
    clock: Box<dyn Clock>,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: f64,
    failure_threshold: u32,
    successes_per_recovered_failure: u32,
    recovery_rate: f64,
    max_failure_gap: Duration,
    last_failure_at: Duration,
    open_timeout: Duration,
    open_deadline: Duration,
    half_open_successes: u32,
    success_threshold: u32,
    /// Bumped on every transition; outcomes admitted under an older
    /// generation are discarded.
    generation: u64,
}

/// Permission to run the operation, tied to the generation it was granted in.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    generation: u64,
}

impl Breaker {
    /// Creates a breaker from whole counts and whole seconds.
    ///
    /// # Arguments
    /// * `max_failures_to_trip` - Failures while closed before opening
    /// * `successes_to_recover_one_failure` - Successes that cancel one failure
    /// * `max_seconds_between_failures` - Gap after which the failure count restarts
    /// * `seconds_until_half_open` - Open cooldown
    /// * `successes_to_close` - Half-open successes before closing
    ///
    /// # Errors
    /// Returns an error if any count is zero.
    pub fn configure(
        max_failures_to_trip: u32,
        successes_to_recover_one_failure: u32,
        max_seconds_between_failures: u64,
        seconds_until_half_open: u64,
        successes_to_close: u32,
    ) -> Result<Self> {
        Self::new(BreakerConfig::from_counts(
            max_failures_to_trip,
            successes_to_recover_one_failure,
            max_seconds_between_failures,
            seconds_until_half_open,
            successes_to_close,
        ))
    }

    /// Creates a closed breaker on the system monotonic clock.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: BreakerConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Creates a closed breaker on the given clock.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_clock(config: BreakerConfig, clock: impl Clock + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(&config, Box::new(clock)))
    }

    fn from_valid(config: &BreakerConfig, clock: Box<dyn Clock>) -> Self {
        let now = clock.now();
        let inner = Inner {
            state: BreakerState::Closed,
            failure_count: 0.0,
            failure_threshold: config.failure_threshold,
            successes_per_recovered_failure: config.successes_per_recovered_failure,
            recovery_rate: config.recovery_rate(),
            max_failure_gap: config.max_failure_gap,
            last_failure_at: Duration::ZERO,
            open_timeout: config.open_timeout,
            open_deadline: now.saturating_add(config.open_timeout),
            half_open_successes: 0,
            success_threshold: config.success_threshold,
            generation: 0,
        };
        Self {
            inner: Mutex::new(inner),
            clock,
        }
    }

    /// Runs `operation` if the breaker admits it.
    ///
    /// Returns the operation's value, its original error wrapped in
    /// [`CallError::Operation`], or [`CallError::Rejected`] when the breaker
    /// is open. The call that finds the open cooldown expired is still
    /// rejected; it moves the breaker to half-open for the next call.
    pub fn execute<T, E, F>(&self, operation: F) -> std::result::Result<T, CallError<E>>
    where
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let Some(ticket) = self.admit() else {
            return Err(CallError::Rejected);
        };
        let outcome = operation();
        self.record(ticket, outcome.is_ok());
        outcome.map_err(CallError::Operation)
    }

    /// Async counterpart of [`execute`](Self::execute).
    ///
    /// The breaker's lock is never held across the operation's `.await`.
    pub async fn execute_async<T, E, F, Fut>(
        &self,
        operation: F,
    ) -> std::result::Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let Some(ticket) = self.admit() else {
            return Err(CallError::Rejected);
        };
        let outcome = operation().await;
        self.record(ticket, outcome.is_ok());
        outcome.map_err(CallError::Operation)
    }

    /// Decides whether a call may proceed, committing the open to
    /// half-open flip when the cooldown has elapsed.
    fn admit(&self) -> Option<Ticket> {
        let mut inner = self.inner.lock();
        if inner.state.admits_calls() {
            return Some(Ticket {
                generation: inner.generation,
            });
        }

        let now = self.clock.now();
        if now > inner.open_deadline {
            inner.enter(BreakerState::HalfOpen, now, "open timeout elapsed");
        } else {
            tracing::debug!("call rejected, circuit breaker open");
        }
        None
    }

    /// Applies the outcome of an admitted call.
    fn record(&self, ticket: Ticket, succeeded: bool) {
        let mut inner = self.inner.lock();
        if inner.generation != ticket.generation {
            tracing::debug!(
                state = %inner.state,
                "discarding outcome of a call admitted before the last transition"
            );
            return;
        }

        match (inner.state, succeeded) {
            (BreakerState::Closed, true) => {
                inner.failure_count = (inner.failure_count - inner.recovery_rate).max(0.0);
            }
            (BreakerState::Closed, false) => {
                let now = self.clock.now();
                if now.saturating_sub(inner.last_failure_at) > inner.max_failure_gap
                    && inner.failure_count > 0.0
                {
                    tracing::debug!(
                        forgiven = inner.failure_count,
                        "failure gap exceeded, forgetting earlier failures"
                    );
                    inner.failure_count = 0.0;
                }
                inner.last_failure_at = now;
                inner.failure_count += 1.0;
                if inner.failure_count >= f64::from(inner.failure_threshold) {
                    inner.enter(BreakerState::Open, now, "failure threshold reached");
                }
            }
            (BreakerState::HalfOpen, true) => {
                inner.half_open_successes = inner.half_open_successes.saturating_add(1);
                if inner.half_open_successes >= inner.success_threshold {
                    let now = self.clock.now();
                    inner.enter(BreakerState::Closed, now, "recovery confirmed");
                }
            }
            (BreakerState::HalfOpen, false) => {
                let now = self.clock.now();
                inner.enter(BreakerState::Open, now, "probe failed");
            }
            // No ticket is ever issued while open.
            (BreakerState::Open, _) => {}
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    /// Forces the breaker into `state`.
    ///
    /// Has the same side effects as a natural transition: both counters
    /// are reset and the open deadline is recomputed from now.
    pub fn set_state(&self, state: BreakerState) {
        let now = self.clock.now();
        self.inner.lock().enter(state, now, "administrative override");
    }

    /// Forces the breaker closed.
    pub fn reset(&self) {
        self.set_state(BreakerState::Closed);
    }

    /// Forces the breaker open.
    pub fn trip(&self) {
        self.set_state(BreakerState::Open);
    }

    /// Returns a consistent view of state and counters.
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock();
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            half_open_successes: inner.half_open_successes,
            open_deadline: inner.open_deadline,
        }
    }

    /// Returns the accumulated failure weight while closed.
    #[must_use]
    pub fn failure_count(&self) -> f64 {
        self.inner.lock().failure_count
    }

    /// Returns the successes observed since entering half-open.
    #[must_use]
    pub fn half_open_successes(&self) -> u32 {
        self.inner.lock().half_open_successes
    }

    /// Returns the live thresholds.
    #[must_use]
    pub fn config(&self) -> BreakerConfig {
        let inner = self.inner.lock();
        BreakerConfig {
            failure_threshold: inner.failure_threshold,
            successes_per_recovered_failure: inner.successes_per_recovered_failure,
            max_failure_gap: inner.max_failure_gap,
            open_timeout: inner.open_timeout,
            success_threshold: inner.success_threshold,
        }
    }

    /// Returns the closed failure threshold.
    #[must_use]
    pub fn closed_failure_threshold(&self) -> u32 {
        self.inner.lock().failure_threshold
    }

    /// Sets the closed failure threshold.
    ///
    /// # Errors
    /// Returns an error if `failures` is zero.
    pub fn set_closed_failure_threshold(&self, failures: u32) -> Result<()> {
        config::positive("failure_threshold", failures)?;
        self.inner.lock().failure_threshold = failures;
        Ok(())
    }

    /// Returns the amount one closed-state success removes from the
    /// failure count.
    #[must_use]
    pub fn closed_recovery_rate(&self) -> f64 {
        self.inner.lock().recovery_rate
    }

    /// Sets how many closed-state successes cancel one failure.
    ///
    /// # Errors
    /// Returns an error if `successes_per_failure` is zero.
    pub fn set_closed_recovery_rate(&self, successes_per_failure: u32) -> Result<()> {
        config::positive("successes_per_recovered_failure", successes_per_failure)?;
        let mut inner = self.inner.lock();
        inner.successes_per_recovered_failure = successes_per_failure;
        inner.recovery_rate = config::recovery_rate(successes_per_failure);
        Ok(())
    }

    /// Returns the maximum gap between related failures.
    #[must_use]
    pub fn max_error_gap(&self) -> Duration {
        self.inner.lock().max_failure_gap
    }

    /// Sets the maximum gap between related failures.
    pub fn set_max_error_gap(&self, gap: Duration) {
        self.inner.lock().max_failure_gap = gap;
    }

    /// Returns the open cooldown.
    #[must_use]
    pub fn open_timeout(&self) -> Duration {
        self.inner.lock().open_timeout
    }

    /// Sets the open cooldown. Takes effect at the next transition; an
    /// already computed deadline is left alone.
    pub fn set_open_timeout(&self, timeout: Duration) {
        self.inner.lock().open_timeout = timeout;
    }

    /// Returns the half-open success threshold.
    #[must_use]
    pub fn half_open_success_threshold(&self) -> u32 {
        self.inner.lock().success_threshold
    }

    /// Sets the half-open success threshold.
    ///
    /// # Errors
    /// Returns an error if `successes` is zero.
    pub fn set_half_open_success_threshold(&self, successes: u32) -> Result<()> {
        config::positive("success_threshold", successes)?;
        self.inner.lock().success_threshold = successes;
        Ok(())
    }
}

impl Default for Breaker {
    fn default() -> Self {
        Self::from_valid(&BreakerConfig::default(), Box::new(MonotonicClock::new()))
    }
}

impl Inner {
    fn enter(&mut self, to: BreakerState, now: Duration, cause: &'static str) {
        let from = self.state;
        self.state = to;
        self.failure_count = 0.0;
        self.half_open_successes = 0;
        self.open_deadline = now.saturating_add(self.open_timeout);
        self.generation = self.generation.wrapping_add(1);

        match to {
            BreakerState::Open => {
                tracing::warn!(%from, %to, cause, "circuit breaker opened");
            }
            BreakerState::HalfOpen => {
                tracing::info!(%from, %to, cause, "circuit breaker half-open, testing recovery");
            }
            BreakerState::Closed => {
                tracing::info!(%from, %to, cause, "circuit breaker closed");
            }
        }
    }
}
