//! Mock operation for testing.
//!
//! Provides a scriptable stand-in for the guarded dependency that records
//! whether the breaker actually invoked it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Result, TestError};

/// Failure produced by [`MockOperation`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mock operation failed: {0}")]
pub struct MockFailure(pub String);

/// Scripted outcome of the next invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Succeed(String),
    Fail(String),
}

/// Mock operation.
///
/// Clones share outcome and invocation count, so one handle can be moved
/// into worker threads while the test keeps another for verification.
#[derive(Debug, Clone)]
pub struct MockOperation {
    state: Arc<MockState>,
}

#[derive(Debug)]
struct MockState {
    outcome: parking_lot::RwLock<Outcome>,
    invocations: AtomicU32,
}

impl MockOperation {
    /// Creates a mock that succeeds with an empty string.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                outcome: parking_lot::RwLock::new(Outcome::Succeed(String::new())),
                invocations: AtomicU32::new(0),
            }),
        }
    }

    /// Makes subsequent calls succeed with `value`.
    pub fn succeed_with(&self, value: impl Into<String>) {
        *self.state.outcome.write() = Outcome::Succeed(value.into());
    }

    /// Makes subsequent calls fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.state.outcome.write() = Outcome::Fail(message.into());
    }

    /// Restores the default outcome and clears the invocation count.
    pub fn reset(&self) {
        self.succeed_with(String::new());
        self.state.invocations.store(0, Ordering::SeqCst);
    }

    /// Invokes the mock, as the breaker would.
    pub fn call(&self) -> std::result::Result<String, MockFailure> {
        self.state.invocations.fetch_add(1, Ordering::SeqCst);
        match &*self.state.outcome.read() {
            Outcome::Succeed(value) => Ok(value.clone()),
            Outcome::Fail(message) => Err(MockFailure(message.clone())),
        }
    }

    /// Returns how many times the mock was invoked.
    #[must_use]
    pub fn invocations(&self) -> u32 {
        self.state.invocations.load(Ordering::SeqCst)
    }

    /// Checks that the mock was invoked at least once.
    ///
    /// # Errors
    /// Returns an assertion error if the mock was never invoked.
    pub fn verify(&self) -> Result<()> {
        if self.invocations() == 0 {
            return Err(TestError::assertion("operation was never invoked"));
        }
        Ok(())
    }

    /// Checks that the mock was never invoked.
    ///
    /// # Errors
    /// Returns an assertion error if the mock was invoked.
    pub fn verify_not(&self) -> Result<()> {
        let count = self.invocations();
        if count != 0 {
            return Err(TestError::assertion(format!(
                "operation was invoked {count} time(s), expected none"
            )));
        }
        Ok(())
    }
}

impl Default for MockOperation {
    fn default() -> Self {
        Self::new()
    }
}
