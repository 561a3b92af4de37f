//! Error types for breakwater-core.
//!
//! Two families: [`ConfigError`] for thresholds rejected at construction or
//! by an admin setter, and [`CallError`] for the outcome of a guarded call.

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid or unloadable breaker configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A threshold failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Configuration could not be read or parsed.
    #[error("failed to load config: {0}")]
    Load(String),
}

impl ConfigError {
    /// Creates an invalid-field error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a load error.
    #[must_use]
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }
}

/// Failure returned from a call guarded by a [`Breaker`](crate::Breaker).
///
/// `Rejected` is produced by the breaker itself and means the operation was
/// never invoked. `Operation` carries the operation's own error unchanged.
#[derive(Debug, thiserror::Error)]
pub enum CallError<E> {
    /// Breaker is open; the call was refused without running the operation.
    #[error("circuit breaker open, call rejected")]
    Rejected,

    /// The operation ran and failed.
    #[error("operation failed: {0}")]
    Operation(E),
}

impl<E> CallError<E> {
    /// Returns true if the breaker refused the call.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Returns true if the operation ran and failed.
    #[must_use]
    pub const fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// Borrows the operation's error, if any.
    #[must_use]
    pub const fn operation_error(&self) -> Option<&E> {
        match self {
            Self::Operation(e) => Some(e),
            Self::Rejected => None,
        }
    }

    /// Unwraps the operation's error, if any.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation(e) => Some(e),
            Self::Rejected => None,
        }
    }

    /// Maps the operation's error, leaving a rejection untouched.
    pub fn map_operation<F, O>(self, f: O) -> CallError<F>
    where
        O: FnOnce(E) -> F,
    {
        match self {
            Self::Operation(e) => CallError::Operation(f(e)),
            Self::Rejected => CallError::Rejected,
        }
    }
}
