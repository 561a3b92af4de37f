//! Breakwater: Circuit Breaker for Unreliable Dependencies
//!
//! # Quick Start
//!
//! ```rust
//! use breakwater::prelude::*;
//!
//! let breaker = Breaker::new(BreakerConfig::default())?;
//! let value = breaker.execute(|| Ok::<_, std::io::Error>(42));
//! assert_eq!(value.ok(), Some(42));
//! # Ok::<(), ConfigError>(())
//! ```

pub use breakwater_core as core;

/// Prelude module for common imports.
pub mod prelude {
    pub use breakwater_core::{
        Breaker, BreakerConfig, BreakerSnapshot, BreakerState, CallError, Clock, ConfigError,
        ManualClock, MonotonicClock,
    };
}
