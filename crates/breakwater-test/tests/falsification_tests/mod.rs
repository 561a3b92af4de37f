//! Popperian Falsification Tests for Breakwater
//!
//! Categories:
//! - A: Closed state (F001-F009)
//! - B: Open state (F010-F016)
//! - C: Half-open state (F017-F023)
//! - D: Administration (F024-F030)
//! - E: End-to-end scenarios (F031-F034)
//! - F: Concurrency (F035-F038)

// Allow test-specific patterns that are denied in production code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod closed;
mod scenario;
