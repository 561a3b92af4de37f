// Examples are allowed to use expect/unwrap for simplicity
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Breakwater Guarded Call Example
//!
//! Protects calls to a flaky inventory service. The service fails for a
//! while, the breaker opens and sheds load, then the service recovers and
//! the breaker closes again.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example guarded_call
//!
//! # Show rejections and stale-failure resets too
//! RUST_LOG=breakwater_core=debug cargo run --example guarded_call
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use breakwater::prelude::*;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
failure_threshold = 3
successes_per_recovered_failure = 10
max_failure_gap = "60s"
open_timeout = "300ms"
success_threshold = 2
"#;

/// Simulated downstream service that is down for its first `outage` calls.
struct InventoryService {
    calls: AtomicU32,
    outage: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("inventory service unavailable")]
struct Unavailable;

impl InventoryService {
    async fn stock_level(&self, sku: &str) -> Result<u32, Unavailable> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.outage {
            return Err(Unavailable);
        }
        Ok(sku.len() as u32 * 7)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config: BreakerConfig = CONFIG.parse()?;
    let breaker = Arc::new(Breaker::new(config)?);
    let service = Arc::new(InventoryService {
        calls: AtomicU32::new(0),
        outage: 4,
    });

    for attempt in 1..=12 {
        let svc = Arc::clone(&service);
        let outcome = breaker
            .execute_async(|| async move { svc.stock_level("widget-42").await })
            .await;

        match outcome {
            Ok(level) => tracing::info!(attempt, level, "stock level fetched"),
            Err(CallError::Rejected) => tracing::info!(attempt, "skipped, breaker open"),
            Err(CallError::Operation(e)) => tracing::info!(attempt, error = %e, "call failed"),
        }
        tracing::info!(attempt, state = %breaker.state(), "breaker state");

        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Ok(())
}
