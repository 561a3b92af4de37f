//! Falsification Tests: Category A - Closed State (F001-F009)

use std::time::Duration;

use breakwater_core::{BreakerConfig, BreakerState, CallError};
use breakwater_test::{BreakerTestHarness, MockFailure};

/// F001: A new breaker is closed
///
/// # Falsification Attempt
/// Build breakers across several configurations, look for one that is not closed.
#[test]
fn f001_starts_closed() {
    for (f, r, s) in [(1, 1, 1), (3, 10, 2), (100, 50, 7)] {
        let harness =
            BreakerTestHarness::new(BreakerConfig::from_counts(f, r, 5, 2, s)).unwrap();
        assert_eq!(
            harness.state(),
            BreakerState::Closed,
            "F001 FALSIFIED: breaker ({f}, {r}, {s}) did not start closed"
        );
    }
}

/// F002: Closed breaker invokes the operation and returns its value
///
/// # Falsification Attempt
/// Call through a closed breaker, check the mock ran and its value came back.
#[test]
fn f002_closed_runs_operation() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.operation().succeed_with("result");

    let value = harness.call().ok();
    assert_eq!(
        value.as_deref(),
        Some("result"),
        "F002 FALSIFIED: closed breaker did not return the operation's value"
    );
    assert!(
        harness.operation().verify().is_ok(),
        "F002 FALSIFIED: closed breaker did not invoke the operation"
    );
    assert_eq!(harness.state(), BreakerState::Closed);
}

/// F003: Closed breaker surfaces the operation's own failure
///
/// # Falsification Attempt
/// Make the operation fail, check the exact failure reaches the caller.
#[test]
fn f003_closed_escalates_failure() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.operation().fail_with("connection refused");

    match harness.call() {
        Err(CallError::Operation(MockFailure(msg))) => {
            assert_eq!(msg, "connection refused", "F003 FALSIFIED: failure altered");
        }
        other => panic!("F003 FALSIFIED: expected operation failure, got {other:?}"),
    }
}

/// F004: Failures below the threshold leave the breaker closed
///
/// # Falsification Attempt
/// Run threshold - 1 failures.
#[test]
fn f004_under_threshold_stays_closed() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.run_failures(2);
    assert_eq!(
        harness.state(),
        BreakerState::Closed,
        "F004 FALSIFIED: breaker opened below the failure threshold"
    );
}

/// F005: Reaching the failure threshold opens the breaker
///
/// # Falsification Attempt
/// Run exactly threshold failures.
#[test]
fn f005_threshold_opens() {
    let harness = BreakerTestHarness::reference().unwrap();
    let summary = harness.run_failures(3);
    assert_eq!(summary.failed, 3);
    assert_eq!(
        harness.state(),
        BreakerState::Open,
        "F005 FALSIFIED: breaker stayed closed at the failure threshold"
    );
}

/// F006: Failures older than the gap are forgiven
///
/// # Falsification Attempt
/// Two failures, wait past the 5s gap, two more failures; the breaker
/// would be open if the early failures still counted.
#[test]
fn f006_stale_failures_forgiven() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.run_failures(2);
    harness.advance_secs(6);
    harness.run_failures(2);

    assert_eq!(
        harness.state(),
        BreakerState::Closed,
        "F006 FALSIFIED: stale failures were still counted"
    );
    assert_eq!(
        harness.breaker().failure_count(),
        2.0,
        "F006 FALSIFIED: count should restart at the first post-gap failure"
    );
}

/// F007: Failure at t=6s after one at t=0 leaves the count at 1
///
/// # Falsification Attempt
/// Exact reproduction of the documented example.
#[test]
fn f007_gap_example() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.run_failures(1);
    harness.advance(Duration::from_secs(6));
    harness.run_failures(1);
    assert_eq!(
        harness.breaker().failure_count(),
        1.0,
        "F007 FALSIFIED: gap reset did not happen"
    );
}

/// F008: Successes offset failures at the recovery rate
///
/// # Falsification Attempt
/// Two failures, nine successes (0.9 recovered), then failures until open.
/// The third failure must not open; the fourth must.
#[test]
fn f008_successes_recover_failures() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.run_failures(2);
    harness.run_successes(9);

    harness.run_failures(1);
    assert_eq!(
        harness.state(),
        BreakerState::Closed,
        "F008 FALSIFIED: recovered failures were not subtracted"
    );

    harness.run_failures(1);
    assert_eq!(
        harness.state(),
        BreakerState::Open,
        "F008 FALSIFIED: recovery subtracted more than the rate allows"
    );
}

/// F009: Recovery floors at zero and never changes state
///
/// # Falsification Attempt
/// Many successes on a clean breaker.
#[test]
fn f009_recovery_floors_at_zero() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.run_failures(1);
    harness.run_successes(100);

    assert_eq!(
        harness.breaker().failure_count(),
        0.0,
        "F009 FALSIFIED: failure count went below zero"
    );
    assert_eq!(harness.state(), BreakerState::Closed);
}
