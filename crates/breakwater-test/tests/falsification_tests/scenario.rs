//! Falsification Tests: Category E - End-to-End Scenarios (F031-F034)

use std::time::Duration;

use breakwater_core::{Breaker, BreakerConfig, BreakerState, CallError, ManualClock};
use breakwater_test::BreakerTestHarness;

/// F031: Full reference cycle
///
/// # Falsification Attempt
/// Threshold 3, recovery 10, gap 5s, timeout 2s, 2 successes to close:
/// closed → (gap reset) → open → half-open → closed.
#[test]
fn f031_reference_cycle() {
    let harness = BreakerTestHarness::reference().unwrap();

    harness.run_failures(2);
    assert_eq!(harness.state(), BreakerState::Closed);

    harness.advance_secs(6);
    harness.run_failures(2);
    assert_eq!(
        harness.state(),
        BreakerState::Closed,
        "F031 FALSIFIED: gap did not reset the count"
    );

    harness.run_failures(1);
    assert_eq!(
        harness.state(),
        BreakerState::Open,
        "F031 FALSIFIED: third effective failure did not open"
    );

    harness.advance_secs(3);
    let crossing = harness.call();
    assert!(matches!(crossing, Err(CallError::Rejected)));
    assert_eq!(harness.state(), BreakerState::HalfOpen);

    harness.run_successes(1);
    assert_eq!(harness.state(), BreakerState::HalfOpen);

    harness.run_successes(1);
    assert_eq!(
        harness.state(),
        BreakerState::Closed,
        "F031 FALSIFIED: breaker did not close after recovery"
    );
}

/// F032: Breaker keeps cycling with no terminal state
#[test]
fn f032_repeated_cycles() {
    let harness = BreakerTestHarness::reference().unwrap();
    for cycle in 0..5 {
        harness.half_open().unwrap();
        harness.run_successes(2);
        assert_eq!(
            harness.state(),
            BreakerState::Closed,
            "F032 FALSIFIED: cycle {cycle} did not return to closed"
        );
    }
}

/// F033: Half-open relapse needs a fresh timeout
///
/// # Falsification Attempt
/// Fail the probe, then check the breaker rejects until the new deadline.
#[test]
fn f033_relapse_restarts_timeout() {
    let harness = BreakerTestHarness::reference().unwrap();
    harness.half_open().unwrap();
    harness.run_failures(1);
    assert_eq!(harness.state(), BreakerState::Open);

    harness.advance(Duration::from_secs(2));
    assert!(harness.call().unwrap_err().is_rejected());
    assert_eq!(
        harness.state(),
        BreakerState::Open,
        "F033 FALSIFIED: relapse reused the old deadline"
    );
}

/// F034: Caller code can wrap a plain function
///
/// # Falsification Attempt
/// Guard an ordinary computation the way application code would.
#[test]
fn f034_guards_plain_function() {
    fn calculate_area(width: u32, length: u32) -> Result<u32, std::io::Error> {
        Ok(width * length)
    }

    let breaker =
        Breaker::with_clock(BreakerConfig::from_counts(3, 10, 60, 30, 2), ManualClock::new())
            .unwrap();
    let area = breaker.execute(|| calculate_area(2, 3));
    assert_eq!(area.ok(), Some(6), "F034 FALSIFIED: wrong value returned");
}
