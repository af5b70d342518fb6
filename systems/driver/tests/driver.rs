use std::time::Duration;

use terraform_core::{DriverConfig, Percent, RunPhase};
use terraform_scheduler::EventLoop;
use terraform_system_driver::{ProgressDriver, StartOutcome, TickOutcome};

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tick;

/// Runs the loop for `dt`, feeding every tick back into the driver.
fn run_for(
    driver: &mut ProgressDriver,
    events: &mut EventLoop<Tick>,
    dt: Duration,
) -> Vec<(Duration, TickOutcome)> {
    let horizon = events.horizon_after(dt);
    let mut outcomes = Vec::new();
    while let Some(fired) = events.pop_due(horizon) {
        if let Some(outcome) = driver.tick(events) {
            outcomes.push((fired.at, outcome));
        }
    }
    events.settle(horizon);
    outcomes
}

#[test]
fn progress_sequence_has_no_skips_and_stops_at_target() {
    let mut events = EventLoop::new(FRAME);
    let mut driver = ProgressDriver::new(DriverConfig::default());

    assert_eq!(
        driver.start(&mut events, Tick),
        StartOutcome::Started {
            progress: Percent::ZERO
        }
    );
    let outcomes = run_for(&mut driver, &mut events, Duration::from_secs(2));

    let sequence: Vec<u8> = outcomes.iter().map(|(_, o)| o.progress.get()).collect();
    let expected: Vec<u8> = (1..=70).collect();
    assert_eq!(sequence, expected);
    assert_eq!(driver.phase(), RunPhase::Idle);
    assert_eq!(driver.timer(), None);
    assert_eq!(events.pending(), 0, "repeating timer must be cleared");
}

#[test]
fn target_is_reached_exactly_once_at_seven_hundred_milliseconds() {
    let mut events = EventLoop::new(FRAME);
    let mut driver = ProgressDriver::new(DriverConfig::default());
    let _ = driver.start(&mut events, Tick);

    let outcomes = run_for(&mut driver, &mut events, Duration::from_secs(2));
    let crossings: Vec<&(Duration, TickOutcome)> = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.reached_target)
        .collect();

    assert_eq!(crossings.len(), 1);
    let (at, outcome) = crossings[0];
    assert_eq!(*at, Duration::from_millis(700));
    assert_eq!(outcome.progress.get(), 70);
    assert!(outcome.finished);
}

#[test]
fn restart_while_animating_does_not_add_a_timer() {
    let mut events = EventLoop::new(FRAME);
    let mut driver = ProgressDriver::new(DriverConfig::default());

    let _ = driver.start(&mut events, Tick);
    let timer = driver.timer();
    let _ = run_for(&mut driver, &mut events, Duration::from_millis(100));
    assert_eq!(driver.progress().get(), 10);

    assert_eq!(driver.start(&mut events, Tick), StartOutcome::AlreadyAnimating);
    assert_eq!(driver.timer(), timer);
    assert_eq!(events.pending(), 1);
    assert_eq!(driver.progress().get(), 10, "re-entrant start must not reset");
}

#[test]
fn uneven_step_lands_on_target_without_overshoot() {
    let mut events = EventLoop::new(FRAME);
    let mut driver = ProgressDriver::new(DriverConfig {
        target: Percent::new(70),
        step: 3,
        interval_ms: 10,
    });
    let _ = driver.start(&mut events, Tick);

    let outcomes = run_for(&mut driver, &mut events, Duration::from_secs(1));
    let sequence: Vec<u8> = outcomes.iter().map(|(_, o)| o.progress.get()).collect();

    assert_eq!(sequence.last(), Some(&70));
    assert!(sequence.iter().all(|value| *value <= 70));
    assert_eq!(sequence[sequence.len() - 2], 69);
    assert_eq!(outcomes.iter().filter(|(_, o)| o.reached_target).count(), 1);
}

#[test]
fn consecutive_runs_each_celebrate_once() {
    let mut events = EventLoop::new(FRAME);
    let mut driver = ProgressDriver::new(DriverConfig::default());

    let mut crossings = 0;
    for _ in 0..3 {
        assert!(matches!(
            driver.start(&mut events, Tick),
            StartOutcome::Started { .. }
        ));
        crossings += run_for(&mut driver, &mut events, Duration::from_secs(1))
            .iter()
            .filter(|(_, outcome)| outcome.reached_target)
            .count();
    }

    assert_eq!(crossings, 3);
}
