//! Breathing controller against a recording servo.

use crate::mock_hw::{EventLog, MockServo, SimClock, SimDelay};

use breathbeat::app::events::AppEvent;
use breathbeat::app::ports::ClockPort;
use breathbeat::config::PropConfig;
use breathbeat::control::breath::{BreathController, BreathOutcome, BreathPhase, BreathProfile};
use breathbeat::signals::StopSignal;

fn default_controller() -> BreathController {
    BreathController::new(BreathProfile::from_config(&PropConfig::default()).unwrap())
}

#[test]
fn one_cycle_sends_100_commands_per_sweep() {
    let controller = default_controller();
    let mut servo = MockServo::new();
    let clock = SimClock::default();
    let mut delay = SimDelay(clock.clone());
    let mut sink = EventLog::default();

    let outcome = controller
        .run_cycle(&mut servo, &mut delay, None, &mut sink)
        .unwrap();
    assert_eq!(outcome, BreathOutcome::Completed);

    let writes = servo.history();
    assert_eq!(writes.len(), 200);
    let (inhale, exhale) = writes.split_at(100);

    assert_eq!(inhale[0], 140.0);
    assert_eq!(inhale[99], 185.0);
    assert!(inhale.windows(2).all(|w| w[0] <= w[1]), "inhale must not go back");

    assert_eq!(exhale[0], 185.0);
    assert_eq!(exhale[99], 140.0);
    assert!(exhale.windows(2).all(|w| w[0] >= w[1]), "exhale must not go back");

    // Whole degrees only.
    assert!(writes.iter().all(|a| a.fract() == 0.0));

    // 2 sweeps x 100 steps x 20 ms + 2 pauses x 500 ms.
    assert_eq!(clock.now_ms(), 5000);
}

#[test]
fn phases_are_reported_in_order() {
    let controller = default_controller();
    let mut sink = EventLog::default();
    controller
        .run_cycle(
            &mut MockServo::new(),
            &mut SimDelay(SimClock::default()),
            None,
            &mut sink,
        )
        .unwrap();

    let phases: Vec<BreathPhase> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::BreathPhaseChanged(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            BreathPhase::Inhale,
            BreathPhase::PauseAfterInhale,
            BreathPhase::Exhale,
            BreathPhase::PauseAfterExhale,
        ]
    );
    assert_eq!(
        sink.events().last(),
        Some(&AppEvent::BreathCycleEnded(BreathOutcome::Completed))
    );
}

#[test]
fn stop_is_observed_before_the_next_write() {
    let controller = default_controller();
    let stop = StopSignal::new();
    let mut servo = MockServo::stopping_after(37, stop.clone());
    let mut sink = EventLog::default();

    let outcome = controller
        .run_cycle(
            &mut servo,
            &mut SimDelay(SimClock::default()),
            Some(&stop),
            &mut sink,
        )
        .unwrap();

    assert_eq!(outcome, BreathOutcome::Stopped);
    assert_eq!(servo.history().len(), 37);
    assert_eq!(
        sink.events().last(),
        Some(&AppEvent::BreathCycleEnded(BreathOutcome::Stopped))
    );
}

#[test]
fn continuous_breathing_runs_until_stopped() {
    let controller = default_controller();
    let stop = StopSignal::new();
    // Stop mid-way through the second cycle's inhale.
    let mut servo = MockServo::stopping_after(250, stop.clone());
    let mut sink = EventLog::default();

    controller
        .run_continuous(&mut servo, &mut SimDelay(SimClock::default()), &stop, &mut sink)
        .unwrap();

    assert_eq!(servo.history().len(), 250);
    assert_eq!(
        sink.count(|e| *e == AppEvent::BreathCycleEnded(BreathOutcome::Completed)),
        1
    );
}

#[test]
fn servo_fault_aborts_the_cycle() {
    let controller = default_controller();
    let mut servo = MockServo::failing_after(3);
    let err = controller
        .run_cycle(
            &mut servo,
            &mut SimDelay(SimClock::default()),
            None,
            &mut EventLog::default(),
        )
        .unwrap_err();
    assert_eq!(err, breathbeat::error::ActuatorError::PwmWriteFailed);
    assert_eq!(servo.history().len(), 3);
}
