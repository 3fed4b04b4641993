//! Triggered program on simulated time.
//!
//! Every tick sleeps `tick_ms` through [`SimDelay`], so the clock only
//! moves when the runner (or a blocking breath) sleeps.

use breathbeat::adapters::hardware::PropHardware;
use breathbeat::app::events::AppEvent;
use breathbeat::app::ports::{ClockPort, TaskKind};
use breathbeat::app::triggered::TriggeredRunner;
use breathbeat::config::{BreathScheduling, PropConfig, RunMode};
use breathbeat::control::breath::BreathOutcome;
use breathbeat::error::{ActuatorError, Error};

use crate::mock_hw::{EventLog, MockPulse, MockServo, ScriptedConsole, SimClock, SimDelay};

type SimHardware = PropHardware<MockServo, MockPulse, ScriptedConsole, SimClock, SimDelay>;

/// 5 steps x 10 ms per sweep, 20 ms pauses: 140 ms per cycle.
fn short_breath(scheduling: BreathScheduling) -> PropConfig {
    let mut config = PropConfig::default();
    config.breath.breath_duration_ms = 50;
    config.breath.pause_duration_ms = 20;
    config.breath.steps = 5;
    config.breath.scheduling = scheduling;
    config.heartbeat.bpm = 60;
    config
}

fn rig(
    config: &PropConfig,
    script: impl FnOnce(ScriptedConsole) -> ScriptedConsole,
) -> (TriggeredRunner, SimHardware, MockServo, SimClock) {
    let clock = SimClock::default();
    let servo = MockServo::new();
    let hw = PropHardware::new(
        servo.clone(),
        MockPulse::default(),
        script(ScriptedConsole::new(clock.clone())),
        clock.clone(),
        SimDelay(clock.clone()),
    );
    let runner = TriggeredRunner::new(config, clock.now_ms()).unwrap();
    (runner, hw, servo, clock)
}

fn position(events: &[AppEvent], pred: impl Fn(&AppEvent) -> bool) -> usize {
    events.iter().position(pred).expect("event not emitted")
}

#[test]
fn line_arms_breathing_on_the_tick_it_is_observed() {
    let config = short_breath(BreathScheduling::Interleaved);
    let (mut runner, mut hw, servo, clock) = rig(&config, |c| c.line_at(35, "breathe"));
    let mut sink = EventLog::default();
    runner.start(&mut hw, &mut sink).unwrap();

    // Ticks at 0, 10, 20, 30: line not yet due.
    for _ in 0..4 {
        runner.tick(&mut hw, &mut sink).unwrap();
        assert!(!runner.breath_armed());
    }
    assert_eq!(clock.now_ms(), 40);
    assert!(servo.history().is_empty());

    // Tick at 40 sees it, arms, and the breath task issues its first step.
    runner.tick(&mut hw, &mut sink).unwrap();
    assert!(runner.breath_armed());
    assert_eq!(sink.count(|e| *e == AppEvent::BreathArmed), 1);
    assert_eq!(servo.history(), vec![140.0]);
}

#[test]
fn interleaved_breath_lets_heartbeat_run() {
    let config = short_breath(BreathScheduling::Interleaved);
    let (mut runner, mut hw, servo, _clock) = rig(&config, |c| c.line_at(0, "go"));
    let mut sink = EventLog::default();
    runner.start(&mut hw, &mut sink).unwrap();

    let mut ticks = 0;
    runner.tick(&mut hw, &mut sink).unwrap();
    while runner.breath_armed() {
        runner.tick(&mut hw, &mut sink).unwrap();
        ticks += 1;
        assert!(ticks < 100, "cycle never finished");
    }

    // Steps fall due at 0..=40 and 70..=110, the cycle ends at 140.
    assert_eq!(servo.history().len(), 10);
    assert_eq!(ticks, 14);
    // Every tick, including those mid-cycle, ran the heartbeat.
    assert_eq!(runner.scheduler().runs(TaskKind::Heartbeat), 15);
    assert_eq!(runner.scheduler().runs(TaskKind::TriggerPoll), 15);
}

#[test]
fn blocking_breath_starves_heartbeat_and_console() {
    let config = short_breath(BreathScheduling::Blocking);
    let (mut runner, mut hw, servo, clock) = rig(&config, |c| c.line_at(0, "go"));
    let mut sink = EventLog::default();
    runner.start(&mut hw, &mut sink).unwrap();

    runner.tick(&mut hw, &mut sink).unwrap();

    // The whole cycle ran inside one tick.
    assert_eq!(servo.history().len(), 10);
    assert!(!runner.breath_armed());
    assert_eq!(clock.now_ms(), 140 + 10);
    assert_eq!(runner.scheduler().runs(TaskKind::Heartbeat), 1);

    let events = sink.events();
    let first_step = position(&events, |e| matches!(e, AppEvent::ServoStep { .. }));
    let ended = position(&events, |e| {
        *e == AppEvent::BreathCycleEnded(BreathOutcome::Completed)
    });
    assert!(
        events[first_step..ended]
            .iter()
            .all(|e| !matches!(e, AppEvent::HeartbeatPhaseChanged(_))),
        "heartbeat must not run during a blocking cycle"
    );
}

#[test]
fn heartbeat_changes_phase_during_interleaved_cycle() {
    // Lub lasts 150 ms; a cycle started at 100 ms spans the Lub→Rest edge.
    let config = short_breath(BreathScheduling::Interleaved);
    let (mut runner, mut hw, _servo, _clock) = rig(&config, |c| c.line_at(100, "go"));
    let mut sink = EventLog::default();
    runner.start(&mut hw, &mut sink).unwrap();

    for _ in 0..40 {
        runner.tick(&mut hw, &mut sink).unwrap();
    }

    let events = sink.events();
    let first_step = position(&events, |e| matches!(e, AppEvent::ServoStep { .. }));
    let ended = position(&events, |e| {
        *e == AppEvent::BreathCycleEnded(BreathOutcome::Completed)
    });
    assert!(
        events[first_step..ended]
            .iter()
            .any(|e| matches!(e, AppEvent::HeartbeatPhaseChanged(_))),
        "heartbeat should keep running while breathing"
    );
}

#[test]
fn line_received_mid_cycle_breathes_once_more() {
    for scheduling in [BreathScheduling::Blocking, BreathScheduling::Interleaved] {
        let config = short_breath(scheduling);
        let (mut runner, mut hw, servo, _clock) =
            rig(&config, |c| c.line_at(0, "go").line_at(50, "again"));
        let mut sink = EventLog::default();
        runner.start(&mut hw, &mut sink).unwrap();

        for _ in 0..60 {
            runner.tick(&mut hw, &mut sink).unwrap();
        }

        assert_eq!(sink.count(|e| *e == AppEvent::BreathArmed), 2, "{scheduling:?}");
        assert_eq!(
            sink.count(|e| *e == AppEvent::BreathCycleEnded(BreathOutcome::Completed)),
            2,
            "{scheduling:?}"
        );
        assert_eq!(servo.history().len(), 20, "{scheduling:?}");
        assert!(!runner.breath_armed());
    }
}

#[test]
fn empty_line_does_not_arm() {
    let config = short_breath(BreathScheduling::Interleaved);
    let (mut runner, mut hw, servo, _clock) = rig(&config, |c| c.line_at(0, ""));
    let mut sink = EventLog::default();
    runner.start(&mut hw, &mut sink).unwrap();

    for _ in 0..5 {
        runner.tick(&mut hw, &mut sink).unwrap();
    }
    assert!(!runner.breath_armed());
    assert!(servo.history().is_empty());
}

#[test]
fn quiet_console_emits_idle_notice() {
    let config = short_breath(BreathScheduling::Interleaved);
    let (mut runner, mut hw, _servo, _clock) = rig(&config, |c| c);
    let mut sink = EventLog::default();
    runner.start(&mut hw, &mut sink).unwrap();

    // 5000 ms is not yet "more than" the idle interval.
    for _ in 0..=500 {
        runner.tick(&mut hw, &mut sink).unwrap();
    }
    assert_eq!(sink.count(|e| *e == AppEvent::AwaitingTrigger), 0);

    runner.tick(&mut hw, &mut sink).unwrap();
    assert_eq!(sink.count(|e| *e == AppEvent::AwaitingTrigger), 1);
}

#[test]
fn interrupt_is_reported_once_and_ignored() {
    let config = short_breath(BreathScheduling::Interleaved);
    let (mut runner, mut hw, _servo, _clock) =
        rig(&config, |c| c.interrupt_at(20).line_at(50, "go"));
    let mut sink = EventLog::default();
    runner.start(&mut hw, &mut sink).unwrap();

    for _ in 0..10 {
        runner.tick(&mut hw, &mut sink).unwrap();
    }
    assert_eq!(sink.count(|e| *e == AppEvent::InterruptReceived), 1);
    assert_eq!(sink.count(|e| *e == AppEvent::BreathArmed), 1);
}

#[test]
fn disabled_heartbeat_never_pulses() {
    let mut config = short_breath(BreathScheduling::Interleaved);
    config.heartbeat.enabled = false;
    let (mut runner, mut hw, _servo, _clock) = rig(&config, |c| c);
    let mut sink = EventLog::default();

    runner.start(&mut hw, &mut sink).unwrap();
    for _ in 0..20 {
        runner.tick(&mut hw, &mut sink).unwrap();
    }

    assert_eq!(runner.scheduler().active_count(), 2);
    assert_eq!(runner.scheduler().runs(TaskKind::Heartbeat), 0);
    let events = sink.events();
    assert_eq!(events[0], AppEvent::Started(RunMode::Triggered));
    assert_eq!(events[1], AppEvent::HeartbeatDisabled);
    let (_, pulse, ..) = hw.into_parts();
    assert_eq!(pulse.levels, vec![false]);
}

#[test]
fn servo_fault_surfaces_from_tick() {
    let config = short_breath(BreathScheduling::Blocking);
    let clock = SimClock::default();
    let mut hw = PropHardware::new(
        MockServo::failing_after(0),
        MockPulse::default(),
        ScriptedConsole::new(clock.clone()).line_at(0, "go"),
        clock.clone(),
        SimDelay(clock.clone()),
    );
    let mut runner = TriggeredRunner::new(&config, 0).unwrap();
    let mut sink = EventLog::default();

    assert_eq!(
        runner.tick(&mut hw, &mut sink),
        Err(Error::Actuator(ActuatorError::PwmWriteFailed))
    );
    // Heartbeat slot was skipped after the fault.
    assert_eq!(sink.count(|e| matches!(e, AppEvent::HeartbeatPhaseChanged(_))), 0);
}
