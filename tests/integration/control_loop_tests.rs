//! Integration tests for the bridge → windows → FSM → scanner → servo
//! pipeline, driven one tick at a time through `AppService`.

use std::time::Duration;

use roomlight::app::events::AppEvent;
use roomlight::app::service::AppService;
use roomlight::config::SystemConfig;
use roomlight::error::Error;
use roomlight::fsm::StateId;
use roomlight::presence::PresenceScanner;

use crate::mock_hw::{
    BridgeCall, ManualClock, MockBridge, RecordingSink, ScriptedCamera, ScriptedDetector,
};

type Scanner<'a> = PresenceScanner<ScriptedCamera, ScriptedDetector, &'a ManualClock>;

fn make_app(sink: &mut RecordingSink) -> AppService {
    let mut app = AppService::new(SystemConfig::default());
    app.start(sink);
    app
}

fn run_ticks(
    n: usize,
    app: &mut AppService,
    bridge: &mut MockBridge,
    scanner: &mut Scanner<'_>,
    clock: &ManualClock,
    sink: &mut RecordingSink,
) {
    for _ in 0..n {
        app.tick(bridge, scanner, clock, sink).unwrap();
    }
}

/// Dark for 3 slow ticks, then loud for 3 fast ticks: the 7th tick scans.
fn dark_then_loud() -> MockBridge {
    MockBridge::new().then(0, 10, 3).then(80, 10, 3)
}

// ── Happy path: dark room, a sound, a person ──────────────────

#[test]
fn confirmed_presence_toggles_light_once() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = dark_then_loud();
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(ScriptedDetector::person(90)),
        &clock,
    );

    run_ticks(3, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert_eq!(app.state(), StateId::Armed);

    run_ticks(3, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert_eq!(app.state(), StateId::Verify);
    assert_eq!(scanner.camera().opens, 0, "camera is only opened by a scan");

    run_ticks(1, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert_eq!(app.state(), StateId::Armed);

    assert_eq!(bridge.count(BridgeCall::ReadTelemetry), 6);
    assert_eq!(bridge.count(BridgeCall::Actuate), 1);
    assert_eq!(scanner.camera().opens, 1);
    assert_eq!(scanner.camera().closes, 1);
    assert_eq!(scanner.detector().calls, 5, "early success after 5 frames");
    assert_eq!(clock.slept.get(), Duration::from_secs(5), "one cooldown");

    assert_eq!(
        sink.transitions(),
        vec![
            (StateId::Await, StateId::Armed),
            (StateId::Armed, StateId::Verify),
            (StateId::Verify, StateId::Armed),
        ]
    );
    assert_eq!(sink.actuations(), 1);
}

#[test]
fn events_follow_tick_order() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = dark_then_loud();
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(ScriptedDetector::person(90)),
        &clock,
    );
    run_ticks(6, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    sink.events.clear();

    run_ticks(1, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert!(matches!(sink.events[0], AppEvent::ScanCompleted(r) if r.success && r.detections == 5));
    assert!(matches!(sink.events[1], AppEvent::Actuated { .. }));
    assert_eq!(
        sink.events[2],
        AppEvent::StateChanged {
            from: StateId::Verify,
            to: StateId::Armed
        }
    );
    assert_eq!(sink.events.len(), 3, "no telemetry is read while verifying");
}

// ── Failed confirmation ───────────────────────────────────────

#[test]
fn nobody_there_returns_to_armed_without_actuation() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = dark_then_loud();
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(ScriptedDetector::person(50)),
        &clock,
    );

    run_ticks(7, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);

    assert_eq!(app.state(), StateId::Armed);
    assert_eq!(bridge.count(BridgeCall::Actuate), 0);
    assert_eq!(clock.sleeps.get(), 0, "no cooldown without actuation");
    assert_eq!(scanner.camera().closes, 1);
    let scan = sink.events.iter().find_map(|e| match e {
        AppEvent::ScanCompleted(r) => Some(*r),
        _ => None,
    });
    let scan = scan.unwrap();
    assert!(!scan.success);
    assert_eq!(scan.detections, 0);
    assert!(scan.frames_captured > 0);
}

#[test]
fn rescan_needs_a_fresh_full_window() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    // Stays dark and loud forever.
    let mut bridge = dark_then_loud();
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );

    run_ticks(7, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert_eq!(app.state(), StateId::Armed);

    run_ticks(2, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert_eq!(app.state(), StateId::Armed, "windows were cleared by the transition");

    run_ticks(1, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert_eq!(app.state(), StateId::Verify);
}

// ── Brightening ───────────────────────────────────────────────

#[test]
fn bright_and_loud_goes_back_to_await() {
    let clock = ManualClock::frozen();
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = MockBridge::new().then(0, 10, 3).then(90, 200, 3);
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );

    run_ticks(6, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);

    assert_eq!(app.state(), StateId::Await);
    assert_eq!(scanner.camera().opens, 0);
    assert_eq!(
        sink.transitions(),
        vec![
            (StateId::Await, StateId::Armed),
            (StateId::Armed, StateId::Await),
        ]
    );
}

#[test]
fn equal_to_threshold_is_neither_dark_nor_loud() {
    let clock = ManualClock::frozen();
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = MockBridge::new().then(50, 50, 10);
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );

    run_ticks(10, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    assert_eq!(app.state(), StateId::Await);
    assert_eq!(app.light_average(), Some(50.0));
}

#[test]
fn telemetry_averages_appear_once_window_is_full() {
    let clock = ManualClock::frozen();
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = MockBridge::new().then(0, 100, 3);
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );

    run_ticks(3, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    let avgs: Vec<Option<f64>> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.light_avg),
            _ => None,
        })
        .collect();
    assert_eq!(avgs, vec![None, None, Some(100.0)]);
}

// ── Errors ────────────────────────────────────────────────────

#[test]
fn bridge_fault_aborts_tick() {
    let clock = ManualClock::frozen();
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = MockBridge::new()
        .then(0, 10, 1)
        .then_fail(Error::BridgeDevice("sensor fault".into()));
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );

    app.tick(&mut bridge, &mut scanner, &clock, &mut sink).unwrap();
    let err = app
        .tick(&mut bridge, &mut scanner, &clock, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::BridgeDevice(ref m) if m == "sensor fault"));
    assert_eq!(app.state(), StateId::Await);
}

#[test]
fn camera_failure_aborts_verify() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = dark_then_loud();
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::broken(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );

    run_ticks(6, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    let err = app
        .tick(&mut bridge, &mut scanner, &clock, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Camera(_)));
    assert_eq!(bridge.count(BridgeCall::Actuate), 0);
}

#[test]
fn detector_failure_still_releases_camera() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut sink = RecordingSink::new();
    let mut app = make_app(&mut sink);
    let mut bridge = dark_then_loud();
    let mut detector = ScriptedDetector::always(ScriptedDetector::person(90));
    detector.fail_on_call = Some(3);
    let mut scanner = PresenceScanner::new(ScriptedCamera::default(), detector, &clock);

    run_ticks(6, &mut app, &mut bridge, &mut scanner, &clock, &mut sink);
    let err = app
        .tick(&mut bridge, &mut scanner, &clock, &mut sink)
        .unwrap_err();

    assert!(matches!(err, Error::Detector(_)));
    assert_eq!(scanner.camera().opens, 1);
    assert_eq!(scanner.camera().closes, 1);
    assert!(!scanner.camera().is_open());
    assert_eq!(bridge.count(BridgeCall::Actuate), 0);
}
