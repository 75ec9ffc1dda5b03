//! Integration tests for `PresenceScanner` against scripted camera and
//! detector adapters.

use std::time::Duration;

use roomlight::app::ports::PresencePort;
use roomlight::error::Error;
use roomlight::presence::{Detection, PresenceScanner};

use crate::mock_hw::{ManualClock, ScriptedCamera, ScriptedDetector};

const TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn absent_frames_cost_time_but_not_detections() {
    let clock = ManualClock::new(Duration::from_millis(100));
    // Two misses before every hit.
    let camera = ScriptedCamera::with_script([false, false, true, false, false, true, true]);
    let mut scanner = PresenceScanner::new(
        camera,
        ScriptedDetector::always(ScriptedDetector::person(80)),
        &clock,
    );

    let r = scanner.scan(TIMEOUT, 3, 50).unwrap();
    assert!(r.success);
    assert_eq!(r.detections, 3);
    assert_eq!(r.frames_captured, 3);
    assert_eq!(scanner.camera().captures, 7);
    assert_eq!(scanner.detector().calls, 3, "absent frames are never detected on");
}

#[test]
fn detections_need_not_be_consecutive() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let person = ScriptedDetector::person(90);
    let detector = ScriptedDetector::sequence(vec![
        person.clone(),
        Vec::new(),
        person.clone(),
        vec![Detection::new("dog", 99)],
        person,
    ]);
    let mut scanner = PresenceScanner::new(ScriptedCamera::default(), detector, &clock);

    let r = scanner.scan(TIMEOUT, 3, 50).unwrap();
    assert!(r.success);
    assert_eq!(r.frames_captured, 5);
}

#[test]
fn crowded_frame_counts_once() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let crowd = vec![
        Detection::new("person", 95),
        Detection::new("person", 93),
        Detection::new("person", 91),
    ];
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(crowd),
        &clock,
    );

    // Time for exactly two frames.
    let r = scanner.scan(Duration::from_millis(250), 3, 50).unwrap();
    assert!(!r.success);
    assert_eq!(r.detections, 2);
}

#[test]
fn threshold_confidence_is_not_enough() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(ScriptedDetector::person(50)),
        &clock,
    );
    let r = scanner.scan(Duration::from_secs(1), 1, 50).unwrap();
    assert!(!r.success);
    assert_eq!(r.detections, 0);
    assert!(r.elapsed >= Duration::from_secs(1));
}

#[test]
fn timeout_closes_camera_and_allows_next_scan() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::default(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );

    let first = scanner.scan(Duration::from_secs(1), 5, 50).unwrap();
    let second = scanner.scan(Duration::from_secs(1), 5, 50).unwrap();
    assert!(!first.success && !second.success);
    assert_eq!(scanner.camera().opens, 2);
    assert_eq!(scanner.camera().closes, 2);
    assert!(!scanner.camera().is_open());
}

#[test]
fn open_failure_is_a_camera_error() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut scanner = PresenceScanner::new(
        ScriptedCamera::broken(),
        ScriptedDetector::always(Vec::new()),
        &clock,
    );
    assert!(matches!(
        scanner.scan(TIMEOUT, 5, 50),
        Err(Error::Camera(_))
    ));
    assert_eq!(scanner.detector().calls, 0);
}

#[test]
fn detector_error_aborts_and_releases_camera() {
    let clock = ManualClock::new(Duration::from_millis(100));
    let mut detector = ScriptedDetector::always(ScriptedDetector::person(90));
    detector.fail_on_call = Some(1);
    let mut scanner = PresenceScanner::new(ScriptedCamera::default(), detector, &clock);

    assert!(matches!(
        scanner.scan(TIMEOUT, 5, 50),
        Err(Error::Detector(_))
    ));
    assert_eq!(scanner.camera().closes, 1);
    assert!(!scanner.camera().is_open());
}
