//! Integration tests for the driver loop: start → ticks → stop request,
//! with the bridge lifecycle handled the way the daemon handles it.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use roomlight::app::ports::BridgePort;
use roomlight::app::service::AppService;
use roomlight::config::SystemConfig;
use roomlight::driver::{DriverLoop, StopSignal};
use roomlight::error::{Error, Result};
use roomlight::fsm::StateId;
use roomlight::presence::PresenceScanner;

use crate::mock_hw::{
    BridgeCall, ManualClock, MockBridge, RecordingSink, ScriptedCamera, ScriptedDetector,
};

/// Counts waits and stops after `limit` of them.
struct WaitBudget {
    limit: usize,
    delays: Vec<Duration>,
}

impl WaitBudget {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            delays: Vec::new(),
        }
    }
}

impl StopSignal for WaitBudget {
    fn wait(&mut self, delay: Duration) -> bool {
        self.delays.push(delay);
        self.delays.len() > self.limit
    }
}

/// Start the bridge, run the loop, always stop the bridge.
fn daemon(
    mut bridge: MockBridge,
    detector: ScriptedDetector,
    stop: &mut impl StopSignal,
) -> (Result<()>, MockBridge, AppService) {
    let clock = ManualClock::new(Duration::from_millis(100));
    let scanner = PresenceScanner::new(ScriptedCamera::default(), detector, &clock);
    let mut sink = RecordingSink::new();

    bridge.start().unwrap();
    let mut app = AppService::new(SystemConfig::default());
    app.start(&mut sink);

    let mut driver = DriverLoop::new(app, bridge, scanner, &clock, sink);
    let outcome = driver.run(stop);
    let (app, mut bridge, _) = driver.into_parts();
    bridge.stop().unwrap();
    (outcome, bridge, app)
}

#[test]
fn runs_full_cycle_until_stopped() {
    let bridge = MockBridge::new().then(0, 10, 3).then(80, 10, 3);
    let mut stop = WaitBudget::new(7);

    let (outcome, bridge, app) = daemon(
        bridge,
        ScriptedDetector::always(ScriptedDetector::person(90)),
        &mut stop,
    );

    outcome.unwrap();
    assert_eq!(app.tick_count(), 8);
    assert_eq!(app.state(), StateId::Armed);
    assert_eq!(bridge.calls.first(), Some(&BridgeCall::Start));
    assert_eq!(bridge.calls.last(), Some(&BridgeCall::Stop));
    assert_eq!(bridge.count(BridgeCall::Actuate), 1);
    assert_eq!(&stop.delays[..3], &[
        Duration::from_secs(5),
        Duration::from_secs(5),
        Duration::from_millis(100),
    ]);
}

#[test]
fn fatal_tick_still_stops_bridge() {
    let bridge = MockBridge::new()
        .then(0, 500, 2)
        .then_fail(Error::BridgeTransport("ardcom: exit status 1".into()));
    let mut stop = WaitBudget::new(100);

    let (outcome, bridge, app) = daemon(bridge, ScriptedDetector::always(Vec::new()), &mut stop);

    assert!(matches!(outcome, Err(Error::BridgeTransport(_))));
    assert_eq!(app.tick_count(), 3);
    assert_eq!(stop.delays.len(), 2);
    assert_eq!(bridge.calls.last(), Some(&BridgeCall::Stop));
    assert_eq!(bridge.count(BridgeCall::Stop), 1);
}

#[test]
fn stop_request_from_another_thread_ends_loop() {
    let (tx, mut rx) = mpsc::channel();
    let bridge = MockBridge::new().then(0, 500, 1);

    let signaller = thread::spawn(move || {
        // The Await wait is 5s, so this lands inside the first wait.
        thread::sleep(Duration::from_millis(50));
        tx.send(()).unwrap();
    });

    let (outcome, bridge, app) = daemon(bridge, ScriptedDetector::always(Vec::new()), &mut rx);
    signaller.join().unwrap();

    outcome.unwrap();
    assert_eq!(app.tick_count(), 1);
    assert_eq!(
        bridge.calls,
        vec![BridgeCall::Start, BridgeCall::ReadTelemetry, BridgeCall::Stop]
    );
}
