//! Driver loop: repeated control ticks separated by the state's poll delay.
//!
//! ```text
//!   ┌──▶ AppService::tick ──(error)──▶ return Err
//!   │         │
//!   │   wait(state.poll_interval) ──(stop requested)──▶ return Ok
//!   └─────────┘
//! ```
//!
//! The wait is the only place a stop request is observed, so an in-flight
//! scan or cooldown always runs to completion first.  Bridge start/stop is
//! left to the caller.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use log::{debug, error, info};

use crate::app::ports::{BridgePort, Clock, EventSink, PresencePort};
use crate::app::service::AppService;
use crate::error::Result;

/// Interruptible inter-tick wait.
pub trait StopSignal {
    /// Wait up to `delay`.  Returns `true` if the loop should stop.
    fn wait(&mut self, delay: Duration) -> bool;
}

/// A message, or a dropped sender, both mean stop.
impl StopSignal for Receiver<()> {
    fn wait(&mut self, delay: Duration) -> bool {
        match self.recv_timeout(delay) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

/// Owns the control service and every port it drives.
pub struct DriverLoop<B, P, K, S> {
    app: AppService,
    bridge: B,
    presence: P,
    clock: K,
    sink: S,
}

impl<B, P, K, S> DriverLoop<B, P, K, S>
where
    B: BridgePort,
    P: PresencePort,
    K: Clock,
    S: EventSink,
{
    /// `app` must already be started.
    pub fn new(app: AppService, bridge: B, presence: P, clock: K, sink: S) -> Self {
        Self {
            app,
            bridge,
            presence,
            clock,
            sink,
        }
    }

    /// Tick until `stop` fires or a tick fails.
    ///
    /// The first error ends the loop and is returned unchanged.
    pub fn run(&mut self, stop: &mut impl StopSignal) -> Result<()> {
        loop {
            if let Err(e) = self
                .app
                .tick(&mut self.bridge, &mut self.presence, &self.clock, &mut self.sink)
            {
                error!(
                    "Tick {} failed in {:?}: {}",
                    self.app.tick_count(),
                    self.app.state(),
                    e
                );
                return Err(e);
            }

            let delay = self.app.poll_interval();
            debug!(
                "Next tick in {:?} ({:?}, light avg {:?}, sound avg {:?})",
                delay,
                self.app.state(),
                self.app.light_average(),
                self.app.sound_average()
            );
            if stop.wait(delay) {
                info!(
                    "Stop requested after {} ticks in {:?}",
                    self.app.tick_count(),
                    self.app.state()
                );
                return Ok(());
            }
        }
    }

    pub fn app(&self) -> &AppService {
        &self.app
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    /// Release the ports, e.g. to stop the bridge after the loop ends.
    pub fn into_parts(self) -> (AppService, B, P) {
        (self.app, self.bridge, self.presence)
    }
}
