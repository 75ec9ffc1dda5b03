//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM and its shared context.  It exposes a
//! hardware-agnostic API; all I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!   BridgePort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                  │       AppService        │
//! PresencePort ──▶ │   FSM · windows · I/O   │ ◀── Clock
//!                  └────────────────────────┘
//! ```

use log::{debug, info};

use crate::config::SystemConfig;
use crate::error::Result;
use crate::fsm::context::{ActuatorCommands, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::events::{AppEvent, TelemetryData};
use super::ports::{BridgePort, Clock, EventSink, PresencePort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Await);

        Self {
            fsm,
            ctx,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Await).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: gather input → FSM → apply requests.
    ///
    /// * Await / Armed: read one telemetry sample from the bridge.
    /// * Verify: run one presence scan (blocks for up to the scan timeout).
    ///
    /// Any bridge, camera or detector error aborts the tick and is returned
    /// unchanged.  No sleeping happens here except the post-actuation
    /// cooldown.
    pub fn tick(
        &mut self,
        bridge: &mut impl BridgePort,
        presence: &mut impl PresencePort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Gather this state's input
        let sample = match prev_state {
            StateId::Await | StateId::Armed => {
                let sample = bridge.read_telemetry()?;
                self.ctx.telemetry = Some(sample);
                Some(sample)
            }
            StateId::Verify => {
                let result = presence.scan(
                    self.ctx.config.scan_timeout(),
                    self.ctx.config.detection_threshold,
                    self.ctx.config.confidence_threshold_percent,
                )?;
                sink.emit(&AppEvent::ScanCompleted(result));
                self.ctx.scan = Some(result);
                None
            }
        };

        // 2. FSM tick (pure state logic)
        self.ctx.commands = ActuatorCommands::none();
        self.fsm.tick(&mut self.ctx);

        if let Some(sample) = sample {
            sink.emit(&AppEvent::Telemetry(TelemetryData {
                state: prev_state,
                sample,
                light_avg: self.light_average(),
                sound_avg: self.sound_average(),
            }));
        }

        // 3. Apply requests raised by the handlers
        self.apply_commands(bridge, clock, sink)?;

        // 4. Emit state change if the FSM moved
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }

        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Delay the driver should wait before the next tick.
    pub fn poll_interval(&self) -> std::time::Duration {
        self.fsm.current_state().poll_interval()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The immutable startup configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    /// Current light window average (`None` until the window is full).
    pub fn light_average(&self) -> Option<f64> {
        self.ctx.light.average()
    }

    /// Current sound window average (`None` until the window is full).
    pub fn sound_average(&self) -> Option<f64> {
        self.ctx.sound.average()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate handler requests into port calls.
    fn apply_commands(
        &mut self,
        bridge: &mut impl BridgePort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let cmds = core::mem::take(&mut self.ctx.commands);

        if cmds.actuate_light {
            bridge.actuate()?;
            let cooldown = self.ctx.config.cooldown();
            sink.emit(&AppEvent::Actuated { cooldown });
            debug!("Cooling down for {:?}", cooldown);
            clock.sleep(cooldown);
        }

        Ok(())
    }
}
