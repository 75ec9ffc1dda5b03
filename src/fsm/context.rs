//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the telemetry handed in for this tick, the verdict
//! of a scan that ran this tick, both sliding windows, the actuator
//! request written back by the handlers, and the configuration.
//! Handlers never perform I/O; the [`AppService`](crate::app::service::AppService)
//! fills the inputs before a tick and applies the outputs after it.

use crate::config::SystemConfig;
use crate::presence::ScanResult;
use crate::sensors::TelemetrySample;
use crate::sensors::window::SlidingWindow;

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Requests that state handlers raise for the service to carry out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorCommands {
    /// Toggle the light, then hold for the configured cooldown.
    pub actuate_light: bool,
}

impl ActuatorCommands {
    /// Nothing requested.
    pub fn none() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Inputs for this tick --
    /// Sample read from the bridge this tick, consumed by the handler.
    pub telemetry: Option<TelemetrySample>,
    /// Verdict of the scan run this tick, consumed by the handler.
    pub scan: Option<ScanResult>,

    // -- Debounce windows (cleared on every transition) --
    pub light: SlidingWindow,
    pub sound: SlidingWindow,

    // -- Outputs --
    /// Requests to be applied after the FSM tick.
    pub commands: ActuatorCommands,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with windows sized from `config.window_size`.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            telemetry: None,
            scan: None,
            light: SlidingWindow::new(config.window_size),
            sound: SlidingWindow::new(config.window_size),
            commands: ActuatorCommands::none(),
            config,
        }
    }

    /// Empty both windows.  Called by the engine on every transition.
    pub fn reset_windows(&mut self) {
        self.light.clear();
        self.sound.clear();
    }

    /// Light average below the dark threshold (full window only).
    pub fn is_dark(&self) -> bool {
        self.light
            .average()
            .is_some_and(|avg| avg < f64::from(self.config.dark_threshold))
    }

    /// Light average above the dark threshold (full window only).
    pub fn is_bright(&self) -> bool {
        self.light
            .average()
            .is_some_and(|avg| avg > f64::from(self.config.dark_threshold))
    }

    /// Sound average above the sound threshold (full window only).
    pub fn is_loud(&self) -> bool {
        self.sound
            .average()
            .is_some_and(|avg| avg > f64::from(self.config.sound_threshold))
    }
}
