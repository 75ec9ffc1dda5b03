//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use std::time::Duration;

use crate::fsm::StateId;
use crate::presence::ScanResult;
use crate::sensors::TelemetrySample;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A telemetry sample was read and folded into the windows.
    Telemetry(TelemetryData),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A presence scan finished with a verdict.
    ScanCompleted(ScanResult),

    /// The light was toggled; the loop now holds for `cooldown`.
    Actuated { cooldown: Duration },

    /// The application service has started (carries initial state).
    Started(StateId),
}

/// A telemetry record suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    /// State that consumed the sample.
    pub state: StateId,
    pub sample: TelemetrySample,
    /// Window averages after the sample was pushed; `None` while a window
    /// is still filling or was just cleared by a transition.
    pub light_avg: Option<f64>,
    pub sound_avg: Option<f64>,
}
