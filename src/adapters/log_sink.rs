//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in the binary).  Per-tick
//! telemetry is logged at debug level so the default output stays at one
//! line per state change.

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn fmt_avg(avg: Option<f64>) -> String {
    avg.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                debug!(
                    "TELEM | state={:?} | sound={} light={} | sound_avg={} light_avg={}",
                    t.state,
                    t.sample.sound,
                    t.sample.light,
                    fmt_avg(t.sound_avg),
                    fmt_avg(t.light_avg),
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ScanCompleted(r) => {
                info!(
                    "SCAN  | {} | detections={} frames={} elapsed={}ms",
                    if r.success { "PRESENT" } else { "ABSENT" },
                    r.detections,
                    r.frames_captured,
                    r.elapsed.as_millis(),
                );
            }
            AppEvent::Actuated { cooldown } => {
                info!("ACT   | light toggled, cooldown={}ms", cooldown.as_millis());
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
