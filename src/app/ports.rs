//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (bridge, camera, detector, clock, event sinks) implement
//! these traits.  The [`AppService`](super::service::AppService) and the
//! [`PresenceScanner`](crate::presence::PresenceScanner) consume them via
//! generics, so the domain core never touches a process, a device node or a
//! wall clock directly.
//!
//! Every call is synchronous request/response; nothing here is retried.

use std::time::Duration;

use crate::error::{CameraError, Result};
use crate::presence::{Detection, Frame, ScanResult};
use crate::sensors::TelemetrySample;

// ───────────────────────────────────────────────────────────────
// Hardware bridge (driven adapter: domain ↔ sensor/servo board)
// ───────────────────────────────────────────────────────────────

/// Process-wide connection to the sensor/servo board.
///
/// Opened once with [`start`](Self::start) and closed once with
/// [`stop`](Self::stop).  Transport details stay behind this trait.
pub trait BridgePort {
    /// Bring the bridge up.
    fn start(&mut self) -> Result<()>;

    /// Tear the bridge down.
    fn stop(&mut self) -> Result<()>;

    /// Read exactly one `(sound, light)` sample.
    ///
    /// Fails with `BridgeTransport`, `BridgeDevice` or `BridgeProtocol`;
    /// there is no partial reading.
    fn read_telemetry(&mut self) -> Result<TelemetrySample>;

    /// Trigger the physical light toggle (servo sweep).
    fn actuate(&mut self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Camera (driven adapter: capture device → domain)
// ───────────────────────────────────────────────────────────────

/// A frame source that must be opened before capturing and closed after.
///
/// The scanner pairs every successful `open` with exactly one `close`.
pub trait CameraPort {
    fn open(&mut self) -> core::result::Result<(), CameraError>;

    /// Grab one frame.  `None` means no frame this time; it is not an error.
    fn capture_frame(&mut self) -> Option<Frame>;

    fn close(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Person detector (driven adapter: frame → detections)
// ───────────────────────────────────────────────────────────────

/// Object detector: one call, one frame, zero or more candidates.
pub trait DetectorPort {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

// ───────────────────────────────────────────────────────────────
// Presence confirmation (domain service consumed by the FSM driver)
// ───────────────────────────────────────────────────────────────

/// Bounded presence confirmation.  Implemented by
/// [`PresenceScanner`](crate::presence::PresenceScanner); tests substitute
/// scripted verdicts.
pub trait PresencePort {
    /// Block for at most `timeout` (or until early success) and return the
    /// verdict.  Camera and detector errors abort the scan.
    fn scan(
        &mut self,
        timeout: Duration,
        detection_threshold: u32,
        confidence_threshold: u8,
    ) -> Result<ScanResult>;
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: monotonic time + blocking sleep)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
