//! Camera-based presence confirmation.
//!
//! [`PresenceScanner`] turns a stream of per-frame detections into one
//! pass/fail verdict under a deadline:
//!
//! ```text
//!  open camera ──▶ ┌─ capture ──(no frame)──────────────┐
//!                  │    │                               │
//!                  │  detect ──▶ person > conf? ──▶ +1  │
//!                  │    │                               │
//!                  │  count >= threshold ──▶ SUCCESS    │
//!                  └─ elapsed < timeout ◀───────────────┘
//!                           │
//!                        FAILURE          (camera closed on every exit)
//! ```
//!
//! A frame counts at most once, however many people it contains.

use std::time::Duration;

use log::{debug, info};

use crate::app::ports::{CameraPort, Clock, DetectorPort, PresencePort};
use crate::error::Result;

/// Class label the detector uses for people.
pub const PERSON_LABEL: &str = "person";

/// One encoded camera frame, passed unchanged from camera to detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// One candidate box reported by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub label: String,
    /// Confidence as an integer percentage (0–100).
    pub confidence_percent: u8,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence_percent: u8) -> Self {
        Self {
            label: label.into(),
            confidence_percent,
        }
    }

    pub fn is_person(&self) -> bool {
        self.label == PERSON_LABEL
    }
}

/// Verdict of a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanResult {
    pub success: bool,
    /// Frames that contained a qualifying person.
    pub detections: u32,
    /// Frames actually captured (absent frames excluded).
    pub frames_captured: u32,
    pub elapsed: Duration,
}

/// True if any person candidate is strictly above `confidence_threshold`.
pub fn frame_has_person(candidates: &[Detection], confidence_threshold: u8) -> bool {
    candidates
        .iter()
        .any(|d| d.is_person() && d.confidence_percent > confidence_threshold)
}

// ---------------------------------------------------------------------------
// Camera session guard
// ---------------------------------------------------------------------------

/// Open camera, closed on drop.
struct CameraSession<'a, C: CameraPort> {
    camera: &'a mut C,
}

impl<'a, C: CameraPort> CameraSession<'a, C> {
    fn open(camera: &'a mut C) -> Result<Self> {
        camera.open()?;
        Ok(Self { camera })
    }

    fn capture(&mut self) -> Option<Frame> {
        self.camera.capture_frame()
    }
}

impl<C: CameraPort> Drop for CameraSession<'_, C> {
    fn drop(&mut self) {
        self.camera.close();
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Owns the camera and detector and drives them for one scan at a time.
pub struct PresenceScanner<C, D, K> {
    camera: C,
    detector: D,
    clock: K,
}

impl<C, D, K> PresenceScanner<C, D, K>
where
    C: CameraPort,
    D: DetectorPort,
    K: Clock,
{
    pub fn new(camera: C, detector: D, clock: K) -> Self {
        Self {
            camera,
            detector,
            clock,
        }
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }
}

impl<C, D, K> PresencePort for PresenceScanner<C, D, K>
where
    C: CameraPort,
    D: DetectorPort,
    K: Clock,
{
    fn scan(
        &mut self,
        timeout: Duration,
        detection_threshold: u32,
        confidence_threshold: u8,
    ) -> Result<ScanResult> {
        info!(
            "SCAN: looking for {} person frames above {}% within {:?}",
            detection_threshold, confidence_threshold, timeout
        );

        let mut session = CameraSession::open(&mut self.camera)?;
        let start = self.clock.now();
        let mut detections = 0u32;
        let mut frames_captured = 0u32;

        while self.clock.now().saturating_sub(start) < timeout {
            let Some(frame) = session.capture() else {
                continue;
            };
            frames_captured += 1;

            let candidates = self.detector.detect(&frame)?;
            if frame_has_person(&candidates, confidence_threshold) {
                detections += 1;
                debug!(
                    "SCAN: frame {} confirmed ({}/{})",
                    frames_captured, detections, detection_threshold
                );
            }

            if detections >= detection_threshold {
                let elapsed = self.clock.now().saturating_sub(start);
                info!("SCAN: presence confirmed after {:?}", elapsed);
                return Ok(ScanResult {
                    success: true,
                    detections,
                    frames_captured,
                    elapsed,
                });
            }
        }

        let elapsed = self.clock.now().saturating_sub(start);
        info!(
            "SCAN: timed out with {}/{} detections over {} frames",
            detections, detection_threshold, frames_captured
        );
        Ok(ScanResult {
            success: false,
            detections,
            frames_captured,
            elapsed,
        })
    }
}
