//! Person-detector adapter.
//!
//! Implements [`DetectorPort`] by piping each encoded frame into an
//! external detector command (a YOLO wrapper by default) and decoding the
//! JSON array it prints:
//!
//! ```text
//! [{"label": "person", "confidence": 0.91}, {"label": "chair", "confidence": 0.40}]
//! ```
//!
//! Confidences arrive as fractions in `0.0..=1.0` and are truncated to an
//! integer percentage.

use std::time::Duration;

use log::trace;
use serde::Deserialize;

use super::process;
use crate::app::ports::DetectorPort;
use crate::error::{Error, Result};
use crate::presence::{Detection, Frame};

#[derive(Debug, Deserialize)]
struct RawDetection {
    label: String,
    confidence: f64,
}

impl RawDetection {
    fn into_detection(self) -> Detection {
        // `as` saturates and maps NaN to 0.
        let percent = (self.confidence.clamp(0.0, 1.0) * 100.0) as u8;
        Detection::new(self.label, percent)
    }
}

pub struct CommandDetector {
    command: Vec<String>,
    timeout: Duration,
}

impl CommandDetector {
    pub fn new(command: Vec<String>, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

impl DetectorPort for CommandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| Error::Detector("detector command is empty".into()))?;

        let out = process::run(program, args, Some(&frame.data), self.timeout)
            .map_err(|e| Error::Detector(e.to_string()))?;
        if !out.status.success() {
            return Err(Error::Detector(format!(
                "{} failed: {}",
                program,
                out.failure_reason()
            )));
        }

        let detections = parse_detections(&out.stdout)?;
        trace!("detector: {} candidates", detections.len());
        Ok(detections)
    }
}

/// Decode the detector's JSON output.
pub fn parse_detections(stdout: &[u8]) -> Result<Vec<Detection>> {
    let raw: Vec<RawDetection> = serde_json::from_slice(stdout)
        .map_err(|e| Error::Detector(format!("malformed detector output: {}", e)))?;
    Ok(raw.into_iter().map(RawDetection::into_detection).collect())
}
