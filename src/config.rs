//! System configuration parameters
//!
//! All tunable parameters for the room-light controller.
//! Loaded once at startup (JSON file and/or CLI overrides) and never
//! mutated afterwards.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sensors::window::MAX_WINDOW;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Telemetry thresholds ---
    /// Light average below this means the room is dark; above means bright
    pub dark_threshold: i32,
    /// Sound average above this means a sound was heard
    pub sound_threshold: i32,
    /// Number of most recent samples averaged per window
    pub window_size: usize,

    // --- Presence scan ---
    /// Time budget for one presence scan (milliseconds)
    pub scan_timeout_ms: u64,
    /// Frames with a qualifying person needed to confirm presence
    pub detection_threshold: u32,
    /// Per-frame person confidence (percent) that must be exceeded
    pub confidence_threshold_percent: u8,
    /// Pause after a successful actuation (milliseconds)
    pub cooldown_ms: u64,

    // --- Hardware bridge ---
    /// Bridge executable, invoked directly (no PATH lookup tricks)
    pub bridge_executable: String,
    /// Arguments placed before every bridge request
    pub bridge_args: Vec<String>,
    /// Upper bound on a single bridge command (milliseconds)
    pub bridge_command_timeout_ms: u64,
    /// Wait after `start` before the first telemetry read (milliseconds)
    pub bridge_settle_ms: u64,

    // --- Vision ---
    /// Capture device number (`/dev/video<N>`)
    pub camera_device: u32,
    /// Command that writes one encoded frame to stdout; `{device}` is substituted
    pub capture_command: Vec<String>,
    /// Command that reads a frame on stdin and prints detections as JSON
    pub detector_command: Vec<String>,
    /// Upper bound on a single capture or detector run (milliseconds)
    pub vision_command_timeout_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Telemetry
            dark_threshold: 50,
            sound_threshold: 50,
            window_size: 3,

            // Presence scan
            scan_timeout_ms: 10_000,
            detection_threshold: 5,
            confidence_threshold_percent: 50,
            cooldown_ms: 5_000,

            // Bridge
            bridge_executable: "ardcom".into(),
            bridge_args: Vec::new(),
            bridge_command_timeout_ms: 5_000,
            bridge_settle_ms: 1_000,

            // Vision
            camera_device: 2,
            capture_command: [
                "ffmpeg", "-loglevel", "error", "-f", "v4l2", "-i", "{device}", "-frames:v",
                "1", "-f", "image2pipe", "-vcodec", "mjpeg", "-",
            ]
            .map(String::from)
            .to_vec(),
            detector_command: ["detect-person", "--model", ".model/yolo11n.pt"]
                .map(String::from)
                .to_vec(),
            vision_command_timeout_ms: 2_000,
        }
    }
}

impl SystemConfig {
    /// Read a JSON config file.  Missing fields fall back to defaults.
    /// The result is validated before it is returned.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ValidationFailed("window_size must be >= 1"));
        }
        if self.window_size > MAX_WINDOW {
            return Err(ConfigError::ValidationFailed("window_size exceeds MAX_WINDOW"));
        }
        if self.scan_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("scan_timeout_ms must be > 0"));
        }
        if self.detection_threshold == 0 {
            return Err(ConfigError::ValidationFailed("detection_threshold must be >= 1"));
        }
        if self.confidence_threshold_percent > 100 {
            return Err(ConfigError::ValidationFailed(
                "confidence_threshold_percent must be <= 100",
            ));
        }
        if self.bridge_executable.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("bridge_executable is empty"));
        }
        if self.bridge_command_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "bridge_command_timeout_ms must be > 0",
            ));
        }
        if self.capture_command.is_empty() {
            return Err(ConfigError::ValidationFailed("capture_command is empty"));
        }
        if self.detector_command.is_empty() {
            return Err(ConfigError::ValidationFailed("detector_command is empty"));
        }
        if self.vision_command_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "vision_command_timeout_ms must be > 0",
            ));
        }
        Ok(())
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn bridge_command_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge_command_timeout_ms)
    }

    pub fn bridge_settle(&self) -> Duration {
        Duration::from_millis(self.bridge_settle_ms)
    }

    pub fn vision_command_timeout(&self) -> Duration {
        Duration::from_millis(self.vision_command_timeout_ms)
    }
}
