//! Camera adapter.
//!
//! Implements [`CameraPort`] on top of a V4L2 device node and an external
//! single-frame grabber (ffmpeg by default).  Opening only claims the
//! device for this controller; every capture runs the configured command
//! with `{device}` replaced by the node path and takes its stdout as the
//! encoded frame.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};

use super::process;
use crate::app::ports::CameraPort;
use crate::error::CameraError;
use crate::presence::Frame;

const DEVICE_PLACEHOLDER: &str = "{device}";

pub struct CommandCamera {
    device: PathBuf,
    command: Vec<String>,
    timeout: Duration,
    open: bool,
}

impl CommandCamera {
    /// Camera backed by `/dev/video<index>`.
    pub fn new(index: u32, command: Vec<String>, timeout: Duration) -> Self {
        Self::with_device(format!("/dev/video{index}"), command, timeout)
    }

    pub fn with_device(
        device: impl Into<PathBuf>,
        command: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            device: device.into(),
            command,
            timeout,
            open: false,
        }
    }

    pub fn device(&self) -> &Path {
        &self.device
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn argv(&self) -> Vec<String> {
        let device = self.device.to_string_lossy();
        self.command
            .iter()
            .skip(1)
            .map(|arg| arg.replace(DEVICE_PLACEHOLDER, &device))
            .collect()
    }
}

impl CameraPort for CommandCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        if self.open {
            return Err(CameraError::Busy);
        }
        if !self.device.exists() {
            return Err(CameraError::Open {
                device: self.device.display().to_string(),
                reason: "no such device".into(),
            });
        }
        if self.command.is_empty() {
            return Err(CameraError::Open {
                device: self.device.display().to_string(),
                reason: "capture command is empty".into(),
            });
        }
        self.open = true;
        debug!("Camera {} opened", self.device.display());
        Ok(())
    }

    fn capture_frame(&mut self) -> Option<Frame> {
        if !self.open {
            return None;
        }
        let program = self.command.first()?;
        match process::run(program, &self.argv(), None, self.timeout) {
            Ok(out) if out.status.success() && !out.stdout.is_empty() => {
                Some(Frame::new(out.stdout))
            }
            Ok(out) if out.status.success() => {
                debug!("Camera returned an empty frame");
                None
            }
            Ok(out) => {
                warn!("Frame capture failed: {}", out.failure_reason());
                None
            }
            Err(e) => {
                warn!("Frame capture failed: {}", e);
                None
            }
        }
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            debug!("Camera {} released", self.device.display());
        }
    }
}
