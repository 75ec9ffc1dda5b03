//! Hardware bridge adapter.
//!
//! Implements [`BridgePort`] by invoking the `ardcom` serial bridge
//! executable once per request.  The executable path comes from config and
//! is spawned directly; the process environment is never modified.
//!
//! | Request          | Invocation           |
//! |------------------|----------------------|
//! | start            | `<bridge> start`     |
//! | stop             | `<bridge> stop`      |
//! | read telemetry   | `<bridge> send -log` |
//! | actuate (servo)  | `<bridge> send -ms`  |
//!
//! A telemetry reply is exactly one line whose first character is a
//! status marker:
//!
//! ```text
//!   :<sound>,<light>   valid reading
//!   -<message>         device fault reported by the board
//!   =<message>         device fault (board's raw serial marker)
//! ```

use std::time::Duration;

use log::{debug, info};

use super::process::{self, CommandOutput};
use crate::app::ports::BridgePort;
use crate::error::{Error, Result};
use crate::sensors::TelemetrySample;

/// Command-line bridge to the sensor/servo board.
pub struct ArdcomBridge {
    executable: String,
    /// Leading arguments placed before every request (e.g. a script path
    /// when the bridge runs under an interpreter).
    base_args: Vec<String>,
    timeout: Duration,
}

impl ArdcomBridge {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self::with_args(executable, Vec::new(), timeout)
    }

    pub fn with_args(
        executable: impl Into<String>,
        base_args: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            executable: executable.into(),
            base_args,
            timeout,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    fn invoke(&self, args: &[&str]) -> Result<String> {
        let argv: Vec<String> = self
            .base_args
            .iter()
            .cloned()
            .chain(args.iter().map(|a| (*a).to_string()))
            .collect();
        let out: CommandOutput = process::run(&self.executable, &argv, None, self.timeout)
            .map_err(|e| Error::BridgeTransport(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        debug!("bridge {}: {}", args.join(" "), stdout.trim_end());

        if !out.status.success() {
            return Err(Error::BridgeTransport(format!(
                "{} {}: {}",
                self.executable,
                args.join(" "),
                out.failure_reason()
            )));
        }
        Ok(stdout)
    }
}

impl BridgePort for ArdcomBridge {
    fn start(&mut self) -> Result<()> {
        self.invoke(&["start"])?;
        info!("Bridge started ({})", self.executable);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.invoke(&["stop"])?;
        info!("Bridge stopped");
        Ok(())
    }

    fn read_telemetry(&mut self) -> Result<TelemetrySample> {
        let stdout = self.invoke(&["send", "-log"])?;
        parse_telemetry(&stdout)
    }

    fn actuate(&mut self) -> Result<()> {
        self.invoke(&["send", "-ms"])?;
        Ok(())
    }
}

/// Decode the bridge's reply to a telemetry request.
pub fn parse_telemetry(stdout: &str) -> Result<TelemetrySample> {
    let lines: Vec<&str> = stdout.lines().collect();
    let line = match lines.as_slice() {
        [line] => *line,
        [] => return Err(Error::BridgeProtocol("no reading received".into())),
        _ => {
            return Err(Error::BridgeProtocol(format!(
                "expected one line, got {}, bridge out of sync? output: {:?}",
                lines.len(),
                stdout
            )));
        }
    };

    let mut chars = line.chars();
    match chars.next() {
        Some(':') => parse_reading(chars.as_str()),
        Some('-' | '=') => Err(Error::BridgeDevice(chars.as_str().trim().to_string())),
        _ => Err(Error::BridgeProtocol(format!(
            "invalid status marker in {:?}",
            line
        ))),
    }
}

fn parse_reading(body: &str) -> Result<TelemetrySample> {
    let fields: Vec<&str> = body.split(',').map(str::trim).collect();
    let [sound, light] = fields.as_slice() else {
        return Err(Error::BridgeProtocol(format!(
            "expected <sound>,<light>, got {:?}",
            body
        )));
    };
    let parse = |field: &str, name: &str| {
        field
            .parse::<i32>()
            .map_err(|_| Error::BridgeProtocol(format!("invalid {} value {:?}", name, field)))
    };
    Ok(TelemetrySample::new(parse(sound, "sound")?, parse(light, "light")?))
}
