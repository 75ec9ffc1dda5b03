//! Room-light controller: main entry point.
//!
//! Hexagonal architecture driven by a blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ArdcomBridge    CommandCamera   CommandDetector   SystemClock │
//! │  (BridgePort)    (CameraPort)    (DetectorPort)    (Clock)     │
//! │  LogEventSink                                                  │
//! │  (EventSink)                                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        AppService (pure logic) + PresenceScanner       │    │
//! │  │        FSM · sliding windows · scan verdict            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  DriverLoop (state-timed ticks) · signal thread (SIGINT/TERM)  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use roomlight::adapters::bridge::ArdcomBridge;
use roomlight::adapters::camera::CommandCamera;
use roomlight::adapters::detector::CommandDetector;
use roomlight::adapters::log_sink::LogEventSink;
use roomlight::adapters::time::SystemClock;
use roomlight::app::ports::{BridgePort, Clock, PresencePort};
use roomlight::app::service::AppService;
use roomlight::config::SystemConfig;
use roomlight::driver::DriverLoop;
use roomlight::presence::PresenceScanner;

/// Exit status of `scan` when the deadline passed without confirmation.
const EXIT_NOT_CONFIRMED: u8 = 1;
/// Exit status of `scan` when the scan itself failed.
const EXIT_SCAN_ERROR: u8 = 2;

// ── CLI ───────────────────────────────────────────────────────

/// Night-time room light automation.
#[derive(Parser, Debug)]
#[command(name = "roomlight", version, about)]
struct Cli {
    /// Path to a JSON config file (missing fields use defaults).
    #[arg(long, env = "ROOMLIGHT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Light average below this means dark.
    #[arg(long, global = true)]
    dark_threshold: Option<i32>,

    /// Sound average above this means a sound was heard.
    #[arg(long, global = true)]
    sound_threshold: Option<i32>,

    /// Samples per sliding window.
    #[arg(long, global = true)]
    window_size: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the control loop until SIGINT/SIGTERM (default).
    Run,
    /// Run one presence scan and exit 0 (confirmed) or 1 (timed out).
    Scan,
}

impl Cli {
    /// File (or defaults) + CLI overrides, validated.
    fn resolve_config(&self) -> Result<SystemConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let c = SystemConfig::load(path)
                    .with_context(|| format!("loading config {}", path.display()))?;
                info!("Config loaded from {}", path.display());
                c
            }
            None => {
                info!("No config file given, using defaults");
                SystemConfig::default()
            }
        };

        if let Some(v) = self.dark_threshold {
            config.dark_threshold = v;
        }
        if let Some(v) = self.sound_threshold {
            config.sound_threshold = v;
        }
        if let Some(v) = self.window_size {
            config.window_size = v;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> ExitCode {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);

    info!("╔══════════════════════════════════════╗");
    info!("║  roomlight v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = match cli.resolve_config() {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            return match command {
                Command::Scan => ExitCode::from(EXIT_SCAN_ERROR),
                Command::Run => ExitCode::FAILURE,
            };
        }
    };

    // ── 3. Dispatch ───────────────────────────────────────────
    match command {
        Command::Run => match run_daemon(config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
        Command::Scan => match run_scan(&config) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::from(EXIT_NOT_CONFIRMED),
            Err(e) => {
                error!("{:#}", e);
                ExitCode::from(EXIT_SCAN_ERROR)
            }
        },
    }
}

// ── Vision stack ──────────────────────────────────────────────

fn build_scanner(
    config: &SystemConfig,
) -> PresenceScanner<CommandCamera, CommandDetector, SystemClock> {
    let camera = CommandCamera::new(
        config.camera_device,
        config.capture_command.clone(),
        config.vision_command_timeout(),
    );
    let detector = CommandDetector::new(
        config.detector_command.clone(),
        config.vision_command_timeout(),
    );
    info!(
        "Camera {} · detector `{}`",
        camera.device().display(),
        config.detector_command.join(" ")
    );
    PresenceScanner::new(camera, detector, SystemClock::new())
}

// ── One-shot scan ─────────────────────────────────────────────

/// `Ok(true)` if presence was confirmed within the scan timeout.
fn run_scan(config: &SystemConfig) -> Result<bool> {
    let mut scanner = build_scanner(config);
    let result = scanner
        .scan(
            config.scan_timeout(),
            config.detection_threshold,
            config.confidence_threshold_percent,
        )
        .context("presence scan failed")?;

    info!(
        "Scan {}: {}/{} detections over {} frames in {:?}",
        if result.success { "confirmed" } else { "timed out" },
        result.detections,
        config.detection_threshold,
        result.frames_captured,
        result.elapsed
    );
    Ok(result.success)
}

// ── Daemon ────────────────────────────────────────────────────

fn run_daemon(config: SystemConfig) -> Result<()> {
    let (stop_tx, mut stop_rx) = mpsc::channel();
    spawn_signal_listener(stop_tx)?;

    let clock = SystemClock::new();
    let mut bridge = ArdcomBridge::with_args(
        config.bridge_executable.clone(),
        config.bridge_args.clone(),
        config.bridge_command_timeout(),
    );
    bridge.start().context("starting hardware bridge")?;
    clock.sleep(config.bridge_settle());

    let scanner = build_scanner(&config);
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config);
    app.start(&mut sink);

    info!("System ready. Entering control loop.");
    let mut driver = DriverLoop::new(app, bridge, scanner, clock, sink);
    let outcome = driver.run(&mut stop_rx);

    // ── Guaranteed bridge shutdown ────────────────────────────
    let (app, mut bridge, _) = driver.into_parts();
    let stopped = bridge.stop();
    info!(
        "Control loop ended after {} ticks ({}s uptime)",
        app.tick_count(),
        clock.uptime_secs()
    );

    match (outcome, stopped) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(e)) => Err(e).context("stopping hardware bridge"),
        (Err(e), stop) => {
            if let Err(stop_err) = stop {
                warn!("Bridge stop also failed: {}", stop_err);
            }
            Err(e).context("control loop aborted")
        }
    }
}

// ── Signals ───────────────────────────────────────────────────

/// Watch for SIGINT/SIGTERM on a dedicated thread and forward one stop
/// request to the control loop.
fn spawn_signal_listener(stop: Sender<()>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building signal runtime")?;

    thread::Builder::new()
        .name("signals".into())
        .spawn(move || match runtime.block_on(shutdown_signal()) {
            Ok(()) => {
                info!("Shutdown signal received, stopping after the current tick");
                let _ = stop.send(());
            }
            Err(e) => {
                // Keep the sender alive: dropping it would stop the loop.
                warn!("Signal handling unavailable: {}", e);
                std::mem::forget(stop);
            }
        })
        .context("spawning signal thread")?;
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = sigterm.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
