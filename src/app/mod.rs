//! Application core — domain orchestration, I/O only through ports.
//!
//! This module contains the control-loop rules for the room-light
//! controller: telemetry intake, FSM orchestration, presence scans and
//! actuation.  All interaction with the bridge, camera, detector and clock
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
