//! Room-light controller library.
//!
//! Exposes the control core (windows, FSM, presence scanner, application
//! service, driver loop) and the process-backed adapters so the binary and
//! the integration tests share one implementation.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod driver;
pub mod error;
pub mod fsm;
pub mod presence;
pub mod sensors;
