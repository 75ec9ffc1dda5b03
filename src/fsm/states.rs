//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch.  Handlers are pure with respect to the outside world: they
//! read inputs from [`FsmContext`] and write requests back into it.
//!
//! ```text
//!  AWAIT ──[light avg < dark]──▶ ARMED ──[sound avg > sound]──▶ VERIFY
//!    ▲                             │  ▲                           │
//!    └──────[light avg > dark]─────┘  └────────[always]───────────┘
//! ```
//!
//! In ARMED the brightening check runs first: a room that got bright and
//! noisy goes back to AWAIT, never to VERIFY.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Await
        StateDescriptor {
            id: StateId::Await,
            name: "Await",
            on_enter: Some(await_enter),
            on_exit: None,
            on_update: await_update,
        },
        // Index 1 — Armed
        StateDescriptor {
            id: StateId::Armed,
            name: "Armed",
            on_enter: Some(armed_enter),
            on_exit: None,
            on_update: armed_update,
        },
        // Index 2 — Verify
        StateDescriptor {
            id: StateId::Verify,
            name: "Verify",
            on_enter: Some(verify_enter),
            on_exit: Some(verify_exit),
            on_update: verify_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  AWAIT state — room is bright, poll slowly until it gets dark
// ═══════════════════════════════════════════════════════════════════════════

fn await_enter(ctx: &mut FsmContext) {
    info!(
        "AWAIT: waiting for light avg < {} over {} samples",
        ctx.config.dark_threshold, ctx.config.window_size
    );
}

fn await_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(sample) = ctx.telemetry.take() {
        ctx.light.push(sample.light);
    }

    if ctx.is_dark() {
        info!(
            "AWAIT: light avg {:.1} < {} → arming",
            ctx.light.average().unwrap_or_default(),
            ctx.config.dark_threshold
        );
        return Some(StateId::Armed);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED state — room is dark, listen for sound
// ═══════════════════════════════════════════════════════════════════════════

fn armed_enter(ctx: &mut FsmContext) {
    info!(
        "ARMED: listening for sound avg > {}",
        ctx.config.sound_threshold
    );
}

fn armed_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(sample) = ctx.telemetry.take() {
        ctx.light.push(sample.light);
        ctx.sound.push(sample.sound);
    }

    // Brightening wins over sound.
    if ctx.is_bright() {
        info!(
            "ARMED: light avg {:.1} > {} → room bright again",
            ctx.light.average().unwrap_or_default(),
            ctx.config.dark_threshold
        );
        return Some(StateId::Await);
    }

    if ctx.is_loud() {
        info!(
            "ARMED: sound avg {:.1} > {} → verifying presence",
            ctx.sound.average().unwrap_or_default(),
            ctx.config.sound_threshold
        );
        return Some(StateId::Verify);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  VERIFY state — one presence scan, then back to ARMED
// ═══════════════════════════════════════════════════════════════════════════

fn verify_enter(ctx: &mut FsmContext) {
    info!("VERIFY: scan of {}ms queued", ctx.config.scan_timeout_ms);
}

fn verify_exit(ctx: &mut FsmContext) {
    debug!("VERIFY: done, actuation requested = {}", ctx.commands.actuate_light);
}

fn verify_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.scan.take() {
        Some(result) if result.success => {
            info!(
                "VERIFY: presence confirmed ({} frames) → toggling light",
                result.detections
            );
            ctx.commands.actuate_light = true;
        }
        Some(result) => {
            info!(
                "VERIFY: no presence ({}/{} frames) → no action",
                result.detections, result.frames_captured
            );
        }
        None => debug!("VERIFY: no scan verdict this tick"),
    }

    // Outcome only decides actuation; the next state is always Armed.
    Some(StateId::Armed)
}
