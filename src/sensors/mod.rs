//! Telemetry from the sensor bridge and the windows that debounce it.
//!
//! The bridge produces one [`TelemetrySample`] per read.  The FSM feeds the
//! two channels into separate [`SlidingWindow`](window::SlidingWindow)s and
//! only trusts their averages once a full window has accumulated.

pub mod window;

/// One `(sound, light)` reading from the bridge.
///
/// On the stock board `sound` is the digital microphone output and `light`
/// the photoresistor's ADC count.  Both are plain telemetry units here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySample {
    pub sound: i32,
    pub light: i32,
}

impl TelemetrySample {
    pub const fn new(sound: i32, light: i32) -> Self {
        Self { sound, light }
    }
}
