//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                         |
//! |------------|--------------|-------------------------------------|
//! | `bridge`   | BridgePort   | `ardcom` serial bridge executable   |
//! | `camera`   | CameraPort   | V4L2 node + frame grabber command   |
//! | `detector` | DetectorPort | Person-detector command (JSON out)  |
//! | `log_sink` | EventSink    | `log` facade                        |
//! | `time`     | Clock        | `std::time::Instant`                |

pub mod bridge;
pub mod camera;
pub mod detector;
pub mod log_sink;
pub mod time;

pub(super) mod process;
