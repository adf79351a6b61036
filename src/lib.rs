//! Pointer Fusion - motion sensing core for IR pointing remotes
//!
//! Turns the raw, noisy output of a pointing remote's IR camera,
//! accelerometer and motion-plus gyroscope into stable cursor motion,
//! tilt-corrected coordinates and edge-scroll deltas.
//!
//! # Pipelines
//!
//! - [`IrTracker`]: picks the emitter pair out of four camera slots, rejects
//!   noise, extrapolates a lost emitter and smooths the midpoint
//! - [`AngleFilter`]: roll angle from accelerometer tilt with a hysteresis deadzone
//! - [`GyroIntegrator`]: roll angle integrated from the motion-plus rate, with
//!   runtime [`Offset`] bias correction
//! - [`apply_rotation`] and [`ScrollEngine`]: tilt cancellation, per-tick
//!   step limiting and continuous edge scrolling
//!
//! [`Device`] owns one of each for a connected remote and is what a host
//! driver normally talks to. Nothing here blocks, allocates or spawns; the
//! host calls in once per raw event and once per timer tick.
//!
//! # Quick Start
//!
//! ```rust
//! use pointer_fusion::{Device, DeviceEvent, DeviceSettings, Motion, SensorSample, Timestamp};
//!
//! let settings = DeviceSettings::default();
//! let mut device = Device::new(&settings);
//!
//! // Remote held upright
//! device.handle_event(&settings, &DeviceEvent::Accelerometer {
//!     time: Timestamp::new(0, 0),
//!     sample: SensorSample::new(0, 100),
//! });
//!
//! // Both emitters visible
//! device.handle_event(&settings, &DeviceEvent::Ir {
//!     time: Timestamp::new(0, 10_000),
//!     slots: [
//!         SensorSample::new(412, 380),
//!         SensorSample::new(612, 380),
//!         SensorSample::missing(),
//!         SensorSample::missing(),
//!     ],
//! });
//!
//! // Timer tick: forward whatever comes out to the input sink
//! let output = device.tick(&settings);
//! if let Some(Motion::Absolute { x, y }) = output.pointer {
//!     println!("cursor at ({x}, {y})");
//! }
//! ```

pub mod accelerometer;
pub mod config;
mod device;
pub mod gyro;
mod history;
pub mod ir;
mod math;
pub mod offset;
mod rotation;
pub mod scroll;
mod types;

// Re-export all public types and functions
pub use accelerometer::AngleFilter;
pub use config::ConfigError;
pub use device::{Device, DeviceEvent};
pub use gyro::GyroIntegrator;
pub use history::SampleHistory;
pub use ir::{IrTracker, Selection, select_pair};
pub use math::{DEG_TO_RAD, RAD_TO_DEG, Vector2Ext, angle_difference, normalize_degrees, wrap_degrees};
pub use offset::Offset;
pub use rotation::apply_rotation;
pub use scroll::{ScrollEngine, TickOutput};
pub use types::*;
