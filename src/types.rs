//! Core types, settings and conventions for the pointer fusion library

use core::fmt;
use core::ops::Add;
use serde::{Deserialize, Serialize};

/// Lowest horizontal IR camera coordinate
pub const IR_MIN_X: i32 = 0;
/// Highest horizontal IR camera coordinate
pub const IR_MAX_X: i32 = 1023;
/// Lowest vertical IR camera coordinate
pub const IR_MIN_Y: i32 = 0;
/// Highest vertical IR camera coordinate
pub const IR_MAX_Y: i32 = 767;

/// Event timestamp as delivered by the device (seconds + microseconds)
///
/// Ordering is lexicographic on `(secs, usecs)`, matching how the host
/// stamps input events.
///
/// # Example
/// ```
/// use pointer_fusion::Timestamp;
///
/// let a = Timestamp::new(10, 900_000);
/// let b = Timestamp::new(11, 0);
/// assert!(a < b);
/// assert!((b.seconds_since(a) - 0.1).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    /// Whole seconds
    pub secs: i64,
    /// Microseconds within the second
    pub usecs: i64,
}

impl Timestamp {
    pub const fn new(secs: i64, usecs: i64) -> Self {
        Self { secs, usecs }
    }

    /// Timestamp from fractional seconds, handy for tests and replays
    pub fn from_secs_f64(secs: f64) -> Self {
        let whole = secs.floor();
        let usecs = ((secs - whole) * 1_000_000.0).round() as i64;
        if usecs >= 1_000_000 {
            Self::new(whole as i64 + 1, usecs - 1_000_000)
        } else {
            Self::new(whole as i64, usecs)
        }
    }

    /// Signed elapsed time from `earlier` to `self`, in seconds
    pub fn seconds_since(self, earlier: Timestamp) -> f64 {
        (self.secs - earlier.secs) as f64 + (self.usecs - earlier.usecs) as f64 * 1e-6
    }
}

impl Add<u32> for Timestamp {
    type Output = Timestamp;

    /// Adds whole seconds, leaving the microsecond part untouched
    fn add(self, secs: u32) -> Timestamp {
        Timestamp::new(self.secs + i64::from(secs), self.usecs)
    }
}

/// A raw 2-D sensor reading with a validity flag
///
/// Used for IR camera slots (camera units) and accelerometer tilt
/// (raw units, nominally -100..=100 per axis). The timestamp travels
/// with the enclosing [`DeviceEvent`](crate::DeviceEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSample {
    pub x: i32,
    pub y: i32,
    /// Whether the sensor reports this reading as present
    pub valid: bool,
}

impl SensorSample {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y, valid: true }
    }

    /// An empty slot, as reported for an undetected IR point
    pub const fn missing() -> Self {
        Self {
            x: 0,
            y: 0,
            valid: false,
        }
    }
}

/// Pointer operating mode
///
/// - **Pointer**: absolute, screen-mapped cursor positioning
/// - **Game**: relative motion deltas plus continuous edge scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Pointer,
    Game,
}

impl Mode {
    /// Largest per-tick cursor step, in IR units
    pub fn max_delta(self) -> f64 {
        match self {
            Mode::Pointer => 3.0,
            Mode::Game => 8.0,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Pointer => f.write_str("pointer"),
            Mode::Game => f.write_str("game"),
        }
    }
}

/// Pointer motion to forward to the host sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Relative motion in sink units
    Relative { dx: i32, dy: i32 },
    /// Absolute position, already scaled to screen resolution
    Absolute { x: i32, y: i32 },
}

/// Sensor that drives the pointer
///
/// Independent of [`AngleSource`], which only picks the angle used to
/// cancel tilt in IR coordinates. Only [`MotionSource::Ir`] makes
/// [`Device::tick`](crate::Device::tick) emit pointer and edge-scroll
/// motion. With `Accelerometer` or `MotionPlus` the host maps those raw
/// events to the pointer itself; IR is still tracked for key-map liveness.
/// `None` keeps the pointer still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionSource {
    None,
    #[default]
    Ir,
    Accelerometer,
    MotionPlus,
}

impl fmt::Display for MotionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MotionSource::None => "none",
            MotionSource::Ir => "ir",
            MotionSource::Accelerometer => "accelerometer",
            MotionSource::MotionPlus => "motionplus",
        })
    }
}

/// Source of the rotation angle used to cancel device tilt
///
/// # Example
/// ```
/// use pointer_fusion::{AngleSource, DeviceSettings};
///
/// let settings = DeviceSettings {
///     angle_source: AngleSource::Blend { gyro_weight: 0.8 },
///     ..Default::default()
/// };
/// assert!(settings.ir.remove_rotation);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AngleSource {
    /// Smoothed accelerometer tilt only
    #[default]
    Accelerometer,
    /// Integrated motion-plus angle, falling back to the accelerometer
    /// once no gyro sample arrived within `gyro.expiry_secs`
    MotionPlus,
    /// Shortest-arc weighted blend of both angles
    Blend {
        /// Weight of the gyro angle, 0.0 ..= 1.0
        gyro_weight: f64,
    },
}

/// IR tracker settings
///
/// # Example
/// ```
/// use pointer_fusion::IrSettings;
///
/// let settings = IrSettings {
///     avg_radius: 12,
///     avg_min_samples: 20, // larger than avg_max_samples
///     ..Default::default()
/// }
/// .sanitized();
/// assert_eq!(settings.avg_min_samples, settings.avg_max_samples);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrSettings {
    /// Radius around the running average inside which samples are blended
    pub avg_radius: i32,
    /// Sample count the running average saturates at
    pub avg_max_samples: u32,
    /// Samples needed before blending toward the average starts
    pub avg_min_samples: u32,
    /// Weight of the running average in the blend
    pub avg_weight: u32,
    /// How long IR data keeps gating key mapping after the last valid frame
    pub keymap_expiry_secs: u32,
    /// Rotate IR coordinates to cancel the device tilt
    pub remove_rotation: bool,
}

impl Default for IrSettings {
    fn default() -> Self {
        Self {
            avg_radius: 10,
            avg_max_samples: 8,
            avg_min_samples: 4,
            avg_weight: 3,
            keymap_expiry_secs: 1,
            remove_rotation: true,
        }
    }
}

impl IrSettings {
    /// Clamp out-of-range values to the nearest valid bound
    pub fn sanitized(mut self) -> Self {
        self.avg_radius = self.avg_radius.max(0);
        self.avg_max_samples = self.avg_max_samples.max(1);
        self.avg_min_samples = self.avg_min_samples.clamp(1, self.avg_max_samples);
        self
    }
}

/// Accelerometer angle filter settings, all in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleSettings {
    /// Largest step of the smoothed angle per tick
    pub max_angle_delta: f64,
    /// Remaining gap at which the smoothed angle snaps and re-enters the deadzone
    pub max_deadzone_angle_delta: f64,
    /// Band around the smoothed angle in which raw changes are ignored
    pub angle_deadzone: f64,
}

impl Default for AngleSettings {
    fn default() -> Self {
        Self {
            max_angle_delta: 0.1,
            max_deadzone_angle_delta: 0.001,
            angle_deadzone: 10.0,
        }
    }
}

/// `value` when finite, `default` for NaN and infinities
fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

impl AngleSettings {
    /// Make every value a finite, non-negative number of degrees
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.max_angle_delta = finite_or(self.max_angle_delta, defaults.max_angle_delta).abs();
        self.max_deadzone_angle_delta =
            finite_or(self.max_deadzone_angle_delta, defaults.max_deadzone_angle_delta).abs();
        self.angle_deadzone = finite_or(self.angle_deadzone, defaults.angle_deadzone).abs();
        self
    }
}

/// Motion-plus integration settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GyroSettings {
    /// Degrees per second per raw rate unit
    pub scale: f64,
    /// Gaps between samples longer than this are not integrated, in seconds
    pub max_interval_secs: f64,
    /// Gyro angle is considered stale after this many seconds without samples
    pub expiry_secs: f64,
    /// Bias estimator: rates below this (raw units) count as stationary
    pub stationary_threshold: f64,
    /// Bias estimator: stationary time before the bias starts adapting, in seconds
    pub offset_timeout: f64,
    /// Bias estimator: low-pass filter coefficient per sample
    pub offset_filter_coefficient: f64,
}

impl Default for GyroSettings {
    fn default() -> Self {
        Self {
            scale: 0.05,
            max_interval_secs: 0.5,
            expiry_secs: 1.0,
            stationary_threshold: 60.0,
            offset_timeout: 5.0,
            offset_filter_coefficient: 0.01,
        }
    }
}

impl GyroSettings {
    /// Replace non-finite values with defaults and clamp the rest
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.scale = finite_or(self.scale, defaults.scale);
        self.max_interval_secs = finite_or(self.max_interval_secs, defaults.max_interval_secs).max(0.0);
        self.expiry_secs = finite_or(self.expiry_secs, defaults.expiry_secs).max(0.0);
        self.stationary_threshold =
            finite_or(self.stationary_threshold, defaults.stationary_threshold).abs();
        self.offset_timeout = finite_or(self.offset_timeout, defaults.offset_timeout).max(0.0);
        self.offset_filter_coefficient =
            finite_or(self.offset_filter_coefficient, defaults.offset_filter_coefficient).clamp(0.0, 1.0);
        self
    }
}

/// Edge scrolling and sink scaling settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Width of the horizontal edge band, in IR units
    pub border_x: i32,
    /// Height of the vertical edge band, in IR units
    pub border_y: i32,
    /// Horizontal scroll speed at the very edge, in sink units per tick
    pub max_speed_x: i32,
    /// Vertical scroll speed at the very edge, in sink units per tick
    pub max_speed_y: i32,
    /// IR to screen scale for absolute motion
    pub screen_ratio: i32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            border_x: 200,
            border_y: 150,
            max_speed_x: 10,
            max_speed_y: 10,
            screen_ratio: 1,
        }
    }
}

impl ScrollSettings {
    pub fn sanitized(mut self) -> Self {
        self.border_x = self.border_x.clamp(1, IR_MAX_X / 2);
        self.border_y = self.border_y.clamp(1, IR_MAX_Y / 2);
        self.screen_ratio = self.screen_ratio.max(1);
        self
    }
}

/// Complete per-device configuration
///
/// Immutable for a session once loaded; every pipeline call borrows the
/// part it needs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub mode: Mode,
    pub motion_source: MotionSource,
    pub angle_source: AngleSource,
    pub ir: IrSettings,
    pub angle: AngleSettings,
    pub gyro: GyroSettings,
    pub scroll: ScrollSettings,
}

impl DeviceSettings {
    /// Clamp every group to its valid range
    pub fn sanitized(mut self) -> Self {
        self.ir = self.ir.sanitized();
        self.angle = self.angle.sanitized();
        self.gyro = self.gyro.sanitized();
        self.scroll = self.scroll.sanitized();
        if let AngleSource::Blend { gyro_weight } = &mut self.angle_source {
            *gyro_weight = finite_or(*gyro_weight, 0.5).clamp(0.0, 1.0);
        }
        self
    }
}
