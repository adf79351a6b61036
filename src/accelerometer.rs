//! Accelerometer tilt angle filter
//!
//! Derives the roll of the remote around its pointing axis from the two tilt
//! axes of the accelerometer, then relaxes a smoothed angle toward it with a
//! hysteresis deadzone so small wobbles never reach the cursor.

use nalgebra::Vector2;
use tracing::debug;

use crate::history::SampleHistory;
use crate::math::{Vector2Ext, angle_difference, normalize_degrees};
use crate::types::{AngleSettings, SensorSample};

/// Accelerometer range per axis, in raw units
pub const ACCELEROMETER_MIN: i32 = -100;
pub const ACCELEROMETER_MAX: i32 = 100;

/// Samples kept in the history
pub const HISTORY_LEN: usize = 12;
/// Only every `HISTORY_STRIDE`-th sample is averaged
pub const HISTORY_STRIDE: usize = 2;

/// Smoothed rotation angle from accelerometer tilt
///
/// Angles are in degrees, 0° meaning the remote is upright (gravity along +y)
/// and growing clockwise toward +x, in the range (-180, 180].
#[derive(Debug, Clone, Copy)]
pub struct AngleFilter {
    history: SampleHistory<SensorSample, HISTORY_LEN>,
    /// Angle of the averaged tilt vector
    raw_angle: f64,
    /// Relaxed angle handed to the rotation step
    smoothed_angle: f64,
    in_deadzone: bool,
}

impl AngleFilter {
    pub fn new() -> Self {
        Self {
            history: SampleHistory::new(),
            raw_angle: 0.0,
            smoothed_angle: 0.0,
            in_deadzone: true,
        }
    }

    /// Record a tilt sample and recompute the raw angle
    ///
    /// Invalid samples are ignored. Each axis is clamped to the
    /// accelerometer range before it enters the history.
    ///
    /// # Example
    /// ```
    /// use pointer_fusion::{AngleFilter, SensorSample};
    ///
    /// let mut filter = AngleFilter::new();
    /// filter.update(SensorSample::new(100, 0));
    /// assert!((filter.raw_angle() - 90.0).abs() < 1e-9);
    /// ```
    pub fn update(&mut self, sample: SensorSample) {
        if !sample.valid {
            return;
        }

        self.history.push(SensorSample {
            x: sample.x.clamp(ACCELEROMETER_MIN, ACCELEROMETER_MAX),
            y: sample.y.clamp(ACCELEROMETER_MIN, ACCELEROMETER_MAX),
            valid: true,
        });

        let (sum, count) = self
            .history
            .strided(HISTORY_STRIDE)
            .fold((Vector2::<f64>::zeros(), 0u32), |(sum, count), s| {
                (sum + Vector2::new(f64::from(s.x), f64::from(s.y)), count + 1)
            });
        let tilt: Vector2<f64> = sum / f64::from(count.max(1));

        // A zero tilt vector has no direction; keep the last angle
        if tilt.norm_squared() > 0.0 {
            self.raw_angle = normalize_degrees(tilt.heading_degrees());
        }
    }

    /// Relax the smoothed angle toward the raw angle, once per timer period
    pub fn tick(&mut self, settings: &AngleSettings) {
        let gap = angle_difference(self.smoothed_angle, self.raw_angle);

        if self.in_deadzone {
            if gap.abs() < settings.angle_deadzone {
                return;
            }
            self.in_deadzone = false;
            debug!(raw = self.raw_angle, smoothed = self.smoothed_angle, "angle left deadzone");
        }

        if gap.abs() <= settings.max_deadzone_angle_delta {
            self.smoothed_angle = self.raw_angle;
            self.in_deadzone = true;
            debug!(angle = self.smoothed_angle, "angle settled");
        } else {
            let step = gap.abs().min(settings.max_angle_delta);
            self.smoothed_angle = normalize_degrees(self.smoothed_angle + step.copysign(gap));
        }
    }

    /// Smoothed angle in degrees
    pub fn angle(&self) -> f64 {
        self.smoothed_angle
    }

    /// Unsmoothed angle of the averaged tilt, in degrees
    pub fn raw_angle(&self) -> f64 {
        self.raw_angle
    }

    /// Whether the smoothed angle is holding inside the deadzone
    pub fn is_in_deadzone(&self) -> bool {
        self.in_deadzone
    }

    /// Forget the history and return to upright
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for AngleFilter {
    fn default() -> Self {
        Self::new()
    }
}
