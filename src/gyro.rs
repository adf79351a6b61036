//! Motion-plus angular rate integration

use crate::math::wrap_degrees;
use crate::offset::Offset;
use crate::types::{GyroSettings, Timestamp};

/// Absolute roll angle integrated from the motion-plus rate
///
/// The angle is kept in [0, 360) degrees and follows the same convention
/// as [`AngleFilter`](crate::AngleFilter): clockwise positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct GyroIntegrator {
    angle: f64,
    last_sample: Option<Timestamp>,
    offset: Offset,
}

impl GyroIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate one rate sample over `delta_time` seconds
    ///
    /// # Example
    /// ```
    /// use pointer_fusion::{GyroIntegrator, GyroSettings};
    ///
    /// let settings = GyroSettings { scale: 1.0, ..Default::default() };
    /// let mut gyro = GyroIntegrator::new();
    /// gyro.update(&settings, -90.0, 1.0); // -90 deg/s for one second
    /// assert!((gyro.angle() - 270.0).abs() < 1e-9);
    /// ```
    pub fn update(&mut self, settings: &GyroSettings, rate: f64, delta_time: f64) {
        if delta_time <= 0.0 {
            return;
        }
        let corrected = self.offset.update(settings, rate, delta_time);
        self.angle = wrap_degrees(self.angle + corrected * settings.scale * delta_time);
    }

    /// Integrate a rate sample stamped with the device event time
    ///
    /// The first sample only records its time. Gaps longer than
    /// `max_interval_secs` (or going backwards) restart the clock without
    /// integrating, so a stalled connection cannot spin the angle.
    pub fn update_at(&mut self, settings: &GyroSettings, rate: f64, time: Timestamp) {
        let previous = self.last_sample.replace(time);
        let Some(previous) = previous else {
            return;
        };

        let delta_time = time.seconds_since(previous);
        if delta_time > settings.max_interval_secs {
            return;
        }
        self.update(settings, rate, delta_time);
    }

    /// Accumulated angle in degrees, [0, 360)
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Time of the most recent rate sample
    pub fn last_sample(&self) -> Option<Timestamp> {
        self.last_sample
    }

    /// Whether a sample arrived within `expiry_secs` of `now`
    pub fn is_fresh(&self, settings: &GyroSettings, now: Timestamp) -> bool {
        self.last_sample
            .is_some_and(|last| now.seconds_since(last) <= settings.expiry_secs)
    }

    /// Current rate bias estimate, in raw units
    pub fn bias(&self) -> f64 {
        self.offset.bias()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
