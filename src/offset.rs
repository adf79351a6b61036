//! Motion-plus rate bias correction for the pointer fusion library

use crate::types::GyroSettings;

/// Runtime estimate of the angular-rate bias
///
/// The raw motion-plus rate of a resting remote is rarely zero and drifts
/// with temperature. Once the corrected rate has stayed inside the
/// stationary threshold for `offset_timeout` seconds, the bias is pulled
/// toward the observed rate by a low-pass filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offset {
    /// Time spent stationary, in seconds
    timer: f64,
    /// Estimated bias in raw rate units
    bias: f64,
}

impl Offset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the bias estimate and return the corrected rate
    ///
    /// # Arguments
    /// * `settings` - Threshold, timeout and filter coefficient
    /// * `rate` - Raw angular rate
    /// * `delta_time` - Seconds since the previous sample
    ///
    /// # Example
    /// ```
    /// use pointer_fusion::{GyroSettings, Offset};
    ///
    /// let mut offset = Offset::new();
    /// let corrected = offset.update(&GyroSettings::default(), 12.0, 0.01);
    /// assert_eq!(corrected, 12.0); // no estimate yet
    /// ```
    pub fn update(&mut self, settings: &GyroSettings, rate: f64, delta_time: f64) -> f64 {
        let corrected = rate - self.bias;

        if corrected.abs() > settings.stationary_threshold {
            self.timer = 0.0;
            return corrected;
        }

        if self.timer < settings.offset_timeout {
            self.timer += delta_time;
            return corrected;
        }

        self.bias += corrected * settings.offset_filter_coefficient;
        corrected
    }

    /// Current bias estimate in raw rate units
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Whether the estimator has been stationary long enough to adapt
    pub fn is_active(&self, settings: &GyroSettings) -> bool {
        self.timer >= settings.offset_timeout
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.bias = 0.0;
    }
}
