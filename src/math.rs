//! Angle helpers and nalgebra extensions for the pointer fusion library

use nalgebra::{Point2, Vector2};

/// Mathematical constants
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Wrap an angle in degrees into [0, 360)
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Normalize an angle in degrees into (-180, 180]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = wrap_degrees(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Signed shortest-arc difference `to - from`, in degrees
pub fn angle_difference(from: f64, to: f64) -> f64 {
    normalize_degrees(to - from)
}

/// Squared distance between two integer points
pub fn distance_squared(a: Point2<i32>, b: Point2<i32>) -> i64 {
    let dx = i64::from(a.x - b.x);
    let dy = i64::from(a.y - b.y);
    dx * dx + dy * dy
}

/// Extension trait for Vector2 operations
pub trait Vector2Ext {
    /// Scale the vector down so its magnitude does not exceed `max`,
    /// preserving direction
    fn clamp_magnitude(&self, max: f64) -> Vector2<f64>;

    /// Polar angle in degrees measured from +y, clockwise positive toward +x
    fn heading_degrees(&self) -> f64;
}

impl Vector2Ext for Vector2<f64> {
    fn clamp_magnitude(&self, max: f64) -> Vector2<f64> {
        let magnitude = self.norm();
        if magnitude > max && magnitude > 0.0 {
            *self * max / magnitude
        } else {
            *self
        }
    }

    fn heading_degrees(&self) -> f64 {
        self.x.atan2(self.y) * RAD_TO_DEG
    }
}
