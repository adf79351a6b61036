//! Tilt cancellation for IR coordinates

use nalgebra::{Point2, Rotation2, Vector2};

use crate::math::DEG_TO_RAD;
use crate::types::{IR_MAX_X, IR_MAX_Y};

/// Rotate an IR position about the center of the camera range
///
/// The camera range is not square, so x is first scaled into a square
/// `IR_MAX_Y`-sized frame, rotated around its center, then scaled back.
/// Angles follow the tilt convention of the angle sources: 0° points along
/// +y and positive angles turn clockwise toward +x, i.e. a point at polar
/// angle `atan2(x, y)` ends up at `atan2(x, y) + angle`.
///
/// # Example
/// ```
/// use nalgebra::Point2;
/// use pointer_fusion::apply_rotation;
///
/// let p = Point2::new(700.0, 200.0);
/// let there = apply_rotation(p, 35.0);
/// let back = apply_rotation(there, -35.0);
/// assert!((back - p).norm() < 1e-9);
/// ```
pub fn apply_rotation(point: Point2<f64>, angle: f64) -> Point2<f64> {
    if angle == 0.0 {
        return point;
    }

    let x_scale = f64::from(IR_MAX_Y) / f64::from(IR_MAX_X);
    let center = f64::from(IR_MAX_Y) / 2.0;

    let centered = Vector2::new(point.x * x_scale - center, point.y - center);
    // Clockwise from +y is counter-clockwise in nalgebra's (x, y) frame
    let rotated = Rotation2::new(-angle * DEG_TO_RAD) * centered;

    Point2::new((rotated.x + center) / x_scale, rotated.y + center)
}
