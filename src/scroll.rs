//! Per-tick cursor smoothing and continuous edge scrolling

use nalgebra::{Point2, Vector2};

use crate::math::Vector2Ext;
use crate::types::{IR_MAX_X, IR_MAX_Y, Mode, Motion, ScrollSettings};

/// Motion produced by one timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutput {
    /// Smoothed cursor motion, absent when the cursor did not move by a
    /// whole unit
    pub pointer: Option<Motion>,
    /// Whole units of continuous edge scroll, absent when below one unit
    pub scroll: Option<Motion>,
}

/// Smoothed scroll position, edge-scroll speed and sub-unit remainders
#[derive(Debug, Clone, Copy)]
pub struct ScrollEngine {
    smoothed: Point2<f64>,
    speed: Vector2<f64>,
    /// Edge scroll not yet emitted
    remainder: Vector2<f64>,
    /// Relative cursor motion not yet emitted
    motion_remainder: Vector2<f64>,
}

/// Speed along one axis for a position inside `[0, max]`
fn edge_speed(position: f64, border: f64, max: f64, max_speed: f64) -> f64 {
    let scale = max_speed / border;
    if position < border {
        (position - border) * scale
    } else if position > max - border {
        (position - (max - border)) * scale
    } else {
        0.0
    }
}

impl ScrollEngine {
    /// Start with the smoothed position at `origin`, usually the first
    /// tracked point or the camera center
    pub fn new(origin: Point2<f64>) -> Self {
        Self {
            smoothed: origin,
            speed: Vector2::zeros(),
            remainder: Vector2::zeros(),
            motion_remainder: Vector2::zeros(),
        }
    }

    /// Recompute the continuous scroll speed from the smoothed position
    ///
    /// Only game mode scrolls: the speed on each axis grows linearly with
    /// how deep the smoothed position sits inside the border band at either
    /// edge, reaching the configured maximum at the very edge. Outside game
    /// mode the speed is left as it is.
    ///
    /// # Example
    /// ```
    /// use nalgebra::Point2;
    /// use pointer_fusion::{Mode, ScrollEngine, ScrollSettings};
    ///
    /// let settings = ScrollSettings { border_x: 100, max_speed_x: 10, ..Default::default() };
    /// let mut engine = ScrollEngine::new(Point2::new(50.0, 383.0));
    /// let speed = engine.compute_scroll_speed(&settings, Mode::Game);
    /// assert_eq!(speed.x, -5.0);
    /// assert_eq!(speed.y, 0.0);
    /// ```
    pub fn compute_scroll_speed(&mut self, settings: &ScrollSettings, mode: Mode) -> Vector2<f64> {
        if mode == Mode::Game {
            self.speed = Vector2::new(
                edge_speed(
                    self.smoothed.x,
                    f64::from(settings.border_x),
                    f64::from(IR_MAX_X),
                    f64::from(settings.max_speed_x),
                ),
                edge_speed(
                    self.smoothed.y,
                    f64::from(settings.border_y),
                    f64::from(IR_MAX_Y),
                    f64::from(settings.max_speed_y),
                ),
            );
        }
        self.speed
    }

    /// Advance the smoothed position toward `tracked` and drain the scroll
    /// accumulators
    ///
    /// The step toward the tracked point is capped at [`Mode::max_delta`]
    /// preserving its direction. Game mode emits the whole part of the
    /// accumulated steps as relative motion and scrolls by the whole part of
    /// the accumulated speed; pointer mode emits the smoothed position as
    /// absolute motion scaled by `screen_ratio`.
    ///
    /// # Example
    /// ```
    /// use nalgebra::Point2;
    /// use pointer_fusion::{Mode, Motion, ScrollEngine, ScrollSettings};
    ///
    /// let settings = ScrollSettings::default();
    /// let mut engine = ScrollEngine::new(Point2::new(400.0, 300.0));
    ///
    /// // Half a unit per tick adds up to one unit every other tick
    /// assert_eq!(engine.tick(&settings, Mode::Game, Point2::new(400.5, 300.0)).pointer, None);
    /// assert_eq!(
    ///     engine.tick(&settings, Mode::Game, Point2::new(401.0, 300.0)).pointer,
    ///     Some(Motion::Relative { dx: 1, dy: 0 })
    /// );
    /// ```
    pub fn tick(&mut self, settings: &ScrollSettings, mode: Mode, tracked: Point2<f64>) -> TickOutput {
        let mut output = TickOutput::default();

        let delta = tracked - self.smoothed;
        if delta != Vector2::zeros() {
            let step = delta.clamp_magnitude(mode.max_delta());
            // Land exactly on the target once within reach
            self.smoothed = if step == delta { tracked } else { self.smoothed + step };

            output.pointer = match mode {
                Mode::Game => {
                    self.motion_remainder += step;
                    let whole = self.motion_remainder.map(f64::trunc);
                    self.motion_remainder -= whole;
                    (whole != Vector2::zeros()).then(|| Motion::Relative {
                        dx: whole.x as i32,
                        dy: whole.y as i32,
                    })
                }
                Mode::Pointer => Some(Motion::Absolute {
                    x: self.smoothed.x as i32 * settings.screen_ratio,
                    y: self.smoothed.y as i32 * settings.screen_ratio,
                }),
            };
        }

        if mode == Mode::Game {
            self.remainder += self.speed;
            let whole = self.remainder.map(f64::trunc);
            self.remainder -= whole;

            if whole != Vector2::zeros() {
                output.scroll = Some(Motion::Relative {
                    dx: whole.x as i32,
                    dy: whole.y as i32,
                });
            }
        }

        output
    }

    /// Smoothed cursor position in IR units
    pub fn smoothed(&self) -> Point2<f64> {
        self.smoothed
    }

    /// Current continuous scroll speed in sink units per tick
    pub fn speed(&self) -> Vector2<f64> {
        self.speed
    }

    /// Override the continuous scroll speed until the next recompute
    pub fn set_speed(&mut self, speed: Vector2<f64>) {
        self.speed = speed;
    }

    /// Fractional scroll not yet emitted
    pub fn remainder(&self) -> Vector2<f64> {
        self.remainder
    }

    /// Fractional relative cursor motion not yet emitted
    pub fn motion_remainder(&self) -> Vector2<f64> {
        self.motion_remainder
    }

    /// Drop any pending scroll and relative motion, e.g. when leaving game mode
    pub fn stop_scrolling(&mut self) {
        self.speed = Vector2::zeros();
        self.remainder = Vector2::zeros();
        self.motion_remainder = Vector2::zeros();
    }
}

impl Default for ScrollEngine {
    fn default() -> Self {
        Self::new(Point2::new(f64::from(IR_MAX_X) / 2.0, f64::from(IR_MAX_Y) / 2.0))
    }
}
