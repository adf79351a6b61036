//! IR dual-point tracker
//!
//! The IR camera reports up to four bright spots. A pointing remote looks at
//! a bar with two emitters, so the tracker keeps the two spots closest to
//! where the pair was last seen, extrapolates a partner when only one spot is
//! visible, and smooths the pair's midpoint with a running average.

use nalgebra::{Point2, Vector2};
use tracing::{debug, trace};

use crate::math::distance_squared;
use crate::types::{IR_MAX_X, IR_MAX_Y, IR_MIN_X, IR_MIN_Y, IrSettings, Mode, SensorSample, Timestamp};

/// Number of spots the IR camera reports per frame
pub const IR_SLOTS: usize = 4;

/// The points the tracker settled on for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Only one spot visible
    Single(Point2<i32>),
    /// Two spots, in slot order unless a later candidate replaced one
    Pair(Point2<i32>, Point2<i32>),
}

/// Pick the emitter pair out of the valid candidates
///
/// The first two candidates form the pair. Every further candidate is
/// treated as possible noise: each point's score is its squared distance to
/// the nearer of the two anchors, and a candidate scoring better than a held
/// point takes the place of the worse held point.
///
/// # Arguments
/// * `candidates` - Valid spots in slot order
/// * `reference` - Where the first emitter was last seen
/// * `predicted` - Where the second emitter is expected (`reference + displacement`)
pub fn select_pair(
    candidates: &[Point2<i32>],
    reference: Point2<i32>,
    predicted: Point2<i32>,
) -> Option<Selection> {
    let score = |p: Point2<i32>| distance_squared(p, reference).min(distance_squared(p, predicted));

    let (&first, rest) = candidates.split_first()?;
    let Some((&second, noise)) = rest.split_first() else {
        return Some(Selection::Single(first));
    };

    let (mut a, mut b) = (first, second);
    for &candidate in noise {
        let (c_score, a_score, b_score) = (score(candidate), score(a), score(b));
        if c_score < a_score {
            if b_score < a_score {
                a = candidate;
            } else {
                b = candidate;
            }
        } else if c_score < b_score {
            b = candidate;
        }
    }
    Some(Selection::Pair(a, b))
}

/// Stabilized cursor position from the IR camera
#[derive(Debug, Clone, Copy)]
pub struct IrTracker {
    /// Last confident position of the first emitter
    reference: Point2<i32>,
    /// Offset from the first emitter to the second
    displacement: Vector2<i32>,
    /// Running average of the pair midpoint
    average: Point2<f64>,
    /// Samples in the running average, saturating at `avg_max_samples`
    average_count: u32,
    last_valid_event: Timestamp,
    /// Mirrored and clamped output position
    position: Point2<f64>,
    mode: Mode,
}

impl IrTracker {
    pub fn new(mode: Mode) -> Self {
        Self {
            reference: Point2::origin(),
            displacement: Vector2::zeros(),
            average: Point2::origin(),
            average_count: 0,
            last_valid_event: Timestamp::default(),
            position: Point2::new(f64::from(IR_MAX_X) / 2.0, f64::from(IR_MAX_Y) / 2.0),
            mode,
        }
    }

    /// Process one camera frame
    ///
    /// Returns `false` when no spot is visible; the tracker state is then
    /// left untouched so tracking resumes seamlessly on the next frame.
    ///
    /// # Example
    /// ```
    /// use pointer_fusion::{IrSettings, IrTracker, Mode, SensorSample, Timestamp};
    ///
    /// let settings = IrSettings::default();
    /// let mut tracker = IrTracker::new(Mode::Pointer);
    /// let frame = [
    ///     SensorSample::new(400, 300),
    ///     SensorSample::new(600, 300),
    ///     SensorSample::missing(),
    ///     SensorSample::missing(),
    /// ];
    /// assert!(tracker.update(&settings, &frame, Timestamp::new(1, 0)));
    /// assert_eq!(tracker.position().x, 1023.0 - 500.0);
    /// assert_eq!(tracker.position().y, 300.0);
    /// ```
    pub fn update(
        &mut self,
        settings: &IrSettings,
        slots: &[SensorSample; IR_SLOTS],
        time: Timestamp,
    ) -> bool {
        let mut candidates = [Point2::origin(); IR_SLOTS];
        let mut count = 0;
        for slot in slots.iter().filter(|s| s.valid && (s.x != 0 || s.y != 0)) {
            candidates[count] = Point2::new(slot.x, slot.y);
            count += 1;
        }

        let predicted = self.reference + self.displacement;
        let Some(selection) = select_pair(&candidates[..count], self.reference, predicted) else {
            trace!("no IR point visible");
            return false;
        };

        let (a, b) = match selection {
            Selection::Single(a) => (a, self.extrapolate_partner(a)),
            Selection::Pair(a, b) => {
                self.displacement = b - a;
                self.reference = a;
                (a, b)
            }
        };

        let midpoint = Point2::new(
            f64::from(a.x + b.x) / 2.0,
            f64::from(a.y + b.y) / 2.0,
        );
        let point = self.smooth(settings, midpoint);

        self.position = Point2::new(
            (f64::from(IR_MAX_X) - point.x).clamp(f64::from(IR_MIN_X), f64::from(IR_MAX_X)),
            point.y.clamp(f64::from(IR_MIN_Y), f64::from(IR_MAX_Y)),
        );
        self.last_valid_event = time;
        true
    }

    /// Synthesize the missing emitter from the recorded displacement
    ///
    /// The visible spot is assumed to be whichever emitter keeps the pair
    /// closer to the reference, and the reference follows it.
    fn extrapolate_partner(&mut self, visible: Point2<i32>) -> Point2<i32> {
        let behind = visible - self.displacement;
        if distance_squared(visible, self.reference) < distance_squared(behind, self.reference) {
            self.reference = visible;
            visible + self.displacement
        } else {
            self.reference = behind;
            behind
        }
    }

    /// Fold `point` into the running average and blend it once stable
    fn smooth(&mut self, settings: &IrSettings, point: Point2<f64>) -> Point2<f64> {
        let count = f64::from(self.average_count);
        self.average = Point2::from((self.average.coords * count + point.coords) / (count + 1.0));
        self.average_count = (self.average_count + 1).min(settings.avg_max_samples);

        let radius = f64::from(settings.avg_radius);
        if nalgebra::distance_squared(&point, &self.average) < radius * radius {
            if self.average_count >= settings.avg_min_samples {
                let weight = f64::from(settings.avg_weight);
                return Point2::from((point.coords + self.average.coords * weight) / (weight + 1.0));
            }
        } else {
            debug!(x = point.x, y = point.y, "IR point jumped, new averaging episode");
            self.average_count = 0;
        }
        point
    }

    /// Whether the last valid frame is recent enough to gate key mapping
    ///
    /// Active while `now < last_valid_event + keymap_expiry_secs`, comparing
    /// seconds first and microseconds second.
    pub fn is_active(&self, settings: &IrSettings, now: Timestamp) -> bool {
        now < self.last_valid_event + settings.keymap_expiry_secs
    }

    /// Mirrored, clamped cursor position in IR units
    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    /// Last confident position of the first emitter, in camera units
    pub fn reference(&self) -> Point2<i32> {
        self.reference
    }

    /// Offset from the first emitter to the second, in camera units
    pub fn displacement(&self) -> Vector2<i32> {
        self.displacement
    }

    /// Running average of the pair midpoint and its sample count
    pub fn average(&self) -> (Point2<f64>, u32) {
        (self.average, self.average_count)
    }

    /// Time of the last frame with at least one visible spot
    pub fn last_valid_event(&self) -> Timestamp {
        self.last_valid_event
    }

    /// Current operating mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch operating mode; the tracked state carries over
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }
}

impl Default for IrTracker {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}
