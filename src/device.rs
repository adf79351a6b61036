//! Per-device pipeline state and event dispatch

use nalgebra::Point2;
use tracing::{debug, trace};

use crate::accelerometer::AngleFilter;
use crate::gyro::GyroIntegrator;
use crate::ir::{IR_SLOTS, IrTracker};
use crate::math::{angle_difference, normalize_degrees};
use crate::rotation::apply_rotation;
use crate::scroll::{ScrollEngine, TickOutput};
use crate::types::{
    AngleSource, DeviceSettings, IR_MAX_X, IR_MAX_Y, IR_MIN_X, IR_MIN_Y, Mode, MotionSource,
    SensorSample, Timestamp,
};

/// A raw sensor event delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceEvent {
    /// One IR camera frame with all four spot slots
    Ir {
        time: Timestamp,
        slots: [SensorSample; IR_SLOTS],
    },
    /// One accelerometer tilt sample
    Accelerometer { time: Timestamp, sample: SensorSample },
    /// One motion-plus roll rate sample, in raw units
    MotionPlus { time: Timestamp, rate: f64 },
}

impl DeviceEvent {
    /// Time the host stamped on the event
    pub fn time(&self) -> Timestamp {
        match *self {
            DeviceEvent::Ir { time, .. }
            | DeviceEvent::Accelerometer { time, .. }
            | DeviceEvent::MotionPlus { time, .. } => time,
        }
    }
}

/// All pipeline state for one connected remote
///
/// Created when the remote attaches and dropped when it detaches. The host
/// calls [`Device::handle_event`] for every raw event and [`Device::tick`]
/// once per timer period, always with the same settings.
///
/// # Example
/// ```
/// use pointer_fusion::{Device, DeviceEvent, DeviceSettings, SensorSample, Timestamp};
///
/// let settings = DeviceSettings::default();
/// let mut device = Device::new(&settings);
///
/// device.handle_event(&settings, &DeviceEvent::Ir {
///     time: Timestamp::new(1, 0),
///     slots: [
///         SensorSample::new(400, 300),
///         SensorSample::new(600, 300),
///         SensorSample::missing(),
///         SensorSample::missing(),
///     ],
/// });
///
/// let output = device.tick(&settings);
/// assert!(output.pointer.is_some());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Device {
    ir: IrTracker,
    angle_filter: AngleFilter,
    gyro: GyroIntegrator,
    scroll: ScrollEngine,
    /// Tracked point after tilt cancellation
    position: Point2<f64>,
    /// Latest event time seen
    now: Timestamp,
}

impl Device {
    pub fn new(settings: &DeviceSettings) -> Self {
        let scroll = ScrollEngine::default();
        debug!(mode = ?settings.mode, source = ?settings.angle_source, "device attached");
        Self {
            ir: IrTracker::new(settings.mode),
            angle_filter: AngleFilter::new(),
            gyro: GyroIntegrator::new(),
            position: scroll.smoothed(),
            scroll,
            now: Timestamp::default(),
        }
    }

    /// Feed one raw event into its pipeline
    ///
    /// Returns whether the event produced usable data; only an IR frame
    /// without any visible spot returns `false`.
    pub fn handle_event(&mut self, settings: &DeviceSettings, event: &DeviceEvent) -> bool {
        self.now = self.now.max(event.time());

        match *event {
            DeviceEvent::Ir { time, ref slots } => self.handle_ir(settings, slots, time),
            DeviceEvent::Accelerometer { sample, .. } => {
                self.angle_filter.update(sample);
                true
            }
            DeviceEvent::MotionPlus { time, rate } => {
                self.gyro.update_at(&settings.gyro, rate, time);
                true
            }
        }
    }

    fn handle_ir(
        &mut self,
        settings: &DeviceSettings,
        slots: &[SensorSample; IR_SLOTS],
        time: Timestamp,
    ) -> bool {
        if !self.ir.update(&settings.ir, slots, time) {
            return false;
        }

        let tracked = self.ir.position();
        if !settings.ir.remove_rotation {
            // Edge scroll speed is only refreshed on the corrected path
            self.position = tracked;
            return true;
        }

        let rotated = apply_rotation(tracked, self.rotation_angle(settings));
        self.position = Point2::new(
            rotated.x.clamp(f64::from(IR_MIN_X), f64::from(IR_MAX_X)),
            rotated.y.clamp(f64::from(IR_MIN_Y), f64::from(IR_MAX_Y)),
        );
        trace!(x = self.position.x, y = self.position.y, "IR position");

        self.scroll.compute_scroll_speed(&settings.scroll, self.ir.mode());
        true
    }

    /// Advance the timer-driven filters and collect sink motion
    ///
    /// Pointer and edge-scroll motion only come out while IR is the
    /// configured [`MotionSource`]; the angle filter advances regardless.
    pub fn tick(&mut self, settings: &DeviceSettings) -> TickOutput {
        self.angle_filter.tick(&settings.angle);
        if settings.motion_source != MotionSource::Ir {
            return TickOutput::default();
        }
        self.scroll.tick(&settings.scroll, self.ir.mode(), self.position)
    }

    /// Rotation angle in degrees, resolved from the configured source
    pub fn rotation_angle(&self, settings: &DeviceSettings) -> f64 {
        let accelerometer = self.angle_filter.angle();
        let gyro_fresh = self.gyro.is_fresh(&settings.gyro, self.now);

        match settings.angle_source {
            AngleSource::Accelerometer => accelerometer,
            AngleSource::MotionPlus if gyro_fresh => normalize_degrees(self.gyro.angle()),
            AngleSource::MotionPlus => accelerometer,
            AngleSource::Blend { gyro_weight } if gyro_fresh => normalize_degrees(
                accelerometer + gyro_weight * angle_difference(accelerometer, self.gyro.angle()),
            ),
            AngleSource::Blend { .. } => accelerometer,
        }
    }

    /// Whether IR data is recent enough to gate key mapping
    pub fn is_ir_active(&self, settings: &DeviceSettings, now: Timestamp) -> bool {
        self.ir.is_active(&settings.ir, now)
    }

    /// Current operating mode
    pub fn mode(&self) -> Mode {
        self.ir.mode()
    }

    /// Switch operating mode; pending edge scroll is dropped when leaving game mode
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != Mode::Game {
            self.scroll.stop_scrolling();
        }
        self.ir.set_mode(mode);
    }

    /// Tracked point after tilt cancellation, in IR units
    pub fn position(&self) -> Point2<f64> {
        self.position
    }

    /// IR tracker state
    pub fn ir(&self) -> &IrTracker {
        &self.ir
    }

    /// Accelerometer angle filter state
    pub fn angle_filter(&self) -> &AngleFilter {
        &self.angle_filter
    }

    /// Motion-plus integrator state
    pub fn gyro(&self) -> &GyroIntegrator {
        &self.gyro
    }

    /// Smoothed cursor and edge-scroll state
    pub fn scroll(&self) -> &ScrollEngine {
        &self.scroll
    }
}
