//! Behavioral properties of the individual pipelines
//!
//! Randomized inputs come from a seeded PCG generator so failures reproduce.

use nalgebra::{Point2, Vector2};
use pointer_fusion::{
    AngleFilter, AngleSettings, IrSettings, IrTracker, Mode, Motion, ScrollEngine, ScrollSettings,
    SensorSample, Timestamp, apply_rotation,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

const EPSILON: f64 = 1e-9;

fn frame(points: &[(i32, i32)]) -> [SensorSample; 4] {
    let mut slots = [SensorSample::missing(); 4];
    for (slot, &(x, y)) in slots.iter_mut().zip(points) {
        *slot = SensorSample::new(x, y);
    }
    slots
}

/// Tracker output mapped back into camera coordinates (undo the mirror)
fn camera_position(tracker: &IrTracker) -> Point2<f64> {
    let p = tracker.position();
    Point2::new(1023.0 - p.x, p.y)
}

fn tilt(angle_deg: f64) -> SensorSample {
    let rad = angle_deg.to_radians();
    SensorSample::new((100.0 * rad.sin()).round() as i32, (100.0 * rad.cos()).round() as i32)
}

fn std_dev(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

/// A lone spot is completed along the recorded displacement, on whichever
/// side keeps the pair nearer the reference
#[test]
fn test_single_point_partner_lies_on_displacement() {
    let settings = IrSettings {
        avg_radius: 0,
        ..Default::default()
    };
    let mut rng = Pcg64::seed_from_u64(11);

    for i in 0..500 {
        let mut tracker = IrTracker::new(Mode::Pointer);
        let a = Point2::new(rng.random_range(300..700), rng.random_range(250..500));
        let displacement = Vector2::new(rng.random_range(-120..120), rng.random_range(-40..40));
        let b = a + displacement;
        tracker.update(&settings, &frame(&[(a.x, a.y), (b.x, b.y)]), Timestamp::new(i, 0));

        let visible = Point2::new(
            if rng.random_bool(0.5) { a.x } else { b.x } + rng.random_range(-5..=5),
            if rng.random_bool(0.5) { a.y } else { b.y } + rng.random_range(-5..=5),
        );
        tracker.update(&settings, &frame(&[(visible.x, visible.y)]), Timestamp::new(i, 10_000));

        let behind = visible - displacement;
        let forward_closer =
            (visible - a).cast::<f64>().norm_squared() < (behind - a).cast::<f64>().norm_squared();
        let half = displacement.cast::<f64>() / 2.0;
        let expected = if forward_closer {
            visible.cast::<f64>() + half
        } else {
            visible.cast::<f64>() - half
        };

        let midpoint = camera_position(&tracker);
        assert!(
            (midpoint - expected).norm() < EPSILON,
            "visible {visible:?}, displacement {displacement:?}: got {midpoint:?}, expected {expected:?}"
        );
        // The partner sits exactly one displacement away from the visible spot
        let partner = midpoint * 2.0 - visible.cast::<f64>().coords;
        assert!(((partner - visible.cast::<f64>()).norm() - displacement.cast::<f64>().norm()).abs() < EPSILON);
    }
}

/// Constant emitters plus zero-mean noise: the average settles within the
/// radius and the blended output is steadier than the raw midpoint
#[test]
fn test_noisy_pair_converges_and_jitter_shrinks() {
    let settings = IrSettings::default();
    let mut rng = Pcg64::seed_from_u64(42);
    let mut tracker = IrTracker::new(Mode::Pointer);
    let truth = Point2::new(500.0, 300.0);

    let mut raw = Vec::new();
    let mut smoothed = Vec::new();
    for i in 0..600 {
        let mut jitter = || rng.random_range(-2..=2);
        let a = (400 + jitter(), 300 + jitter());
        let b = (600 + jitter(), 300 + jitter());
        tracker.update(&settings, &frame(&[a, b]), Timestamp::new(i / 100, (i % 100) * 10_000));

        if i as u32 + 1 >= settings.avg_min_samples {
            let (average, count) = tracker.average();
            assert!(count >= settings.avg_min_samples);
            assert!((average - truth).norm() < f64::from(settings.avg_radius));
        }

        raw.push(f64::from(a.0 + b.0) / 2.0);
        smoothed.push(camera_position(&tracker).x);
    }

    let raw_jitter = std_dev(&raw[100..]);
    let smoothed_jitter = std_dev(&smoothed[100..]);
    assert!(
        smoothed_jitter < raw_jitter * 0.75,
        "raw {raw_jitter}, smoothed {smoothed_jitter}"
    );
}

/// A jump beyond the averaging radius starts a new episode seeded by the
/// next sample
#[test]
fn test_jump_starts_new_episode() {
    let settings = IrSettings::default();
    let mut tracker = IrTracker::new(Mode::Pointer);

    for i in 0..20 {
        tracker.update(&settings, &frame(&[(400, 300), (600, 300)]), Timestamp::new(i, 0));
    }
    assert_eq!(tracker.average().1, settings.avg_max_samples);

    tracker.update(&settings, &frame(&[(100, 600), (300, 600)]), Timestamp::new(20, 0));
    assert_eq!(tracker.average().1, 0);

    tracker.update(&settings, &frame(&[(102, 600), (302, 600)]), Timestamp::new(21, 0));
    let (average, count) = tracker.average();
    assert_eq!(count, 1);
    assert_eq!(average, Point2::new(202.0, 600.0));
    assert_eq!(camera_position(&tracker), Point2::new(202.0, 600.0));
}

#[test]
fn test_deadzone_oscillation_never_moves_angle() {
    let settings = AngleSettings::default();
    let mut rng = Pcg64::seed_from_u64(3);
    let mut filter = AngleFilter::new();

    for _ in 0..1000 {
        filter.update(tilt(rng.random_range(-8.0..8.0)));
        filter.tick(&settings);
        assert_eq!(filter.angle(), 0.0);
        assert!(filter.is_in_deadzone());
    }
}

#[test]
fn test_angle_beyond_deadzone_steps_by_max_delta() {
    let settings = AngleSettings::default();
    let mut filter = AngleFilter::new();
    for _ in 0..12 {
        filter.update(tilt(settings.angle_deadzone + 1.0));
    }
    let raw = filter.raw_angle();
    assert!(raw >= settings.angle_deadzone);

    let mut ticks = 0;
    loop {
        let before = filter.angle();
        filter.tick(&settings);
        let expected = before + (raw - before).min(settings.max_angle_delta);
        if filter.is_in_deadzone() {
            assert_eq!(filter.angle(), raw);
            break;
        }
        assert!((filter.angle() - expected).abs() < EPSILON, "tick {ticks}");
        ticks += 1;
        assert!(ticks < 1000, "angle never settled");
    }
    assert!(ticks >= (raw / settings.max_angle_delta) as usize);
}

#[test]
fn test_zero_rotation_is_identity() {
    let mut rng = Pcg64::seed_from_u64(5);
    for _ in 0..1000 {
        let p = Point2::new(rng.random_range(0.0..=1023.0), rng.random_range(0.0..=767.0));
        assert!((apply_rotation(p, 0.0) - p).norm() < EPSILON);
    }
}

#[test]
fn test_rotation_round_trip() {
    let mut rng = Pcg64::seed_from_u64(9);
    for angle in [10.0, 90.0, 179.0, 270.0] {
        for _ in 0..250 {
            let p = Point2::new(rng.random_range(0.0..=1023.0), rng.random_range(0.0..=767.0));
            let back = apply_rotation(apply_rotation(p, angle), -angle);
            assert!((back - p).norm() < 1e-6, "{angle}: {p:?} -> {back:?}");
        }
    }
}

#[test]
fn test_game_mode_jump_capped_at_eight() {
    let settings = ScrollSettings::default();
    let mut engine = ScrollEngine::new(Point2::new(300.0, 300.0));
    let output = engine.tick(&settings, Mode::Game, Point2::new(400.0, 300.0));
    assert_eq!(output.pointer, Some(Motion::Relative { dx: 8, dy: 0 }));
}

#[test]
fn test_pointer_mode_step_keeps_direction() {
    let settings = ScrollSettings::default();
    let start = Point2::new(300.0, 300.0);
    let mut engine = ScrollEngine::new(start);
    engine.tick(&settings, Mode::Pointer, Point2::new(303.0, 304.0));

    let step = engine.smoothed() - start;
    assert!(step.norm() <= 3.0 + EPSILON);
    assert!((step.normalize() - Vector2::new(0.6, 0.8)).norm() < EPSILON);
}

#[test]
fn test_slow_scroll_accumulates_whole_units() {
    let settings = ScrollSettings::default();
    let here = Point2::new(300.0, 300.0);
    let mut engine = ScrollEngine::new(here);
    engine.set_speed(Vector2::new(0.3, 0.0));

    let emitted: Vec<_> = (0..4).map(|_| engine.tick(&settings, Mode::Game, here).scroll).collect();
    assert_eq!(emitted, vec![None, None, None, Some(Motion::Relative { dx: 1, dy: 0 })]);
}

#[test]
fn test_ir_liveness_window() {
    let settings = IrSettings {
        keymap_expiry_secs: 2,
        ..Default::default()
    };
    let mut tracker = IrTracker::new(Mode::Pointer);
    let t = Timestamp::from_secs_f64(100.0);
    tracker.update(&settings, &frame(&[(400, 300), (600, 300)]), t);

    assert!(tracker.is_active(&settings, Timestamp::from_secs_f64(101.9)));
    assert!(!tracker.is_active(&settings, Timestamp::from_secs_f64(102.1)));
}
