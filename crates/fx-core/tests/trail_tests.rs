// Host-side tests for the decaying trail field.

use fx_core::trail::goo_alpha;
use fx_core::{Easing, GooeyFilter, GooeyConfig, RiseCurve, TrailBuffer, TrailConfig, TrailField};
use glam::{UVec2, Vec2};

fn config() -> TrailConfig {
    TrailConfig {
        idle: None,
        ..TrailConfig::default()
    }
}

fn max_value(buffer: &TrailBuffer) -> f32 {
    buffer.field().values().iter().copied().fold(0.0, f32::max)
}

#[test]
fn decay_is_never_negative_and_reaches_zero() {
    for dt in [0.5_f32, 8.0, 16.7, 33.3, 120.0] {
        let mut buffer = TrailBuffer::new(&config(), 0.0);
        buffer.record_pointer(Vec2::splat(0.5), 0.0);
        let mut elapsed = 0.0;
        let mut peak = 0.0_f32;
        while elapsed < 400.0 {
            buffer.decay(dt);
            elapsed += dt;
            assert!(buffer.field().values().iter().all(|v| *v >= 0.0 && *v <= 1.0));
            peak = peak.max(max_value(&buffer));
        }
        assert!(peak > 0.0, "dt {dt} never lit the trail");
        assert_eq!(max_value(&buffer), 0.0, "dt {dt} left a residue");
    }
}

#[test]
fn cell_is_exactly_zero_at_max_age() {
    let mut buffer = TrailBuffer::new(&config(), 0.0);
    buffer.record_visit(UVec2::new(3, 3), 0.0);
    buffer.decay(16.0);
    assert!(buffer.field().value(3, 3) > 0.0);
    // fresh decay keeps the visit age, the next 250 ms age it out
    buffer.decay(250.0);
    assert_eq!(buffer.field().value(3, 3), 0.0);
}

#[test]
fn zero_or_invalid_dt_leaves_field_unchanged() {
    let mut buffer = TrailBuffer::new(&config(), 0.0);
    buffer.record_pointer(Vec2::new(0.3, 0.6), 0.0);
    buffer.decay(16.0);
    let before = buffer.field().values().to_vec();
    buffer.decay(0.0);
    buffer.decay(-5.0);
    buffer.decay(f32::NAN);
    buffer.decay(f32::INFINITY);
    assert_eq!(buffer.field().values(), &before[..]);
}

#[test]
fn revisit_refreshes_without_lowering() {
    let mut buffer = TrailBuffer::new(&config(), 0.0);
    let cell = UVec2::new(10, 10);
    buffer.record_visit(cell, 0.0);
    for _ in 0..4 {
        buffer.decay(16.0);
    }
    let lit = buffer.field().value(10, 10);
    assert!(lit > 0.5);

    buffer.record_visit_weighted(cell, 64.0, 0.1);
    buffer.decay(16.0);
    assert!(buffer.field().value(10, 10) >= lit - 1e-6);
}

#[test]
fn out_of_range_visits_are_ignored() {
    let mut buffer = TrailBuffer::new(&config(), 0.0);
    buffer.record_visit(UVec2::new(40, 0), 0.0);
    buffer.record_visit(UVec2::new(0, 1000), 0.0);
    buffer.record_visit_weighted(UVec2::new(1, 1), 0.0, 0.0);
    buffer.decay(16.0);
    assert_eq!(max_value(&buffer), 0.0);
}

#[test]
fn fast_stroke_is_filled_between_samples() {
    let cfg = TrailConfig {
        visit_radius: 0.02,
        ..config()
    };
    let mut buffer = TrailBuffer::new(&cfg, 0.0);
    buffer.record_pointer(Vec2::new(0.05, 0.5), 0.0);
    buffer.record_pointer(Vec2::new(0.95, 0.5), 0.0);
    buffer.decay(16.0);
    for x in 2..=38 {
        assert!(buffer.field().value(x, 20) > 0.0, "gap at cell {x}");
    }

    // a lifted pointer starts a new stroke
    let mut buffer = TrailBuffer::new(&cfg, 0.0);
    buffer.record_pointer(Vec2::new(0.05, 0.5), 0.0);
    buffer.lift();
    buffer.record_pointer(Vec2::new(0.95, 0.5), 0.0);
    buffer.decay(16.0);
    assert_eq!(buffer.field().value(20, 20), 0.0);
}

#[test]
fn resting_pointer_fades() {
    let mut buffer = TrailBuffer::new(&config(), 0.0);
    let mut now = 0.0;
    for _ in 0..40 {
        buffer.record_pointer(Vec2::splat(0.5), 0.0);
        buffer.decay(16.0);
        now += 16.0;
    }
    assert!(now > 250.0);
    assert_eq!(max_value(&buffer), 0.0);
}

#[test]
fn linear_rise_is_rate_limited() {
    let cfg = TrailConfig {
        rise: RiseCurve::Linear { rate_per_sec: 2.0 },
        max_age_ms: 10_000.0,
        ..config()
    };
    let mut buffer = TrailBuffer::new(&cfg, 0.0);
    buffer.record_visit(UVec2::new(0, 0), 0.0);
    buffer.decay(100.0);
    assert!((buffer.field().value(0, 0) - 0.2).abs() < 1e-5);
}

#[test]
fn easing_curves_fix_endpoints() {
    for e in [Easing::Linear, Easing::QuadOut, Easing::CircOut] {
        assert_eq!(e.apply(0.0), 0.0);
        assert!((e.apply(1.0) - 1.0).abs() < 1e-6);
        assert!(e.apply(0.5) >= 0.5);
        assert_eq!(e.apply(-3.0), 0.0);
    }
    assert_eq!("circ-out".parse::<Easing>().unwrap(), Easing::CircOut);
    assert!("bounce".parse::<Easing>().is_err());
}

#[test]
fn goo_threshold_is_steep() {
    assert!((goo_alpha(0.5) - 0.5).abs() < 1e-5);
    assert!(goo_alpha(9.0 / 19.0) < 1e-5);
    assert_eq!(goo_alpha(0.1), 0.0);
    assert!(goo_alpha(10.0 / 19.0) > 0.9999);
    assert_eq!(goo_alpha(0.9), 1.0);
}

#[test]
fn gooey_filter_merges_and_drops() {
    let mut filter = GooeyFilter::new(&GooeyConfig { sigma_cells: 1.0 });
    let mut out = Vec::new();
    let empty = TrailField::new(8);
    filter.apply(&empty, &mut out);
    assert_eq!(out.len(), 64);
    assert!(out.iter().all(|v| *v == 0.0));

    // the stamped blob keeps a solid core, far cells stay empty
    let cfg = TrailConfig {
        resolution: 16,
        visit_radius: 0.2,
        rise: RiseCurve::Linear {
            rate_per_sec: 1000.0,
        },
        gooey: Some(GooeyConfig { sigma_cells: 0.6 }),
        ..config()
    };
    let mut buffer = TrailBuffer::new(&cfg, 0.0);
    buffer.record_pointer(Vec2::splat(0.5), 0.0);
    buffer.decay(16.0);
    let values = buffer.frame_values();
    assert_eq!(values.len(), 256);
    assert_eq!(values[8 * 16 + 8], 1.0);
    assert_eq!(values[0], 0.0);
}

#[test]
fn r8_payload_is_quantised() {
    let mut out = [0u8; 4];
    fx_core::write_r8(&[0.0, 0.5, 1.0, 7.0], &mut out);
    assert_eq!(out, [0, 128, 255, 255]);
}

#[test]
fn oversized_resolution_is_clamped() {
    let field = TrailField::new(70_000);
    assert_eq!(field.resolution(), fx_core::constants::TRAIL_MAX_RESOLUTION);
    assert_eq!(field.values().len(), 512 * 512);

    let buffer = TrailBuffer::new(
        &TrailConfig {
            resolution: u32::MAX,
            ..config()
        },
        0.0,
    );
    assert_eq!(buffer.resolution(), fx_core::constants::TRAIL_MAX_RESOLUTION);
    assert_eq!(TrailField::new(0).resolution(), 1);
}
