// Host-side tests for the idle-motion state machine.

use fx_core::{IdleConfig, IdleMotion, IdleState};
use glam::Vec2;

#[test]
fn becomes_idle_at_threshold() {
    let mut idle = IdleMotion::new(&IdleConfig::with_threshold(2000.0), 0.0);
    assert_eq!(idle.state(), IdleState::Interactive);

    let frame = 1000.0 / 60.0;
    assert_eq!(idle.update(2000.0 - frame), IdleState::Interactive);
    assert_eq!(idle.update(2000.0), IdleState::Idle);
    assert!(idle.is_synthetic());
}

#[test]
fn pointer_event_resets_timer() {
    let mut idle = IdleMotion::new(&IdleConfig::with_threshold(2000.0), 0.0);
    idle.on_pointer(1500.0);
    assert_eq!(idle.update(3000.0), IdleState::Interactive);
    assert_eq!(idle.update(3499.0), IdleState::Interactive);
    assert_eq!(idle.update(3500.0), IdleState::Idle);

    idle.on_pointer(3600.0);
    assert_eq!(idle.state(), IdleState::Interactive);
    assert_eq!(idle.last_interaction_ms(), 3600.0);

    // out-of-order timestamps never move the timer backwards
    idle.on_pointer(10.0);
    assert_eq!(idle.last_interaction_ms(), 3600.0);
}

#[test]
fn synthetic_trajectory_is_bounded() {
    let config = IdleConfig::default();
    let idle = IdleMotion::new(&config, 0.0);
    let mut seen_x = (f32::MAX, f32::MIN);
    for i in 0..5000 {
        let p = idle.synthetic_position(i as f64 * 37.0);
        assert!(p.x.abs() <= config.amplitude.x + 1e-6);
        assert!(p.y.abs() <= config.amplitude.y + 1e-6);
        seen_x = (seen_x.0.min(p.x), seen_x.1.max(p.x));
    }
    // it actually moves across the field
    assert!(seen_x.1 - seen_x.0 > config.amplitude.x);
    assert_ne!(config.freq_hz.x, config.freq_hz.y);
}

#[test]
fn resolve_blends_in_from_last_real_position() {
    let config = IdleConfig::with_threshold(100.0);
    let mut idle = IdleMotion::new(&config, 0.0);
    let real = Vec2::new(0.3, -0.2);

    let r = idle.resolve(50.0, real);
    assert!(!r.synthetic);
    assert_eq!(r.ndc, real);

    // first idle frame starts exactly at the last real position
    let r = idle.resolve(100.0, Vec2::ZERO);
    assert!(r.synthetic);
    assert!((r.ndc - real).length() < 1e-6);

    // fully blended into the orbit afterwards
    let later = 100.0 + config.blend_in_ms + 500.0;
    let r = idle.resolve(later, Vec2::ZERO);
    let orbit = idle.synthetic_position(later - 100.0);
    assert!((r.ndc - orbit).length() < 1e-5);

    idle.on_pointer(later + 1.0);
    let r = idle.resolve(later + 2.0, Vec2::new(-0.5, 0.5));
    assert!(!r.synthetic);
    assert_eq!(r.ndc, Vec2::new(-0.5, 0.5));
}
