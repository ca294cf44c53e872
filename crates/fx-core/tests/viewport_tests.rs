// Host-side tests for coordinate mapping.

use fx_core::{ndc_to_uv, uv_to_ndc, ViewportState};
use glam::Vec2;

fn approx(a: Vec2, b: Vec2) -> bool {
    (a - b).abs().max_element() < 1e-5
}

#[test]
fn centre_pointer_maps_to_cover_centre() {
    let vp = ViewportState::new(800.0, 600.0, 1.0).with_source(400.0, 500.0);
    let uv = vp.client_to_uv(400.0, 300.0).unwrap();
    assert!(approx(vp.cover_uv(uv), Vec2::splat(0.5)));

    // Any aspect mismatch keeps the centre fixed
    for (sw, sh) in [(1.0, 1.0), (1920.0, 1080.0), (300.0, 2000.0)] {
        let vp = ViewportState::new(1280.0, 720.0, 2.0).with_source(sw, sh);
        assert!(approx(vp.cover_uv(Vec2::splat(0.5)), Vec2::splat(0.5)));
    }
}

#[test]
fn cover_crops_the_overflowing_axis() {
    // 400x500 scaled by 2 to cover 800x600: full width, 60% of the height
    let vp = ViewportState::new(800.0, 600.0, 1.0).with_source(400.0, 500.0);
    assert!(approx(vp.cover_scale(), Vec2::new(1.0, 0.6)));
    assert!(approx(vp.cover_uv(Vec2::ZERO), Vec2::new(0.0, 0.2)));
    assert!(approx(vp.cover_uv(Vec2::ONE), Vec2::new(1.0, 0.8)));
}

#[test]
fn cover_is_identity_without_source() {
    let vp = ViewportState::new(800.0, 600.0, 1.0);
    assert_eq!(vp.cover_scale(), Vec2::ONE);
    assert!(approx(vp.cover_uv(Vec2::new(0.25, 0.75)), Vec2::new(0.25, 0.75)));
}

#[test]
fn ndc_is_centred_with_y_up() {
    let vp = ViewportState::new(800.0, 600.0, 1.0);
    assert!(approx(vp.client_to_ndc(400.0, 300.0).unwrap(), Vec2::ZERO));
    assert!(approx(vp.client_to_ndc(0.0, 0.0).unwrap(), Vec2::new(-1.0, 1.0)));
    assert!(approx(vp.client_to_ndc(800.0, 600.0).unwrap(), Vec2::new(1.0, -1.0)));

    let uv = Vec2::new(0.2, 0.7);
    assert!(approx(ndc_to_uv(uv_to_ndc(uv)), uv));
}

#[test]
fn degenerate_viewport_is_total() {
    for vp in [
        ViewportState::new(0.0, 600.0, 1.0),
        ViewportState::new(800.0, 0.0, 1.0),
        ViewportState::new(f32::NAN, 600.0, 1.0),
        ViewportState::default(),
    ] {
        assert!(vp.is_degenerate());
        assert_eq!(vp.client_to_uv(10.0, 10.0), None);
        assert_eq!(vp.client_to_ndc(10.0, 10.0), None);
        assert_eq!(vp.aspect(), 1.0);
        assert_eq!(vp.cover_scale(), Vec2::ONE);
        let (w, h) = vp.backing_size();
        assert!(w >= 1 && h >= 1);
    }
}

#[test]
fn backing_size_applies_device_pixel_ratio() {
    let vp = ViewportState::new(800.0, 600.0, 2.0);
    assert_eq!(vp.backing_size(), (1600, 1200));
    let vp = ViewportState::new(333.0, 100.0, 1.5);
    assert_eq!(vp.backing_size(), (500, 150));
    assert!(approx(vp.physical_to_uv(250.0, 75.0).unwrap(), Vec2::splat(0.5)));
}

#[test]
fn region_pointer_is_relative_to_the_region() {
    // 1280x600 band starting 200 px down the page
    let vp = ViewportState::new(1280.0, 600.0, 1.0);
    let origin = Vec2::new(0.0, 200.0);

    let (ndc, uv) = vp.region_pointer(origin, Vec2::new(640.0, 500.0)).unwrap();
    assert!(approx(uv, Vec2::splat(0.5)));
    assert!(approx(ndc, Vec2::ZERO));

    let (ndc, uv) = vp.region_pointer(origin, Vec2::new(0.0, 200.0)).unwrap();
    assert!(approx(uv, Vec2::ZERO));
    assert!(approx(ndc, Vec2::new(-1.0, 1.0)));

    // above and below the band
    assert!(vp.region_pointer(origin, Vec2::new(640.0, 100.0)).is_none());
    assert!(vp.region_pointer(origin, Vec2::new(640.0, 801.0)).is_none());
    assert!(ViewportState::default()
        .region_pointer(Vec2::ZERO, Vec2::ZERO)
        .is_none());
}

#[test]
fn band_viewport_covers_without_stretching() {
    // a square asset in a 1280x600 band shows its full width and 600/1280 of
    // its height; the backing store matches the band, not the window
    let vp = ViewportState::new(1280.0, 600.0, 2.0).with_source(1000.0, 1000.0);
    assert!(approx(vp.cover_scale(), Vec2::new(1.0, 600.0 / 1280.0)));
    assert_eq!(vp.backing_size(), (2560, 1200));
}
