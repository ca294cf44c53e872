// Host-side tests for the frame driver, using a recording backend.

use fx_core::{
    AssetRole, DisplacementConfig, EffectConfig, FrameDriver, FxError, LayerConfig,
    LayerFrameKind, LayerStack, PointerSignal, RenderBackend, SharedPointer, SkipReason,
    StackFrame, TickOutcome, TopoConfig, TrailConfig, ViewportState,
};
use glam::Vec2;
use image::{Rgba, RgbaImage};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Calls {
    resizes: Vec<ViewportState>,
    draws: usize,
    dts: Vec<f32>,
    uploads: Vec<(usize, AssetRole)>,
    trail_peak: f32,
    source_ready: Vec<bool>,
    dropped: bool,
}

struct Recorder {
    calls: Rc<RefCell<Calls>>,
    fail_draw: bool,
    fail_upload: bool,
}

impl Recorder {
    fn new() -> (Self, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        (
            Self {
                calls: calls.clone(),
                fail_draw: false,
                fail_upload: false,
            },
            calls,
        )
    }
}

impl RenderBackend for Recorder {
    fn resize(&mut self, viewport: &ViewportState) {
        self.calls.borrow_mut().resizes.push(*viewport);
    }

    fn upload_asset(
        &mut self,
        layer: usize,
        role: AssetRole,
        _image: &RgbaImage,
    ) -> Result<(), FxError> {
        if self.fail_upload {
            return Err(FxError::Render("texture allocation failed".into()));
        }
        self.calls.borrow_mut().uploads.push((layer, role));
        Ok(())
    }

    fn draw(&mut self, frame: &StackFrame<'_>) -> Result<(), FxError> {
        if self.fail_draw {
            return Err(FxError::Render("surface lost".into()));
        }
        let mut calls = self.calls.borrow_mut();
        calls.draws += 1;
        calls.dts.push(frame.dt_ms);
        for layer in &frame.layers {
            match layer.kind {
                LayerFrameKind::Trail(t) => {
                    let peak = t.field.iter().copied().fold(0.0, f32::max);
                    calls.trail_peak = calls.trail_peak.max(peak);
                }
                LayerFrameKind::Parallax(p) => calls.source_ready.push(p.source_ready),
                LayerFrameKind::Topo(_) => {}
            }
        }
        Ok(())
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.calls.borrow_mut().dropped = true;
    }
}

fn viewport() -> ViewportState {
    ViewportState::new(800.0, 600.0, 2.0)
}

fn topo_stack() -> LayerStack {
    LayerStack::from_configs(
        vec![LayerConfig::new("bg", EffectConfig::Topo(TopoConfig::default()))],
        0.0,
    )
    .unwrap()
}

#[test]
fn stopped_driver_skips() {
    let mut driver: FrameDriver<Recorder, SharedPointer> =
        FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    assert!(!driver.is_running());
    assert_eq!(driver.tick(16.0), TickOutcome::Skipped(SkipReason::Stopped));
}

#[test]
fn draws_once_per_tick_and_resizes_on_change() {
    let (backend, calls) = Recorder::new();
    let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    driver.start(backend, 0.0);
    assert!(driver.is_running());

    assert_eq!(driver.tick(16.0), TickOutcome::Drawn);
    assert_eq!(driver.tick(32.0), TickOutcome::Drawn);
    assert_eq!(calls.borrow().draws, 2);
    assert_eq!(calls.borrow().resizes, vec![viewport()]);

    let bigger = ViewportState::new(1024.0, 768.0, 2.0);
    driver.set_viewport(bigger);
    driver.set_viewport(bigger);
    assert_eq!(driver.tick(48.0), TickOutcome::Drawn);
    assert_eq!(calls.borrow().resizes, vec![viewport(), bigger]);
}

#[test]
fn frame_time_is_clamped() {
    let (backend, calls) = Recorder::new();
    let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    driver.start(backend, 1000.0);
    driver.tick(1016.0);
    driver.tick(60_000.0); // tab was hidden
    driver.tick(59_000.0); // clock went backwards
    let dts = calls.borrow().dts.clone();
    assert_eq!(dts, vec![16.0, 1000.0, 0.0]);
}

#[test]
fn degenerate_viewport_skips_then_resumes() {
    let (backend, calls) = Recorder::new();
    let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    driver.start(backend, 0.0);
    driver.set_viewport(ViewportState::new(0.0, 600.0, 2.0));
    assert_eq!(
        driver.tick(16.0),
        TickOutcome::Skipped(SkipReason::DegenerateViewport)
    );
    assert_eq!(calls.borrow().draws, 0);

    driver.set_viewport(viewport());
    assert_eq!(driver.tick(32.0), TickOutcome::Drawn);
}

#[test]
fn draw_failure_skips_one_frame() {
    let (mut backend, calls) = Recorder::new();
    backend.fail_draw = true;
    let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    driver.start(backend, 0.0);
    assert_eq!(driver.tick(16.0), TickOutcome::Skipped(SkipReason::DrawFailed));

    driver.backend_mut().unwrap().fail_draw = false;
    assert_eq!(driver.tick(32.0), TickOutcome::Drawn);
    assert_eq!(calls.borrow().draws, 1);
}

#[test]
fn backend_released_on_stop_and_drop() {
    let (backend, calls) = Recorder::new();
    let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    driver.start(backend, 0.0);
    driver.stop();
    assert!(calls.borrow().dropped);
    assert!(!driver.is_running());
    assert_eq!(driver.tick(16.0), TickOutcome::Skipped(SkipReason::Stopped));
    driver.stop();

    let (backend, calls) = Recorder::new();
    {
        let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
        driver.start(backend, 0.0);
        driver.tick(16.0);
        assert!(!calls.borrow().dropped);
    }
    assert!(calls.borrow().dropped);

    // restarting replaces the previous backend
    let (first, first_calls) = Recorder::new();
    let (second, second_calls) = Recorder::new();
    let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    driver.start(first, 0.0);
    driver.start(second, 10.0);
    assert!(first_calls.borrow().dropped);
    assert!(!second_calls.borrow().dropped);
}

#[test]
fn assets_decoded_before_start_are_uploaded_on_start() {
    let stack = LayerStack::from_configs(
        vec![LayerConfig::new(
            "hero",
            EffectConfig::Parallax(DisplacementConfig {
                source_asset: "hero.jpg".into(),
                depth_asset: "hero-depth.png".into(),
                ..DisplacementConfig::default()
            }),
        )],
        0.0,
    )
    .unwrap();
    let mut driver = FrameDriver::new(stack, SharedPointer::new(), viewport());
    let image = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
    driver.asset_loaded(0, AssetRole::Source, image.clone()).unwrap();
    driver.asset_failed(0, AssetRole::Depth, "404").unwrap();
    assert!(driver.asset_loaded(7, AssetRole::Source, image.clone()).is_err());

    let (backend, calls) = Recorder::new();
    driver.start(backend, 0.0);
    assert_eq!(calls.borrow().uploads[0], (0, AssetRole::Source));

    driver.asset_loaded(0, AssetRole::Secondary, image).unwrap();
    assert_eq!(
        calls.borrow().uploads,
        vec![(0, AssetRole::Source), (0, AssetRole::Secondary)]
    );
    assert_eq!(driver.tick(16.0), TickOutcome::Drawn);
}

#[test]
fn failed_upload_is_reported() {
    let (mut backend, _calls) = Recorder::new();
    backend.fail_upload = true;
    let mut driver = FrameDriver::new(topo_stack(), SharedPointer::new(), viewport());
    driver.start(backend, 0.0);
    let image = RgbaImage::new(1, 1);
    assert!(driver.asset_loaded(0, AssetRole::Source, image).is_err());
}

#[test]
fn pointer_moves_reach_the_trail() {
    let pointer = SharedPointer::new();
    let cfg = TrailConfig {
        idle: None,
        ..TrailConfig::default()
    };
    let stack = LayerStack::from_configs(
        vec![LayerConfig::new("trail", EffectConfig::Trail(cfg))],
        0.0,
    )
    .unwrap();
    let (backend, calls) = Recorder::new();
    let mut driver = FrameDriver::new(stack, pointer.clone(), viewport());
    driver.start(backend, 0.0);

    driver.tick(16.0);
    assert_eq!(calls.borrow().trail_peak, 0.0);

    let vp = driver.viewport();
    pointer.publish(PointerSignal {
        ndc: vp.client_to_ndc(400.0, 300.0).unwrap(),
        uv: vp.client_to_uv(400.0, 300.0).unwrap(),
        timestamp_ms: 20.0,
    });
    driver.tick(32.0);
    assert!(calls.borrow().trail_peak > 0.0);
    assert_eq!(pointer_uv_of(&pointer), Some(Vec2::splat(0.5)));
}

fn pointer_uv_of(pointer: &SharedPointer) -> Option<Vec2> {
    use fx_core::PointerSource;
    pointer.latest().map(|p| p.uv)
}

fn hero_stack() -> LayerStack {
    LayerStack::from_configs(
        vec![LayerConfig::new(
            "hero",
            EffectConfig::Parallax(DisplacementConfig {
                source_asset: "hero.jpg".into(),
                depth_asset: "hero-depth.png".into(),
                ..DisplacementConfig::default()
            }),
        )],
        0.0,
    )
    .unwrap()
}

#[test]
fn restarted_backend_receives_loaded_assets() {
    let mut driver = FrameDriver::new(hero_stack(), SharedPointer::new(), viewport());
    let (first, first_calls) = Recorder::new();
    driver.start(first, 0.0);
    let image = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
    driver.asset_loaded(0, AssetRole::Source, image.clone()).unwrap();
    driver.asset_loaded(0, AssetRole::Depth, image).unwrap();
    assert_eq!(first_calls.borrow().uploads.len(), 2);

    driver.stop();
    let (second, second_calls) = Recorder::new();
    driver.start(second, 100.0);
    assert_eq!(
        second_calls.borrow().uploads,
        vec![(0, AssetRole::Source), (0, AssetRole::Depth)]
    );
    assert_eq!(driver.tick(116.0), TickOutcome::Drawn);
    assert_eq!(second_calls.borrow().source_ready, vec![true]);
}

#[test]
fn reloaded_or_failed_assets_are_not_uploaded_twice() {
    let mut driver = FrameDriver::new(hero_stack(), SharedPointer::new(), viewport());
    let image = RgbaImage::new(2, 2);
    driver.asset_loaded(0, AssetRole::Source, image.clone()).unwrap();
    driver.asset_loaded(0, AssetRole::Source, image.clone()).unwrap();
    driver.asset_loaded(0, AssetRole::Depth, image).unwrap();
    driver.asset_failed(0, AssetRole::Depth, "decode error").unwrap();

    let (backend, calls) = Recorder::new();
    driver.start(backend, 0.0);
    assert_eq!(calls.borrow().uploads, vec![(0, AssetRole::Source)]);
}

#[test]
fn failed_upload_on_start_marks_the_asset_failed() {
    let mut driver = FrameDriver::new(hero_stack(), SharedPointer::new(), viewport());
    driver
        .asset_loaded(0, AssetRole::Source, RgbaImage::new(2, 2))
        .unwrap();
    let (mut failing, _) = Recorder::new();
    failing.fail_upload = true;
    driver.start(failing, 0.0);

    // nothing left to send to the next backend
    let (backend, calls) = Recorder::new();
    driver.start(backend, 10.0);
    assert!(calls.borrow().uploads.is_empty());
    driver.tick(26.0);
    assert_eq!(calls.borrow().source_ready, vec![false]);
}
