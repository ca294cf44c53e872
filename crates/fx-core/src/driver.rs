//! Per-frame loop body shared by every front-end.
//!
//! The host calls [`FrameDriver::tick`] once per display refresh. The driver
//! never blocks and never schedules anything itself; a late frame only shows
//! up as a larger `dt` on the next tick.

use crate::constants::MAX_FRAME_DT_MS;
use crate::effect::{AssetRole, AssetStatus, FrameInput};
use crate::error::FxError;
use crate::input::PointerSource;
use crate::layers::{LayerStack, StackFrame};
use crate::viewport::ViewportState;
use image::RgbaImage;

/// Seam between the numeric core and a concrete renderer. GPU resources
/// belong to the backend and are released when it is dropped.
pub trait RenderBackend {
    /// The viewport changed since the last draw (or this is the first one).
    fn resize(&mut self, viewport: &ViewportState);
    fn upload_asset(
        &mut self,
        layer: usize,
        role: AssetRole,
        image: &RgbaImage,
    ) -> Result<(), FxError>;
    fn draw(&mut self, frame: &StackFrame<'_>) -> Result<(), FxError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Stopped,
    DegenerateViewport,
    DrawFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Drawn,
    Skipped(SkipReason),
}

pub struct FrameDriver<B, P> {
    stack: LayerStack,
    pointer: P,
    backend: Option<B>,
    viewport: ViewportState,
    drawn_viewport: Option<ViewportState>,
    last_tick_ms: Option<f64>,
    last_event_ms: Option<f64>,
    /// Every decoded asset, latest per (layer, role). Each backend attached
    /// by `start` receives all of them.
    assets: Vec<(usize, AssetRole, RgbaImage)>,
}

impl<B: RenderBackend, P: PointerSource> FrameDriver<B, P> {
    pub fn new(stack: LayerStack, pointer: P, viewport: ViewportState) -> Self {
        Self {
            stack,
            pointer,
            backend: None,
            viewport,
            drawn_viewport: None,
            last_tick_ms: None,
            last_event_ms: None,
            assets: Vec::new(),
        }
    }

    /// Attach the backend and begin accepting ticks. Restarting replaces the
    /// previous backend.
    pub fn start(&mut self, mut backend: B, now_ms: f64) {
        self.stop();
        let stack = &mut self.stack;
        self.assets.retain(|(layer, role, image)| {
            let Err(e) = backend.upload_asset(*layer, *role, image) else {
                return true;
            };
            log::warn!("[driver] upload of layer {} {} failed: {}", layer, role, e);
            if let Err(e) = stack.set_asset_status(*layer, *role, AssetStatus::Failed) {
                log::warn!("[driver] {}", e);
            }
            false
        });
        self.backend = Some(backend);
        self.drawn_viewport = None;
        self.last_tick_ms = Some(now_ms);
        log::info!("[driver] started with {} layer(s)", self.stack.len());
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.backend.is_some()
    }

    pub fn set_viewport(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
    }

    #[inline]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn asset_loaded(
        &mut self,
        layer: usize,
        role: AssetRole,
        image: RgbaImage,
    ) -> Result<(), FxError> {
        if self.stack.layer(layer).is_none() {
            return Err(FxError::UnknownLayer(layer));
        }
        self.forget_asset(layer, role);
        let (width, height) = image.dimensions();
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.upload_asset(layer, role, &image) {
                self.stack.set_asset_status(layer, role, AssetStatus::Failed)?;
                return Err(e);
            }
        }
        self.assets.push((layer, role, image));
        self.stack
            .set_asset_status(layer, role, AssetStatus::Ready { width, height })
    }

    /// The layer keeps drawing without this asset (transparent or undisplaced).
    pub fn asset_failed(
        &mut self,
        layer: usize,
        role: AssetRole,
        reason: &str,
    ) -> Result<(), FxError> {
        log::warn!("[driver] layer {} {} asset failed: {}", layer, role, reason);
        self.forget_asset(layer, role);
        self.stack.set_asset_status(layer, role, AssetStatus::Failed)
    }

    fn forget_asset(&mut self, layer: usize, role: AssetRole) {
        self.assets.retain(|(l, r, _)| (*l, *r) != (layer, role));
    }

    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        let Some(backend) = self.backend.as_mut() else {
            return TickOutcome::Skipped(SkipReason::Stopped);
        };

        let dt_ms = match self.last_tick_ms {
            Some(prev) if now_ms.is_finite() => (now_ms - prev).clamp(0.0, MAX_FRAME_DT_MS),
            _ => 0.0,
        };
        if now_ms.is_finite() {
            self.last_tick_ms = Some(now_ms);
        }
        if self.viewport.is_degenerate() {
            return TickOutcome::Skipped(SkipReason::DegenerateViewport);
        }

        let pointer = self.pointer.latest();
        let fresh_pointer = match pointer {
            Some(p) if self.last_event_ms != Some(p.timestamp_ms) => {
                self.last_event_ms = Some(p.timestamp_ms);
                true
            }
            _ => false,
        };
        let input = FrameInput {
            now_ms,
            dt_ms: dt_ms as f32,
            pointer,
            fresh_pointer,
            viewport: self.viewport,
        };
        let frame = self.stack.update(&input);

        if self.drawn_viewport != Some(self.viewport) {
            backend.resize(&self.viewport);
            self.drawn_viewport = Some(self.viewport);
        }
        match backend.draw(&frame) {
            Ok(()) => TickOutcome::Drawn,
            Err(e) => {
                log::warn!("[driver] draw skipped: {}", e);
                TickOutcome::Skipped(SkipReason::DrawFailed)
            }
        }
    }
}

impl<B, P> FrameDriver<B, P> {
    /// Detach and drop the backend. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.backend.take().is_some() {
            self.drawn_viewport = None;
            log::info!("[driver] stopped");
        }
    }
}

impl<B, P> Drop for FrameDriver<B, P> {
    fn drop(&mut self) {
        self.stop();
    }
}
