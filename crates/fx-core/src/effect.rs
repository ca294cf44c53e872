//! Per-effect state and the immutable per-frame parameters each effect hands
//! to the renderer.

use crate::config::{DisplacementConfig, PointerOrigin, TopoConfig, TrailConfig};
use crate::displacement::{BlendMode, EdgePolicy};
use crate::idle::{IdleMotion, ResolvedPointer};
use crate::input::PointerSignal;
use crate::trail::TrailBuffer;
use crate::viewport::{ndc_to_uv, ViewportState};
use glam::Vec2;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetRole {
    Source,
    Depth,
    Secondary,
    Overlay,
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetRole::Source => "source",
            AssetRole::Depth => "depth",
            AssetRole::Secondary => "secondary",
            AssetRole::Overlay => "overlay",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssetStatus {
    #[default]
    Pending,
    Ready {
        width: u32,
        height: u32,
    },
    Failed,
}

impl AssetStatus {
    #[inline]
    pub fn is_ready(self) -> bool {
        matches!(self, AssetStatus::Ready { .. })
    }

    fn size(self) -> Option<(f32, f32)> {
        match self {
            AssetStatus::Ready { width, height } => Some((width as f32, height as f32)),
            _ => None,
        }
    }
}

/// What every effect sees at the start of a tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub now_ms: f64,
    pub dt_ms: f32,
    pub pointer: Option<PointerSignal>,
    /// `pointer` is a new real event since the previous tick.
    pub fresh_pointer: bool,
    pub viewport: ViewportState,
}

impl FrameInput {
    fn real_ndc(&self) -> Option<Vec2> {
        self.pointer.map(|p| p.ndc)
    }
}

fn resolve_pointer(idle: &mut Option<IdleMotion>, input: &FrameInput) -> Option<ResolvedPointer> {
    if let (Some(idle), true, Some(p)) = (idle.as_mut(), input.fresh_pointer, input.pointer) {
        idle.on_pointer(p.timestamp_ms);
    }
    match idle.as_mut() {
        Some(idle) => {
            let resolved = idle.resolve(input.now_ms, input.real_ndc().unwrap_or(Vec2::ZERO));
            (resolved.synthetic || input.pointer.is_some()).then_some(resolved)
        }
        None => input.real_ndc().map(|ndc| ResolvedPointer {
            ndc,
            synthetic: false,
        }),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxFrame {
    /// Pointer offset in texture orientation (x right, y down): the
    /// direction the source is sampled toward.
    pub pointer_offset: Vec2,
    pub threshold: Vec2,
    pub cover_scale: Vec2,
    pub edge: EdgePolicy,
    pub blend: BlendMode,
    /// Screen uv of the spotlight centre.
    pub spotlight_centre: Vec2,
    pub aspect: f32,
    pub source_ready: bool,
    pub depth_ready: bool,
    pub secondary_ready: bool,
    pub synthetic: bool,
}

pub struct ParallaxEffect {
    config: DisplacementConfig,
    idle: Option<IdleMotion>,
    source: AssetStatus,
    depth: AssetStatus,
    secondary: AssetStatus,
}

impl ParallaxEffect {
    pub fn new(config: DisplacementConfig, now_ms: f64) -> Self {
        let idle = config.idle.as_ref().map(|c| IdleMotion::new(c, now_ms));
        Self {
            config,
            idle,
            source: AssetStatus::Pending,
            depth: AssetStatus::Pending,
            secondary: AssetStatus::Pending,
        }
    }

    pub fn config(&self) -> &DisplacementConfig {
        &self.config
    }

    pub fn set_asset_status(&mut self, role: AssetRole, status: AssetStatus) -> bool {
        match role {
            AssetRole::Source => self.source = status,
            AssetRole::Depth => self.depth = status,
            AssetRole::Secondary => self.secondary = status,
            AssetRole::Overlay => return false,
        }
        true
    }

    pub fn update(&mut self, input: &FrameInput) -> ParallaxFrame {
        let resolved = resolve_pointer(&mut self.idle, input);
        let ndc = resolved.map(|r| r.ndc).unwrap_or(Vec2::ZERO);
        let pointer_offset = match self.config.origin {
            PointerOrigin::Center => Vec2::new(ndc.x, -ndc.y),
            PointerOrigin::TopLeft => ndc_to_uv(ndc),
        };
        let viewport = match self.source.size() {
            Some((w, h)) => input.viewport.with_source(w, h),
            None => input.viewport,
        };
        ParallaxFrame {
            pointer_offset,
            threshold: self.config.threshold,
            cover_scale: viewport.cover_scale(),
            edge: self.config.edge_policy,
            blend: self.config.blend,
            spotlight_centre: ndc_to_uv(ndc),
            aspect: viewport.aspect(),
            source_ready: self.source.is_ready(),
            depth_ready: self.depth.is_ready(),
            secondary_ready: self.secondary.is_ready(),
            synthetic: resolved.map(|r| r.synthetic).unwrap_or(false),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TrailFrame<'a> {
    /// Row-major field values, `resolution²` entries, row 0 at the top.
    pub field: &'a [f32],
    pub resolution: u32,
    pub color: [f32; 3],
    /// Cover scale of the square field on this viewport.
    pub cover_scale: Vec2,
    pub overlay_ready: bool,
    pub overlay_cover_scale: Vec2,
    pub synthetic: bool,
}

pub struct TrailEffect {
    config: TrailConfig,
    buffer: TrailBuffer,
    idle: Option<IdleMotion>,
    overlay: AssetStatus,
    was_synthetic: bool,
}

impl TrailEffect {
    pub fn new(config: TrailConfig, now_ms: f64) -> Self {
        let buffer = TrailBuffer::new(&config, now_ms);
        let idle = config.idle.as_ref().map(|c| IdleMotion::new(c, now_ms));
        Self {
            config,
            buffer,
            idle,
            overlay: AssetStatus::Pending,
            was_synthetic: false,
        }
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn buffer(&self) -> &TrailBuffer {
        &self.buffer
    }

    pub fn set_asset_status(&mut self, role: AssetRole, status: AssetStatus) -> bool {
        if role != AssetRole::Overlay {
            return false;
        }
        self.overlay = status;
        true
    }

    pub fn update(&mut self, input: &FrameInput) -> TrailFrame<'_> {
        let field_space = input.viewport.with_source(1.0, 1.0);
        let resolved = resolve_pointer(&mut self.idle, input);
        if let Some(r) = resolved {
            if r.synthetic != self.was_synthetic {
                // no connecting stroke between the real and synthetic pointer
                self.buffer.lift();
                self.was_synthetic = r.synthetic;
            }
            let stamp_ms = match (r.synthetic, input.pointer) {
                (false, Some(p)) => p.timestamp_ms,
                _ => input.now_ms,
            };
            let field_uv = field_space.cover_uv(ndc_to_uv(r.ndc));
            self.buffer.record_pointer(field_uv, stamp_ms);
        }
        self.buffer.decay(input.dt_ms);

        let overlay_cover_scale = match self.overlay.size() {
            Some((w, h)) => input.viewport.with_source(w, h).cover_scale(),
            None => Vec2::ONE,
        };
        let resolution = self.buffer.resolution();
        TrailFrame {
            field: self.buffer.frame_values(),
            resolution,
            color: self.config.color.0,
            cover_scale: field_space.cover_scale(),
            overlay_ready: self.overlay.is_ready(),
            overlay_cover_scale,
            synthetic: self.was_synthetic,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopoFrame {
    pub time_sec: f32,
    pub line_count: u32,
    pub line_width: f32,
    pub color: [f32; 3],
    /// Screen uv of the pointer; contours bulge gently around it.
    pub pointer_uv: Vec2,
    pub aspect: f32,
}

pub struct TopoEffect {
    config: TopoConfig,
    time_ms: f64,
    pointer_uv: Vec2,
}

impl TopoEffect {
    pub fn new(config: TopoConfig) -> Self {
        Self {
            config,
            time_ms: 0.0,
            pointer_uv: Vec2::splat(0.5),
        }
    }

    pub fn update(&mut self, input: &FrameInput) -> TopoFrame {
        self.time_ms += input.dt_ms.max(0.0) as f64;
        if let Some(p) = input.pointer {
            self.pointer_uv = p.uv.clamp(Vec2::ZERO, Vec2::ONE);
        }
        TopoFrame {
            time_sec: (self.time_ms / 1000.0) as f32 * self.config.speed,
            line_count: self.config.line_count,
            line_width: self.config.line_width,
            color: self.config.color.0,
            pointer_uv: self.pointer_uv,
            aspect: input.viewport.aspect(),
        }
    }
}
