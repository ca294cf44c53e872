//! Decaying pointer trail field.
//!
//! The field is a square grid of cells in cover-mapped space. Every pointer
//! sample stamps the cells around it; once per frame `decay` ages all cells,
//! eases freshly visited ones up toward their target and lets the rest follow
//! a falling envelope that reaches exactly zero at `max_age_ms`.
//!
//! Cell values never exceed their envelope, so the update is stable for any
//! frame time: a long stall only ages cells further.

use crate::config::{ConfigError, GooeyConfig, TrailConfig};
use crate::constants::{GOO_ALPHA_GAIN, GOO_ALPHA_OFFSET, MAX_SEGMENT_STAMPS, TRAIL_MAX_RESOLUTION};
use glam::{UVec2, Vec2};
use smallvec::SmallVec;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    QuadOut,
    CircOut,
}

impl Easing {
    /// Maps `t` in `[0, 1]` (clamped) onto `[0, 1]`; monotonic, fixes 0 and 1.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).max(0.0).sqrt(),
        }
    }
}

impl FromStr for Easing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "quad-out" | "quadout" => Ok(Easing::QuadOut),
            "circ-out" | "circout" => Ok(Easing::CircOut),
            _ => Err(ConfigError::InvalidEasing(s.to_string())),
        }
    }
}

/// How a visited cell climbs from its current value toward its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RiseCurve {
    /// Closes `1 - e^(-rate·dt)` of the remaining gap per pass.
    Exponential { rate_per_sec: f32 },
    /// Climbs by at most `rate·dt` per pass.
    Linear { rate_per_sec: f32 },
}

impl RiseCurve {
    pub fn rate_per_sec(self) -> f32 {
        match self {
            RiseCurve::Exponential { rate_per_sec } | RiseCurve::Linear { rate_per_sec } => {
                rate_per_sec
            }
        }
    }

    /// One step from `value` toward `target` (`target > value`), never past it.
    #[inline]
    fn step(self, value: f32, target: f32, dt_ms: f32) -> f32 {
        let gap = target - value;
        let dt_sec = dt_ms / 1000.0;
        let climbed = match self {
            RiseCurve::Exponential { rate_per_sec } => {
                gap * (1.0 - (-rate_per_sec.max(0.0) * dt_sec).exp())
            }
            RiseCurve::Linear { rate_per_sec } => (rate_per_sec.max(0.0) * dt_sec).min(gap),
        };
        (value + climbed).min(target)
    }
}

#[derive(Clone, Copy, Debug)]
struct CellState {
    target: f32,
    age_ms: f32,
    /// Visited since the last decay pass.
    fresh: bool,
}

impl CellState {
    const UNVISITED: CellState = CellState {
        target: 0.0,
        age_ms: f32::INFINITY,
        fresh: false,
    };
}

/// Fixed-resolution scalar field, row-major with row 0 at the top.
#[derive(Clone, Debug)]
pub struct TrailField {
    resolution: u32,
    values: Vec<f32>,
    cells: Vec<CellState>,
}

impl TrailField {
    /// `resolution` is clamped to `1..=TRAIL_MAX_RESOLUTION`.
    pub fn new(resolution: u32) -> Self {
        let resolution = resolution.clamp(1, TRAIL_MAX_RESOLUTION);
        let n = resolution as usize * resolution as usize;
        Self {
            resolution,
            values: vec![0.0; n],
            cells: vec![CellState::UNVISITED; n],
        }
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn value(&self, x: u32, y: u32) -> f32 {
        self.index(UVec2::new(x, y))
            .map(|i| self.values[i])
            .unwrap_or(0.0)
    }

    /// Field cell containing a field-space uv (clamped onto the grid).
    pub fn cell_at(&self, uv: Vec2) -> UVec2 {
        let max = (self.resolution - 1) as f32;
        let c = (uv * self.resolution as f32).floor().clamp(Vec2::ZERO, Vec2::splat(max));
        UVec2::new(c.x as u32, c.y as u32)
    }

    pub fn clear(&mut self) {
        self.values.fill(0.0);
        self.cells.fill(CellState::UNVISITED);
    }

    #[inline]
    fn index(&self, cell: UVec2) -> Option<usize> {
        (cell.x < self.resolution && cell.y < self.resolution)
            .then(|| (cell.y * self.resolution + cell.x) as usize)
    }
}

pub struct TrailBuffer {
    field: TrailField,
    visit_radius: f32,
    segment_spacing: f32,
    max_age_ms: f32,
    rise: RiseCurve,
    ease: Easing,
    /// Time of the last decay pass, in the caller's clock.
    clock_ms: f64,
    last_point: Option<Vec2>,
    gooey: Option<GooeyFilter>,
    filtered: Vec<f32>,
}

impl TrailBuffer {
    pub fn new(config: &TrailConfig, now_ms: f64) -> Self {
        Self {
            field: TrailField::new(config.resolution),
            visit_radius: config.visit_radius.max(0.0),
            segment_spacing: config.visit_radius.max(0.0) * 0.5
                / config.segment_subdivision.max(f32::EPSILON),
            max_age_ms: config.max_age_ms.max(f32::EPSILON),
            rise: config.rise,
            ease: config.ease,
            clock_ms: now_ms,
            last_point: None,
            gooey: config.gooey.as_ref().map(GooeyFilter::new),
            filtered: Vec::new(),
        }
    }

    #[inline]
    pub fn field(&self) -> &TrailField {
        &self.field
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.field.resolution
    }

    pub fn record_visit(&mut self, cell: UVec2, timestamp_ms: f64) {
        self.record_visit_weighted(cell, timestamp_ms, 1.0);
    }

    /// Refresh one cell. Several visits to the same cell before the next
    /// decay keep the strongest weight and the youngest age.
    pub fn record_visit_weighted(&mut self, cell: UVec2, timestamp_ms: f64, weight: f32) {
        let Some(i) = self.field.index(cell) else {
            return;
        };
        if !(weight > 0.0) {
            return;
        }
        let weight = weight.min(1.0);
        let age = (self.clock_ms - timestamp_ms).max(0.0) as f32;
        let value = self.field.values[i];
        let c = &mut self.field.cells[i];
        if c.fresh {
            c.target = c.target.max(weight);
            c.age_ms = c.age_ms.min(age);
        } else {
            c.target = weight.max(value);
            c.age_ms = age;
            c.fresh = true;
        }
    }

    /// Visit every cell within `visit_radius` of `uv`, weighted by distance.
    pub fn stamp(&mut self, uv: Vec2, timestamp_ms: f64) {
        if !uv.is_finite() {
            return;
        }
        let res = self.field.resolution as f32;
        let centre = uv * res;
        let radius = self.visit_radius * res;
        let hit = self.field.cell_at(uv);
        self.record_visit(hit, timestamp_ms);
        if radius <= 0.0 {
            return;
        }
        let lo = (centre - Vec2::splat(radius)).floor().max(Vec2::ZERO);
        let hi = (centre + Vec2::splat(radius)).ceil().min(Vec2::splat(res - 1.0));
        for y in lo.y as u32..=hi.y as u32 {
            for x in lo.x as u32..=hi.x as u32 {
                let cell_centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = cell_centre.distance(centre) / radius;
                if d < 1.0 {
                    let w = self.ease.apply(1.0 - d);
                    self.record_visit_weighted(UVec2::new(x, y), timestamp_ms, w);
                }
            }
        }
    }

    /// Stamp a pointer sample and fill the gap from the previous one so fast
    /// strokes leave a continuous trail. Repeating the previous position is a
    /// no-op: a resting pointer lets its trail fade.
    pub fn record_pointer(&mut self, uv: Vec2, timestamp_ms: f64) {
        if !uv.is_finite() {
            return;
        }
        let mut points: SmallVec<[Vec2; 8]> = SmallVec::new();
        if let Some(last) = self.last_point {
            let delta = uv - last;
            let dist = delta.length();
            if dist <= f32::EPSILON {
                return;
            }
            if self.segment_spacing > 0.0 && dist > self.segment_spacing {
                let steps = ((dist / self.segment_spacing).ceil() as usize).min(MAX_SEGMENT_STAMPS);
                for i in 1..steps {
                    points.push(last + delta * (i as f32 / steps as f32));
                }
            }
        }
        points.push(uv);
        for p in points {
            self.stamp(p, timestamp_ms);
        }
        self.last_point = Some(uv);
    }

    /// Forget the previous sample; the next one starts a new stroke.
    pub fn lift(&mut self) {
        self.last_point = None;
    }

    pub fn decay(&mut self, dt_ms: f32) {
        if !(dt_ms > 0.0) || !dt_ms.is_finite() {
            return;
        }
        self.clock_ms += dt_ms as f64;
        let max_age = self.max_age_ms;
        for (value, c) in self.field.values.iter_mut().zip(self.field.cells.iter_mut()) {
            if c.fresh {
                c.fresh = false;
            } else {
                c.age_ms += dt_ms;
            }
            if c.age_ms >= max_age {
                *value = 0.0;
                c.target = 0.0;
                continue;
            }
            let envelope = c.target * self.ease.apply(1.0 - c.age_ms / max_age);
            *value = if envelope > *value {
                self.rise.step(*value, envelope, dt_ms)
            } else {
                envelope
            };
        }
    }

    pub fn clear(&mut self) {
        self.field.clear();
        self.last_point = None;
    }

    /// Values to display this frame: the raw field, or the gooey-filtered
    /// copy when a filter is configured.
    pub fn frame_values(&mut self) -> &[f32] {
        match self.gooey.as_mut() {
            Some(g) => {
                g.apply(&self.field, &mut self.filtered);
                &self.filtered
            }
            None => &self.field.values,
        }
    }
}

/// Quantise values to an `R8Unorm` texture payload.
pub fn write_r8(values: &[f32], out: &mut [u8]) {
    for (dst, v) in out.iter_mut().zip(values) {
        *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

/// Blur-then-threshold "goo": neighbouring blobs merge into one rounded
/// shape instead of reading as separate squares.
#[derive(Clone, Debug)]
pub struct GooeyFilter {
    kernel: Vec<f32>,
    scratch: Vec<f32>,
}

impl GooeyFilter {
    pub fn new(config: &GooeyConfig) -> Self {
        Self {
            kernel: gaussian_kernel(config.sigma_cells),
            scratch: Vec::new(),
        }
    }

    pub fn apply(&mut self, field: &TrailField, out: &mut Vec<f32>) {
        let n = field.resolution as usize;
        let src = field.values();
        out.clear();
        out.resize(src.len(), 0.0);
        self.scratch.clear();
        self.scratch.resize(src.len(), 0.0);
        let r = (self.kernel.len() / 2) as isize;

        // Outside the field counts as transparent.
        for y in 0..n {
            for x in 0..n {
                let mut acc = 0.0;
                for (k, w) in self.kernel.iter().enumerate() {
                    let sx = x as isize + k as isize - r;
                    if sx >= 0 && (sx as usize) < n {
                        acc += w * src[y * n + sx as usize];
                    }
                }
                self.scratch[y * n + x] = acc;
            }
        }
        for y in 0..n {
            for x in 0..n {
                let mut acc = 0.0;
                for (k, w) in self.kernel.iter().enumerate() {
                    let sy = y as isize + k as isize - r;
                    if sy >= 0 && (sy as usize) < n {
                        acc += w * self.scratch[sy as usize * n + x];
                    }
                }
                out[y * n + x] = goo_alpha(acc);
            }
        }
    }
}

#[inline]
pub fn goo_alpha(a: f32) -> f32 {
    (GOO_ALPHA_GAIN * a + GOO_ALPHA_OFFSET).clamp(0.0, 1.0)
}

fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if !(sigma > 0.0) || !sigma.is_finite() {
        return vec![1.0];
    }
    let radius = (sigma * 3.0).ceil() as isize;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i * i) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}
