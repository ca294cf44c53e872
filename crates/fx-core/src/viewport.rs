//! Coordinate mapping between pointer events, the canvas and asset space.
//!
//! Sizes are CSS pixels; `device_pixel_ratio` converts to the canvas backing
//! store. Two pointer spaces are used by the effects:
//!
//! - uv: `[0, 1]²` with the origin at the top-left corner,
//! - ndc: `[-1, 1]²` centred, y pointing up.
//!
//! The "cover" transform scales an asset uniformly until it fills the
//! viewport and crops the overflow symmetrically, like CSS `background-size:
//! cover`.

use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
    pub source_width: f32,
    pub source_height: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl ViewportState {
    /// Viewport without a known source asset (cover mapping is the identity).
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            source_width: 0.0,
            source_height: 0.0,
        }
    }

    pub fn with_source(mut self, source_width: f32, source_height: f32) -> Self {
        self.source_width = source_width;
        self.source_height = source_height;
        self
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(positive(self.width) && positive(self.height))
    }

    #[inline]
    fn has_source(&self) -> bool {
        positive(self.source_width) && positive(self.source_height)
    }

    /// Width over height, 1.0 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// Canvas backing-store size in physical pixels, never zero.
    pub fn backing_size(&self) -> (u32, u32) {
        let dpr = if positive(self.device_pixel_ratio) {
            self.device_pixel_ratio
        } else {
            1.0
        };
        let w = if positive(self.width) { self.width } else { 0.0 };
        let h = if positive(self.height) { self.height } else { 0.0 };
        (
            ((w * dpr).round() as u32).max(1),
            ((h * dpr).round() as u32).max(1),
        )
    }

    /// CSS-pixel position relative to the viewport → top-left uv.
    pub fn client_to_uv(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.is_degenerate() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Vec2::new(x / self.width, y / self.height))
    }

    /// CSS-pixel position → centred ndc with the vertical axis inverted.
    pub fn client_to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        self.client_to_uv(x, y).map(uv_to_ndc)
    }

    /// Page client coordinates → `(ndc, uv)` for a viewport whose top-left
    /// corner sits at `origin` on the page. `None` outside the viewport.
    pub fn region_pointer(&self, origin: Vec2, client: Vec2) -> Option<(Vec2, Vec2)> {
        let uv = self.client_to_uv(client.x - origin.x, client.y - origin.y)?;
        if uv.cmplt(Vec2::ZERO).any() || uv.cmpgt(Vec2::ONE).any() {
            return None;
        }
        Some((uv_to_ndc(uv), uv))
    }

    /// Backing-store (fragment) coordinates → top-left uv.
    pub fn physical_to_uv(&self, px: f32, py: f32) -> Option<Vec2> {
        if self.is_degenerate() {
            return None;
        }
        let (w, h) = self.backing_size();
        Some(Vec2::new(px / w as f32, py / h as f32))
    }

    /// Fraction of the source visible along each axis under the cover
    /// transform. `(1, 1)` when either the viewport or the source is unknown.
    pub fn cover_scale(&self) -> Vec2 {
        if self.is_degenerate() || !self.has_source() {
            return Vec2::ONE;
        }
        let scale = (self.width / self.source_width).max(self.height / self.source_height);
        Vec2::new(
            self.width / (self.source_width * scale),
            self.height / (self.source_height * scale),
        )
    }

    /// Screen uv → source uv under the cover transform, clamped to `[0, 1]`.
    pub fn cover_uv(&self, screen_uv: Vec2) -> Vec2 {
        cover_uv_with_scale(screen_uv, self.cover_scale())
    }
}

/// Cover mapping for an already computed `cover_scale`; shared with the
/// WGSL `cover_uv` helper so CPU and GPU agree.
#[inline]
pub fn cover_uv_with_scale(screen_uv: Vec2, cover_scale: Vec2) -> Vec2 {
    ((screen_uv - Vec2::splat(0.5)) * cover_scale + Vec2::splat(0.5)).clamp(Vec2::ZERO, Vec2::ONE)
}

#[inline]
pub fn uv_to_ndc(uv: Vec2) -> Vec2 {
    Vec2::new(2.0 * uv.x - 1.0, 1.0 - 2.0 * uv.y)
}

#[inline]
pub fn ndc_to_uv(ndc: Vec2) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5)
}

#[inline]
fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}
