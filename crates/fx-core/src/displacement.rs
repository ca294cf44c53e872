//! Depth-driven displacement, edge handling and spotlight blending.
//!
//! This is the CPU reference of `parallax.wgsl`: the shader and
//! [`DisplacementSampler::shade`] implement the same per-pixel function, so
//! the numeric behaviour can be tested on the host.

use crate::config::ConfigError;
use crate::effect::ParallaxFrame;
use crate::viewport::cover_uv_with_scale;
use glam::{Vec2, Vec4};
use image::RgbaImage;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Clamp the displaced coordinate into `[0, 1]`; edges smear.
    #[default]
    Clamp,
    /// Pixels displaced outside `[0, 1]` become transparent.
    Discard,
}

impl FromStr for EdgePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(EdgePolicy::Clamp),
            "discard" => Ok(EdgePolicy::Discard),
            _ => Err(ConfigError::InvalidEdgePolicy(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BlendMode {
    #[default]
    Single,
    /// Reveal the secondary image inside a circle around the pointer.
    /// Radii are fractions of the viewport height.
    Spotlight {
        inner_radius: f32,
        outer_radius: f32,
    },
}

#[inline]
pub fn displacement(pointer_offset: Vec2, depth: f32, threshold: Vec2) -> Vec2 {
    pointer_offset * depth * threshold
}

#[inline]
pub fn apply_edge(coord: Vec2, policy: EdgePolicy) -> Option<Vec2> {
    match policy {
        EdgePolicy::Clamp => Some(coord.clamp(Vec2::ZERO, Vec2::ONE)),
        EdgePolicy::Discard => {
            let inside = coord.cmpge(Vec2::ZERO).all() && coord.cmple(Vec2::ONE).all();
            inside.then_some(coord)
        }
    }
}

/// Spotlight weight of the secondary image at `uv` for a spot centred on
/// `centre`: 1 within `inner`, 0 from `outer` on, linear in between.
/// `aspect` (width / height) stretches x so the spot stays circular.
pub fn spotlight_factor(uv: Vec2, centre: Vec2, aspect: f32, inner: f32, outer: f32) -> f32 {
    let aspect = if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    };
    let d = ((uv - centre) * Vec2::new(aspect, 1.0)).length();
    if d <= inner {
        1.0
    } else if d >= outer || outer <= inner {
        0.0
    } else {
        1.0 - (d - inner) / (outer - inner)
    }
}

/// Anything that can be sampled at a uv coordinate.
pub trait TextureSource {
    /// Straight-alpha RGBA in `[0, 1]`.
    fn sample(&self, uv: Vec2) -> Vec4;
}

impl TextureSource for RgbaImage {
    /// Bilinear filtering with clamp-to-edge addressing.
    fn sample(&self, uv: Vec2) -> Vec4 {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 {
            return Vec4::ZERO;
        }
        let p = uv.clamp(Vec2::ZERO, Vec2::ONE) * Vec2::new(w as f32, h as f32) - 0.5;
        let x0 = p.x.floor();
        let y0 = p.y.floor();
        let fx = p.x - x0;
        let fy = p.y - y0;
        let texel = |x: f32, y: f32| {
            let xi = (x.max(0.0) as u32).min(w - 1);
            let yi = (y.max(0.0) as u32).min(h - 1);
            Vec4::from(self.get_pixel(xi, yi).0.map(|c| c as f32 / 255.0))
        };
        let top = texel(x0, y0).lerp(texel(x0 + 1.0, y0), fx);
        let bottom = texel(x0, y0 + 1.0).lerp(texel(x0 + 1.0, y0 + 1.0), fx);
        top.lerp(bottom, fy)
    }
}

/// Images available to one parallax layer; `None` while still loading or
/// after a failed load.
#[derive(Clone, Copy, Default)]
pub struct AssetSet<'a> {
    pub source: Option<&'a dyn TextureSource>,
    pub depth: Option<&'a dyn TextureSource>,
    pub secondary: Option<&'a dyn TextureSource>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplacementSampler {
    pub threshold: Vec2,
    pub edge: EdgePolicy,
    pub blend: BlendMode,
}

impl DisplacementSampler {
    /// Colour of the output pixel at `screen_uv` (top-left uv of the canvas).
    pub fn shade(&self, screen_uv: Vec2, frame: &ParallaxFrame, assets: &AssetSet<'_>) -> Vec4 {
        let Some(source) = assets.source else {
            return Vec4::ZERO;
        };
        let uv = cover_uv_with_scale(screen_uv, frame.cover_scale);
        let coord = match assets.depth {
            Some(depth) => {
                uv + displacement(frame.pointer_offset, depth.sample(uv).x, self.threshold)
            }
            None => uv,
        };
        self.sample_displaced(coord, screen_uv, frame, source, assets.secondary)
    }

    /// Edge policy, primary sample and optional spotlight blend at an
    /// already displaced coordinate.
    pub fn sample_displaced(
        &self,
        coord: Vec2,
        screen_uv: Vec2,
        frame: &ParallaxFrame,
        source: &dyn TextureSource,
        secondary: Option<&dyn TextureSource>,
    ) -> Vec4 {
        let Some(coord) = apply_edge(coord, self.edge) else {
            return Vec4::ZERO;
        };
        let primary = source.sample(coord);
        match (self.blend, secondary) {
            (
                BlendMode::Spotlight {
                    inner_radius,
                    outer_radius,
                },
                Some(secondary),
            ) => {
                let f = spotlight_factor(
                    screen_uv,
                    frame.spotlight_centre,
                    frame.aspect,
                    inner_radius,
                    outer_radius,
                );
                primary.lerp(secondary.sample(coord), f)
            }
            _ => primary,
        }
    }
}
