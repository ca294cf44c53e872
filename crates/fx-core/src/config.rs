//! Per-instance effect configuration.
//!
//! Defaults follow the values the page shipped with. Front-ends build these
//! from whatever surface they have (the web crate reads `data-*` attributes)
//! and call [`LayerConfig::validate`] before mounting.

use crate::constants::*;
use crate::displacement::{BlendMode, EdgePolicy};
use crate::trail::{Easing, RiseCurve};
use glam::Vec2;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid colour {0:?}, expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("unknown edge policy {0:?}, expected clamp or discard")]
    InvalidEdgePolicy(String),
    #[error("unknown easing {0:?}")]
    InvalidEasing(String),
    #[error("unknown rise curve {0:?}, expected exponential or linear")]
    InvalidRise(String),
    #[error("unknown effect kind {0:?}")]
    InvalidEffect(String),
    #[error("unknown pointer origin {0:?}")]
    InvalidOrigin(String),
    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("duplicate layer name {0:?}")]
    DuplicateLayer(String),
}

/// Linear RGB colour in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([1.0, 1.0, 1.0]);
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConfigError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).map_err(|_| err());
        let [r, g, b] = match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    out[i] = channel(&format!("{c}{c}"))?;
                }
                out
            }
            6 => [
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ],
            _ => return Err(err()),
        };
        Ok(Rgb([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]))
    }
}

/// Where the pointer offset fed to the displacement is measured from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerOrigin {
    /// ndc, `(0, 0)` at the viewport centre: the image leans both ways.
    #[default]
    Center,
    /// uv, `(0, 0)` at the top-left corner: the image only leans one way.
    TopLeft,
}

impl FromStr for PointerOrigin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => Ok(PointerOrigin::Center),
            "top-left" | "topleft" => Ok(PointerOrigin::TopLeft),
            _ => Err(ConfigError::InvalidOrigin(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdleConfig {
    pub threshold_ms: f64,
    pub blend_in_ms: f64,
    /// Orbit half-extent in ndc units.
    pub amplitude: Vec2,
    /// Oscillation frequency per axis; keep them unequal.
    pub freq_hz: Vec2,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            threshold_ms: IDLE_THRESHOLD_MS,
            blend_in_ms: IDLE_BLEND_IN_MS,
            amplitude: Vec2::from(IDLE_AMPLITUDE),
            freq_hz: Vec2::from(IDLE_FREQ_HZ),
        }
    }
}

impl IdleConfig {
    pub fn with_threshold(threshold_ms: f64) -> Self {
        Self {
            threshold_ms,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("idle_threshold_ms", self.threshold_ms)?;
        non_negative("idle_blend_in_ms", self.blend_in_ms)?;
        within("idle_amplitude", self.amplitude.max_element() as f64, 0.0, 1.0)?;
        within("idle_amplitude", self.amplitude.min_element() as f64, 0.0, 1.0)?;
        non_negative("idle_freq_hz", self.freq_hz.min_element() as f64)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementConfig {
    pub source_asset: String,
    pub depth_asset: String,
    pub secondary_asset: Option<String>,
    pub threshold: Vec2,
    pub edge_policy: EdgePolicy,
    pub blend: BlendMode,
    pub origin: PointerOrigin,
    pub idle: Option<IdleConfig>,
}

impl Default for DisplacementConfig {
    fn default() -> Self {
        Self {
            source_asset: String::new(),
            depth_asset: String::new(),
            secondary_asset: None,
            threshold: Vec2::splat(PARALLAX_THRESHOLD),
            edge_policy: EdgePolicy::Clamp,
            blend: BlendMode::Single,
            origin: PointerOrigin::Center,
            idle: None,
        }
    }
}

impl DisplacementConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_asset.is_empty() {
            return Err(ConfigError::Missing("source_asset"));
        }
        if self.depth_asset.is_empty() {
            return Err(ConfigError::Missing("depth_asset"));
        }
        within("threshold", self.threshold.x as f64, 0.0, 1.0)?;
        within("threshold", self.threshold.y as f64, 0.0, 1.0)?;
        if let BlendMode::Spotlight {
            inner_radius,
            outer_radius,
        } = self.blend
        {
            if self.secondary_asset.is_none() {
                return Err(ConfigError::Missing("secondary_asset"));
            }
            non_negative("spotlight_inner", inner_radius as f64)?;
            non_negative("spotlight_outer", outer_radius as f64)?;
        }
        match &self.idle {
            Some(idle) => idle.validate(),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GooeyConfig {
    /// Blur standard deviation in trail cells.
    pub sigma_cells: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrailConfig {
    pub resolution: u32,
    pub visit_radius: f32,
    pub max_age_ms: f32,
    pub rise: RiseCurve,
    pub segment_subdivision: f32,
    pub ease: Easing,
    pub color: Rgb,
    pub overlay_source_asset: Option<String>,
    pub gooey: Option<GooeyConfig>,
    pub idle: Option<IdleConfig>,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            resolution: TRAIL_RESOLUTION,
            visit_radius: TRAIL_VISIT_RADIUS,
            max_age_ms: TRAIL_MAX_AGE_MS,
            rise: RiseCurve::Exponential {
                rate_per_sec: TRAIL_RISE_RATE_PER_SEC,
            },
            segment_subdivision: TRAIL_SEGMENT_SUBDIVISION,
            ease: Easing::Linear,
            color: Rgb::WHITE,
            overlay_source_asset: None,
            gooey: None,
            idle: Some(IdleConfig::default()),
        }
    }
}

impl TrailConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        within(
            "resolution",
            self.resolution as f64,
            1.0,
            TRAIL_MAX_RESOLUTION as f64,
        )?;
        positive("visit_radius", self.visit_radius as f64)?;
        positive("max_age_ms", self.max_age_ms as f64)?;
        positive("interpolation_rate", self.rise.rate_per_sec() as f64)?;
        positive("segment_subdivision", self.segment_subdivision as f64)?;
        if let Some(g) = &self.gooey {
            non_negative("gooey", g.sigma_cells as f64)?;
        }
        match &self.idle {
            Some(idle) => idle.validate(),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TopoConfig {
    pub line_count: u32,
    pub speed: f32,
    pub line_width: f32,
    pub color: Rgb,
}

impl Default for TopoConfig {
    fn default() -> Self {
        Self {
            line_count: TOPO_LINE_COUNT,
            speed: TOPO_SPEED,
            line_width: TOPO_LINE_WIDTH,
            color: Rgb([0.55, 0.62, 0.75]),
        }
    }
}

impl TopoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        within("line_count", self.line_count as f64, 1.0, 128.0)?;
        non_negative("speed", self.speed as f64)?;
        positive("line_width", self.line_width as f64)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EffectConfig {
    Parallax(DisplacementConfig),
    Trail(TrailConfig),
    Topo(TopoConfig),
}

impl EffectConfig {
    /// Default configuration for an effect kind name (`parallax`, `trail`,
    /// `topo`).
    pub fn default_for(kind: &str) -> Result<Self, ConfigError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "parallax" | "displacement" => Ok(EffectConfig::Parallax(Default::default())),
            "trail" | "pixel-trail" => Ok(EffectConfig::Trail(Default::default())),
            "topo" | "topographic" => Ok(EffectConfig::Topo(Default::default())),
            _ => Err(ConfigError::InvalidEffect(kind.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            EffectConfig::Parallax(c) => c.validate(),
            EffectConfig::Trail(c) => c.validate(),
            EffectConfig::Topo(c) => c.validate(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
    pub name: String,
    pub z_index: i32,
    /// Transparent layers never become the pointer target.
    pub pointer_transparent: bool,
    pub opacity: f32,
    pub effect: EffectConfig,
}

impl LayerConfig {
    pub fn new(name: impl Into<String>, effect: EffectConfig) -> Self {
        Self {
            name: name.into(),
            z_index: 0,
            pointer_transparent: false,
            opacity: 1.0,
            effect,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        within("opacity", self.opacity as f64, 0.0, 1.0)?;
        self.effect.validate()
    }
}

/// Parse a numeric option, naming the field in the error.
pub fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn within(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    within(field, value, 0.0, f64::MAX)
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}
