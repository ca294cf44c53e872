// Layer options read from `data-*` attributes on a `<canvas class="fx-layer">`.
//
// ```html
// <canvas class="fx-layer" data-effect="parallax" data-src="hero.jpg"
//         data-depth="hero-depth.png" data-edge="discard" data-z="1"></canvas>
// <canvas class="fx-layer" data-effect="trail" data-grid-size="50"
//         data-gooey="2" data-pointer-transparent></canvas>
// ```
//
// `attr` receives the attribute name without the `data-` prefix. Absent
// attributes keep the effect defaults.

use crate::constants::{DEFAULT_GOOEY_SIGMA, LAYER_NAME_PREFIX};
use fx_core::constants::{SPOTLIGHT_INNER_RADIUS, SPOTLIGHT_OUTER_RADIUS};
use fx_core::{
    parse_number, BlendMode, ConfigError, DisplacementConfig, EffectConfig, GooeyConfig,
    IdleConfig, LayerConfig, RiseCurve, TopoConfig, TrailConfig,
};
use glam::Vec2;

pub fn layer_config(
    index: usize,
    attr: impl Fn(&str) -> Option<String>,
) -> Result<LayerConfig, ConfigError> {
    let kind = attr("effect").ok_or(ConfigError::Missing("data-effect"))?;
    let effect = match EffectConfig::default_for(&kind)? {
        EffectConfig::Parallax(c) => EffectConfig::Parallax(parallax(c, &attr)?),
        EffectConfig::Trail(c) => EffectConfig::Trail(trail(c, &attr)?),
        EffectConfig::Topo(c) => EffectConfig::Topo(topo(c, &attr)?),
    };

    let name = attr("name")
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("{LAYER_NAME_PREFIX}-{index}"));
    let mut config = LayerConfig::new(name, effect);
    if let Some(v) = attr("z") {
        config.z_index = parse_number("data-z", &v)?;
    }
    if let Some(v) = attr("opacity") {
        config.opacity = parse_number("data-opacity", &v)?;
    }
    if let Some(v) = attr("pointer-transparent") {
        config.pointer_transparent = flag("data-pointer-transparent", &v)?;
    }
    config.validate()?;
    Ok(config)
}

fn parallax(
    mut c: DisplacementConfig,
    attr: &impl Fn(&str) -> Option<String>,
) -> Result<DisplacementConfig, ConfigError> {
    c.source_asset = attr("src").unwrap_or_default();
    c.depth_asset = attr("depth").unwrap_or_default();
    c.secondary_asset = attr("secondary").filter(|s| !s.trim().is_empty());
    if let Some(v) = attr("threshold") {
        c.threshold = pair("data-threshold", &v)?;
    }
    if let Some(v) = attr("edge") {
        c.edge_policy = v.parse()?;
    }
    if let Some(v) = attr("origin") {
        c.origin = v.parse()?;
    }
    if let Some(v) = attr("spotlight") {
        let radii = if v.trim().is_empty() {
            Vec2::new(SPOTLIGHT_INNER_RADIUS, SPOTLIGHT_OUTER_RADIUS)
        } else {
            pair("data-spotlight", &v)?
        };
        c.blend = BlendMode::Spotlight {
            inner_radius: radii.x,
            outer_radius: radii.y,
        };
    }
    if let Some(v) = attr("idle") {
        c.idle = idle("data-idle", &v)?;
    }
    Ok(c)
}

fn trail(
    mut c: TrailConfig,
    attr: &impl Fn(&str) -> Option<String>,
) -> Result<TrailConfig, ConfigError> {
    if let Some(v) = attr("grid-size") {
        c.resolution = parse_number("data-grid-size", &v)?;
    }
    if let Some(v) = attr("trail-size") {
        c.visit_radius = parse_number("data-trail-size", &v)?;
    }
    if let Some(v) = attr("max-age") {
        c.max_age_ms = parse_number("data-max-age", &v)?;
    }
    if let Some(v) = attr("subdivision") {
        c.segment_subdivision = parse_number("data-subdivision", &v)?;
    }
    if let Some(v) = attr("ease") {
        c.ease = v.parse()?;
    }
    if let Some(v) = attr("color") {
        c.color = v.parse()?;
    }
    let rate = match attr("rate") {
        Some(v) => parse_number("data-rate", &v)?,
        None => c.rise.rate_per_sec(),
    };
    c.rise = match attr("rise").as_deref().map(str::trim) {
        None | Some("exponential") => RiseCurve::Exponential { rate_per_sec: rate },
        Some("linear") => RiseCurve::Linear { rate_per_sec: rate },
        Some(other) => return Err(ConfigError::InvalidRise(other.to_string())),
    };
    c.overlay_source_asset = attr("overlay").filter(|s| !s.trim().is_empty());
    if let Some(v) = attr("gooey") {
        c.gooey = match v.trim() {
            "" | "true" => Some(GooeyConfig {
                sigma_cells: DEFAULT_GOOEY_SIGMA,
            }),
            "false" | "off" => None,
            s => Some(GooeyConfig {
                sigma_cells: parse_number("data-gooey", s)?,
            }),
        };
    }
    if let Some(v) = attr("idle") {
        c.idle = idle("data-idle", &v)?;
    }
    Ok(c)
}

fn topo(
    mut c: TopoConfig,
    attr: &impl Fn(&str) -> Option<String>,
) -> Result<TopoConfig, ConfigError> {
    if let Some(v) = attr("lines") {
        c.line_count = parse_number("data-lines", &v)?;
    }
    if let Some(v) = attr("speed") {
        c.speed = parse_number("data-speed", &v)?;
    }
    if let Some(v) = attr("line-width") {
        c.line_width = parse_number("data-line-width", &v)?;
    }
    if let Some(v) = attr("color") {
        c.color = v.parse()?;
    }
    Ok(c)
}

/// Boolean attribute: present and empty means on.
fn flag(field: &'static str, v: &str) -> Result<bool, ConfigError> {
    match v.trim() {
        "" | "true" | "on" => Ok(true),
        "false" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidNumber {
            field,
            value: v.to_string(),
        }),
    }
}

/// `"0.03"` for both axes or `"0.03,0.02"` for x and y.
fn pair(field: &'static str, v: &str) -> Result<Vec2, ConfigError> {
    match v.split_once(',') {
        Some((x, y)) => Ok(Vec2::new(parse_number(field, x)?, parse_number(field, y)?)),
        None => Ok(Vec2::splat(parse_number(field, v)?)),
    }
}

/// `data-idle` turns idle motion on or off, or sets its threshold in ms.
fn idle(field: &'static str, v: &str) -> Result<Option<IdleConfig>, ConfigError> {
    match v.trim() {
        "" | "true" | "on" => Ok(Some(IdleConfig::default())),
        "false" | "off" => Ok(None),
        ms => Ok(Some(IdleConfig::with_threshold(parse_number(field, ms)?))),
    }
}
