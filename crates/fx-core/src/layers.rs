//! Page-level arrangement of effects as stacked layers.

use crate::config::{ConfigError, EffectConfig, LayerConfig};
use crate::effect::{
    AssetRole, AssetStatus, FrameInput, ParallaxEffect, ParallaxFrame, TopoEffect, TopoFrame,
    TrailEffect, TrailFrame,
};
use crate::error::FxError;
use crate::viewport::ViewportState;
use smallvec::SmallVec;

pub enum Effect {
    Parallax(ParallaxEffect),
    Trail(TrailEffect),
    Topo(TopoEffect),
}

impl Effect {
    fn new(config: &EffectConfig, now_ms: f64) -> Self {
        match config {
            EffectConfig::Parallax(c) => Effect::Parallax(ParallaxEffect::new(c.clone(), now_ms)),
            EffectConfig::Trail(c) => Effect::Trail(TrailEffect::new(c.clone(), now_ms)),
            EffectConfig::Topo(c) => Effect::Topo(TopoEffect::new(c.clone())),
        }
    }
}

pub struct Layer {
    pub config: LayerConfig,
    pub effect: Effect,
}

#[derive(Clone, Copy, Debug)]
pub enum LayerFrameKind<'a> {
    Parallax(ParallaxFrame),
    Trail(TrailFrame<'a>),
    Topo(TopoFrame),
}

#[derive(Clone, Copy, Debug)]
pub struct LayerFrame<'a> {
    /// Position of the layer in the stack's construction order; stable key
    /// for backends.
    pub index: usize,
    pub name: &'a str,
    pub z_index: i32,
    pub opacity: f32,
    pub kind: LayerFrameKind<'a>,
}

/// Everything needed to draw one frame, bottom layer first.
#[derive(Clone, Debug)]
pub struct StackFrame<'a> {
    pub now_ms: f64,
    pub dt_ms: f32,
    pub viewport: ViewportState,
    pub layers: SmallVec<[LayerFrame<'a>; 4]>,
}

#[derive(Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn from_configs(configs: Vec<LayerConfig>, now_ms: f64) -> Result<Self, ConfigError> {
        let mut layers: Vec<Layer> = Vec::with_capacity(configs.len());
        for config in configs {
            config.validate()?;
            if layers.iter().any(|l| l.config.name == config.name) {
                return Err(ConfigError::DuplicateLayer(config.name));
            }
            let effect = Effect::new(&config.effect, now_ms);
            layers.push(Layer { config, effect });
        }
        Ok(Self { layers })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.config.name == name)
    }

    /// Topmost layer that receives pointer input. Among equal z-indices the
    /// later one sits on top, as in document order.
    pub fn pointer_target(&self) -> Option<usize> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.config.pointer_transparent)
            .max_by_key(|(i, l)| (l.config.z_index, *i))
            .map(|(i, _)| i)
    }

    pub fn set_asset_status(
        &mut self,
        index: usize,
        role: AssetRole,
        status: AssetStatus,
    ) -> Result<(), FxError> {
        let layer = self.layers.get_mut(index).ok_or(FxError::UnknownLayer(index))?;
        let accepted = match &mut layer.effect {
            Effect::Parallax(p) => p.set_asset_status(role, status),
            Effect::Trail(t) => t.set_asset_status(role, status),
            Effect::Topo(_) => false,
        };
        if !accepted {
            log::warn!(
                "[layers] layer {:?} has no {} asset; ignoring",
                layer.config.name,
                role
            );
        }
        Ok(())
    }

    /// Advance every layer by one frame and collect their parameters in
    /// ascending z-order (ties keep construction order).
    pub fn update(&mut self, input: &FrameInput) -> StackFrame<'_> {
        let mut layers: SmallVec<[LayerFrame<'_>; 4]> = self
            .layers
            .iter_mut()
            .enumerate()
            .map(|(index, layer)| {
                let kind = match &mut layer.effect {
                    Effect::Parallax(p) => LayerFrameKind::Parallax(p.update(input)),
                    Effect::Trail(t) => LayerFrameKind::Trail(t.update(input)),
                    Effect::Topo(t) => LayerFrameKind::Topo(t.update(input)),
                };
                LayerFrame {
                    index,
                    name: layer.config.name.as_str(),
                    z_index: layer.config.z_index,
                    opacity: layer.config.opacity,
                    kind,
                }
            })
            .collect();
        layers.sort_by_key(|l| l.z_index);
        StackFrame {
            now_ms: input.now_ms,
            dt_ms: input.dt_ms,
            viewport: input.viewport,
            layers,
        }
    }
}
