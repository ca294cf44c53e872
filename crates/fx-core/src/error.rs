use crate::config::ConfigError;
use crate::effect::AssetRole;

/// Failures surfaced by the effect core and its render backends.
///
/// Only `UnsupportedContext` is fatal; everything else skips the affected
/// frame or layer and the loop keeps running.
#[derive(Debug, thiserror::Error)]
pub enum FxError {
    #[error("failed to load {role} asset: {reason}")]
    AssetLoad { role: AssetRole, reason: String },
    #[error("viewport has zero width or height")]
    DegenerateViewport,
    #[error("rendering context unavailable: {0}")]
    UnsupportedContext(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("no layer at index {0}")]
    UnknownLayer(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
