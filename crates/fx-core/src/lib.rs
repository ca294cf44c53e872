pub mod config;
pub mod constants;
pub mod displacement;
pub mod driver;
pub mod effect;
pub mod error;
pub mod idle;
pub mod input;
pub mod layers;
pub mod trail;
pub mod viewport;

pub use config::*;
pub use displacement::{
    apply_edge, displacement, spotlight_factor, AssetSet, BlendMode, DisplacementSampler,
    EdgePolicy, TextureSource,
};
pub use driver::{FrameDriver, RenderBackend, SkipReason, TickOutcome};
pub use effect::*;
pub use error::FxError;
pub use idle::{IdleMotion, IdleState, ResolvedPointer};
pub use input::{PointerSignal, PointerSource, SharedPointer};
pub use layers::{Effect, Layer, LayerFrame, LayerFrameKind, LayerStack, StackFrame};
pub use trail::{write_r8, Easing, GooeyFilter, RiseCurve, TrailBuffer, TrailField};
pub use viewport::{cover_uv_with_scale, ndc_to_uv, uv_to_ndc, ViewportState};

// Shaders bundled as string constants
pub static PARALLAX_WGSL: &str = include_str!("../shaders/parallax.wgsl");
pub static TRAIL_WGSL: &str = include_str!("../shaders/trail.wgsl");
pub static TOPO_WGSL: &str = include_str!("../shaders/topo.wgsl");
