// Shared tuning constants for the effect core. Effect defaults mirror the
// values the promotional page shipped with; everything here can be
// overridden per instance through `config`.

// Frame timing
pub const MAX_FRAME_DT_MS: f64 = 1000.0; // clamp for stalls (hidden tab, debugger)

// Idle-motion fallback
pub const IDLE_THRESHOLD_MS: f64 = 2000.0;
pub const IDLE_BLEND_IN_MS: f64 = 600.0; // ease from the last real pointer into the orbit
pub const IDLE_AMPLITUDE: [f32; 2] = [0.6, 0.45]; // ndc units
pub const IDLE_FREQ_HZ: [f32; 2] = [0.13, 0.21]; // unequal so the path never closes into an ellipse

// Parallax
pub const PARALLAX_THRESHOLD: f32 = 0.03;
pub const SPOTLIGHT_INNER_RADIUS: f32 = 0.15;
pub const SPOTLIGHT_OUTER_RADIUS: f32 = 0.35;

// Pixel trail
pub const TRAIL_RESOLUTION: u32 = 40; // cells per side
pub const TRAIL_MAX_RESOLUTION: u32 = 512;
pub const TRAIL_VISIT_RADIUS: f32 = 0.1; // field uv units
pub const TRAIL_MAX_AGE_MS: f32 = 250.0;
pub const TRAIL_RISE_RATE_PER_SEC: f32 = 30.0;
pub const TRAIL_SEGMENT_SUBDIVISION: f32 = 5.0;
pub const MAX_SEGMENT_STAMPS: usize = 64;

// Gooey filter: alpha' = GOO_ALPHA_GAIN * alpha + GOO_ALPHA_OFFSET
pub const GOO_ALPHA_GAIN: f32 = 19.0;
pub const GOO_ALPHA_OFFSET: f32 = -9.0;

// Topographic background
pub const TOPO_LINE_COUNT: u32 = 14;
pub const TOPO_SPEED: f32 = 0.05;
pub const TOPO_LINE_WIDTH: f32 = 1.2; // physical px
