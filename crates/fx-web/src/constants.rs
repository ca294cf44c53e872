// Front-end wiring constants

// Canvases mounted as effect layers
pub const LAYER_SELECTOR: &str = "canvas.fx-layer";
pub const LAYER_NAME_PREFIX: &str = "layer";
pub const MAX_LAYERS: usize = 8;

// Gooey filter blur when `data-gooey` is present without a value (trail cells)
pub const DEFAULT_GOOEY_SIGMA: f32 = 2.0;

// 1x1 stand-ins bound until an asset arrives
pub const PLACEHOLDER_TRANSPARENT: [u8; 4] = [0, 0, 0, 0];
pub const PLACEHOLDER_FLAT_DEPTH: [u8; 4] = [0, 0, 0, 255];

// Frames between "[frame]" debug summaries
pub const FRAME_LOG_INTERVAL: u64 = 600;
