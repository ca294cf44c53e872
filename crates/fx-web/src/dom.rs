use crate::constants::{LAYER_SELECTOR, MAX_LAYERS};
use crate::options;
use fx_core::{ConfigError, LayerConfig, ViewportState};
use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Effect region: the box the layer canvases fill, in CSS pixels, and the
/// device pixel ratio. All layers of a page share one region.
pub fn region_viewport(canvas: &web::HtmlCanvasElement) -> Option<ViewportState> {
    let w = web::window()?;
    let rect = canvas.get_bounding_client_rect();
    Some(ViewportState::new(
        rect.width() as f32,
        rect.height() as f32,
        w.device_pixel_ratio() as f32,
    ))
}

/// Top-left corner of the region in client coordinates.
pub fn region_origin(canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(rect.left() as f32, rect.top() as f32)
}

pub fn layer_canvases(document: &web::Document) -> Vec<web::HtmlCanvasElement> {
    let Ok(nodes) = document.query_selector_all(LAYER_SELECTOR) else {
        return Vec::new();
    };
    let mut canvases = Vec::new();
    for i in 0..nodes.length() {
        if let Some(canvas) = nodes
            .get(i)
            .and_then(|n| n.dyn_into::<web::HtmlCanvasElement>().ok())
        {
            canvases.push(canvas);
        }
    }
    if canvases.len() > MAX_LAYERS {
        log::warn!(
            "[dom] {} layer canvases found; mounting the first {}",
            canvases.len(),
            MAX_LAYERS
        );
        canvases.truncate(MAX_LAYERS);
    }
    canvases
}

pub fn read_layer_config(
    canvas: &web::HtmlCanvasElement,
    index: usize,
) -> Result<LayerConfig, ConfigError> {
    options::layer_config(index, |key| canvas.get_attribute(&format!("data-{key}")))
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, viewport: &ViewportState) {
    let (w_px, h_px) = viewport.backing_size();
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
}

/// Stretch the canvas over its positioned container so every layer shares
/// the same region.
pub fn fill_region(canvas: &web::HtmlCanvasElement) {
    let style = canvas.style();
    for (key, value) in [
        ("position", "absolute"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("display", "block"),
    ] {
        _ = style.set_property(key, value);
    }
}

/// Stack the canvas by z-index and let pointer events through unless it is
/// the pointer target.
pub fn apply_layer_style(canvas: &web::HtmlCanvasElement, config: &LayerConfig, is_target: bool) {
    let style = canvas.style();
    _ = style.set_property("z-index", &config.z_index.to_string());
    _ = style.set_property("pointer-events", if is_target { "auto" } else { "none" });
}
