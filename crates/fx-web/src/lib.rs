#![cfg(target_arch = "wasm32")]
mod assets;
mod constants;
mod dom;
mod events;
mod frame;
mod options;
mod render;

use events::Listener;
use frame::{Clock, Driver, FrameContext, LoopHandle};
use fx_core::{
    AssetRole, EffectConfig, FrameDriver, FxError, LayerConfig, LayerStack, SharedPointer,
};
use render::Renderer;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// Everything alive while the effects are mounted. Dropping it tears the
/// page state down.
struct Mounted {
    driver: Rc<RefCell<Driver>>,
    frame_loop: LoopHandle,
    pointer: SharedPointer,
    _listeners: Vec<Listener>,
}

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
    static PAGEHIDE_WIRED: Cell<bool> = const { Cell::new(false) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("fx-web starting");
    mount();
    Ok(())
}

/// Discover `canvas.fx-layer` elements and start drawing. Mounting again
/// replaces the previous mount.
#[wasm_bindgen]
pub fn mount() {
    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
}

/// Stop the frame loop, remove listeners and release GPU resources.
#[wasm_bindgen]
pub fn unmount() {
    let Some(mut mounted) = MOUNTED.with(|m| m.borrow_mut().take()) else {
        return;
    };
    mounted.frame_loop.stop();
    mounted.pointer.clear();
    match mounted.driver.try_borrow_mut() {
        Ok(mut d) => d.stop(),
        // the backend still goes when the last Rc does
        Err(_) => log::warn!("[mount] driver busy during unmount"),
    }
    drop(mounted);
    log::info!("[mount] unmounted");
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let mut canvases = Vec::new();
    let mut configs: Vec<LayerConfig> = Vec::new();
    for (i, canvas) in dom::layer_canvases(&document).into_iter().enumerate() {
        match dom::read_layer_config(&canvas, i) {
            Ok(config) => {
                canvases.push(canvas);
                configs.push(config);
            }
            Err(e) => log::warn!("[mount] skipping layer canvas {}: {}", i, e),
        }
    }
    let Some(region) = canvases.first().cloned() else {
        log::info!("[mount] no effect layers on this page");
        return Ok(());
    };
    for canvas in &canvases {
        dom::fill_region(canvas);
    }
    let viewport = dom::region_viewport(&region)
        .ok_or_else(|| anyhow::anyhow!("effect region size unavailable"))?;
    if viewport.is_degenerate() {
        log::warn!("[mount] effect region has no size yet; waiting for a resize");
    }
    for canvas in &canvases {
        dom::sync_canvas_backing_size(canvas, &viewport);
    }

    let renderer = match Renderer::new(&canvases, &configs).await {
        Ok(r) => r,
        Err(e @ FxError::UnsupportedContext(_)) => {
            log::error!("[mount] effects disabled: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let clock = Clock::new();
    let stack = LayerStack::from_configs(configs, clock.now_ms())?;
    let target = stack.pointer_target();
    for (i, (canvas, layer)) in canvases.iter().zip(stack.layers()).enumerate() {
        dom::apply_layer_style(canvas, &layer.config, target == Some(i));
    }
    let loads: Vec<(usize, AssetRole, String)> = stack
        .layers()
        .iter()
        .enumerate()
        .flat_map(|(i, layer)| {
            asset_urls(&layer.config.effect)
                .into_iter()
                .map(move |(role, url)| (i, role, url))
        })
        .collect();

    let pointer = SharedPointer::new();
    let driver = Rc::new(RefCell::new(FrameDriver::new(stack, pointer.clone(), viewport)));
    driver.borrow_mut().start(renderer, clock.now_ms());

    for (layer, role, url) in loads {
        spawn_asset_load(driver.clone(), layer, role, url);
    }

    let mut listeners = Vec::new();
    listeners.extend(events::wire_pointer(&window, region, pointer.clone(), clock));
    listeners.extend(events::wire_resize(&window, driver.clone(), canvases));
    if !PAGEHIDE_WIRED.with(|w| w.replace(true)) {
        events::wire_pagehide(&window, unmount);
    }

    let frame_ctx = Rc::new(RefCell::new(FrameContext::new(driver.clone(), clock)));
    let frame_loop = frame::start_loop(frame_ctx);

    // take the previous mount out before dropping it so its teardown never
    // runs inside the borrow
    if let Some(previous) = MOUNTED.with(|m| m.borrow_mut().take()) {
        unmount_previous(previous);
    }
    MOUNTED.with(|m| {
        *m.borrow_mut() = Some(Mounted {
            driver,
            frame_loop,
            pointer,
            _listeners: listeners,
        })
    });
    log::info!("[mount] running");
    Ok(())
}

fn unmount_previous(mut previous: Mounted) {
    previous.frame_loop.stop();
    if let Ok(mut d) = previous.driver.try_borrow_mut() {
        d.stop();
    }
    log::info!("[mount] replaced previous mount");
}

/// Assets a layer needs, by role. Empty urls are skipped; a parallax layer
/// without a depth map draws undisplaced.
fn asset_urls(effect: &EffectConfig) -> Vec<(AssetRole, String)> {
    let mut urls = Vec::new();
    match effect {
        EffectConfig::Parallax(c) => {
            urls.push((AssetRole::Source, c.source_asset.clone()));
            urls.push((AssetRole::Depth, c.depth_asset.clone()));
            if let Some(s) = &c.secondary_asset {
                urls.push((AssetRole::Secondary, s.clone()));
            }
        }
        EffectConfig::Trail(c) => {
            if let Some(s) = &c.overlay_source_asset {
                urls.push((AssetRole::Overlay, s.clone()));
            }
        }
        EffectConfig::Topo(_) => {}
    }
    urls.retain(|(_, url)| !url.trim().is_empty());
    urls
}

fn spawn_asset_load(driver: Rc<RefCell<Driver>>, layer: usize, role: AssetRole, url: String) {
    spawn_local(async move {
        let result = assets::fetch_image(&url).await;
        let Ok(mut d) = driver.try_borrow_mut() else {
            log::warn!("[assets] driver busy; dropping {} for layer {}", url, layer);
            return;
        };
        let outcome = match result {
            Ok(image) => d.asset_loaded(layer, role, image),
            Err(e) => {
                let err = FxError::AssetLoad {
                    role,
                    reason: format!("{e:#}"),
                };
                d.asset_failed(layer, role, &err.to_string())
            }
        };
        if let Err(e) = outcome {
            log::warn!("[assets] layer {} {}: {}", layer, role, e);
        }
    });
}
