use crate::dom;
use crate::frame::{Clock, Driver};
use fx_core::{PointerSignal, SharedPointer};
use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A registered DOM listener; removed again when dropped.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Window-level pointer tracking shared by every layer, mapped into the
/// effect region measured from `region`. The handler only publishes; the
/// frame loop consumes the latest sample.
pub fn wire_pointer(
    window: &web::Window,
    region: web::HtmlCanvasElement,
    pointer: SharedPointer,
    clock: Clock,
) -> Option<Listener> {
    Listener::new(window, "pointermove", move |ev: web::Event| {
        let Ok(ev) = ev.dyn_into::<web::PointerEvent>() else {
            return;
        };
        let Some(vp) = dom::region_viewport(&region) else {
            return;
        };
        let client = Vec2::new(ev.client_x() as f32, ev.client_y() as f32);
        // outside the region or degenerate: keep the last sample
        if let Some((ndc, uv)) = vp.region_pointer(dom::region_origin(&region), client) {
            pointer.publish(PointerSignal {
                ndc,
                uv,
                timestamp_ms: clock.now_ms(),
            });
        }
    })
}

pub fn wire_resize(
    window: &web::Window,
    driver: Rc<RefCell<Driver>>,
    canvases: Vec<web::HtmlCanvasElement>,
) -> Option<Listener> {
    Listener::new(window, "resize", move |_ev: web::Event| {
        let Some(vp) = canvases.first().and_then(dom::region_viewport) else {
            return;
        };
        for canvas in &canvases {
            dom::sync_canvas_backing_size(canvas, &vp);
        }
        match driver.try_borrow_mut() {
            Ok(mut d) => d.set_viewport(vp),
            Err(_) => log::warn!("[events] resize during a frame; dropped"),
        }
        log::debug!("[events] region {}x{} @{}", vp.width, vp.height, vp.device_pixel_ratio);
    })
}

/// Registered for the lifetime of the page: the handler unmounts, which
/// drops the other listeners, so it cannot be one of them.
pub fn wire_pagehide(window: &web::Window, mut on_hide: impl FnMut() + 'static) {
    let closure = Closure::wrap(Box::new(move || on_hide()) as Box<dyn FnMut()>);
    _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
    closure.forget();
}
