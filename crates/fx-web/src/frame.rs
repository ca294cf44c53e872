use crate::constants::FRAME_LOG_INTERVAL;
use crate::render::Renderer;
use fx_core::{FrameDriver, SharedPointer, SkipReason, TickOutcome};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type Driver = FrameDriver<Renderer, SharedPointer>;

/// Monotonic milliseconds since mount; pointer timestamps and frame ticks
/// share it.
#[derive(Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

pub struct FrameContext {
    pub driver: Rc<RefCell<Driver>>,
    pub clock: Clock,
    drawn: u64,
    skipped: u64,
    last_skip: Option<SkipReason>,
}

impl FrameContext {
    pub fn new(driver: Rc<RefCell<Driver>>, clock: Clock) -> Self {
        Self {
            driver,
            clock,
            drawn: 0,
            skipped: 0,
            last_skip: None,
        }
    }

    pub fn frame(&mut self) {
        let now = self.clock.now_ms();
        let Ok(mut driver) = self.driver.try_borrow_mut() else {
            return;
        };
        match driver.tick(now) {
            TickOutcome::Drawn => {
                self.drawn += 1;
                self.last_skip = None;
            }
            TickOutcome::Skipped(reason) => {
                self.skipped += 1;
                if self.last_skip != Some(reason) {
                    log::debug!("[frame] skipping frames: {:?}", reason);
                    self.last_skip = Some(reason);
                }
            }
        }
        if (self.drawn + self.skipped) % FRAME_LOG_INTERVAL == 0 {
            log::debug!("[frame] drawn={} skipped={}", self.drawn, self.skipped);
        }
    }
}

/// Owner of the requestAnimationFrame chain. Stopping cancels the pending
/// callback and drops the closure.
pub struct LoopHandle {
    tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl LoopHandle {
    pub fn stop(&mut self) {
        if let Some(id) = self.pending.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        if self.tick.borrow_mut().take().is_some() {
            log::info!("[frame] loop stopped");
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(
    tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    pending: &Rc<Cell<Option<i32>>>,
) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        pending.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) -> LoopHandle {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let tick_clone = tick.clone();
    let pending_clone = pending.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        pending_clone.set(None);
        frame_ctx.borrow_mut().frame();
        request_frame(&tick_clone, &pending_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick, &pending);
    LoopHandle { tick, pending }
}
