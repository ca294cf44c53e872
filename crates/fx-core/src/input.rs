use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;

/// Latest real pointer sample, in both pointer spaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSignal {
    pub ndc: Vec2,
    pub uv: Vec2,
    pub timestamp_ms: f64,
}

/// Capability handed to the frame driver: "where is the pointer now".
/// Owned by whoever composes the layers, shared by all of them.
pub trait PointerSource {
    fn latest(&self) -> Option<PointerSignal>;
}

/// Single-threaded last-write-wins pointer slot. The event listener
/// publishes into it, the frame loop reads it; intermediate samples between
/// two frames are dropped.
#[derive(Clone, Default)]
pub struct SharedPointer(Rc<RefCell<Option<PointerSignal>>>);

impl SharedPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, signal: PointerSignal) {
        *self.0.borrow_mut() = Some(signal);
    }

    pub fn clear(&self) {
        *self.0.borrow_mut() = None;
    }
}

impl PointerSource for SharedPointer {
    fn latest(&self) -> Option<PointerSignal> {
        *self.0.borrow()
    }
}

impl<T: PointerSource + ?Sized> PointerSource for &T {
    fn latest(&self) -> Option<PointerSignal> {
        (**self).latest()
    }
}
