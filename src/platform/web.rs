//! Browser adapters: `requestAnimationFrame` scheduling and DOM measurement

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use super::{FrameHandle, FrameScheduler, PlayfieldSource};
use crate::sim::Playfield;

type FrameCallback = Rc<RefCell<Option<Box<dyn FnMut(FrameHandle)>>>>;

/// Schedules frames with `requestAnimationFrame`.
///
/// The frame callback is installed after the game loop that owns this
/// scheduler has been built, see `set_callback`.
#[derive(Clone, Default)]
pub struct RafScheduler {
    callback: FrameCallback,
}

impl RafScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the function every fired frame is routed to
    pub fn set_callback(&self, callback: impl FnMut(FrameHandle) + 'static) {
        *self.callback.borrow_mut() = Some(Box::new(callback));
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let Some(window) = web_sys::window() else {
            log::error!("No window; cannot schedule frame");
            return FrameHandle(0);
        };

        // The handle is only known after the request, so the closure reads it back
        let handle_slot = Rc::new(RefCell::new(FrameHandle(0)));
        let callback = self.callback.clone();
        let slot = handle_slot.clone();
        let closure = Closure::once(move |_time: f64| {
            let handle = *slot.borrow();
            if let Some(f) = callback.borrow_mut().as_mut() {
                f(handle);
            }
        });

        let handle = match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => FrameHandle(id as u32),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {:?}", e);
                FrameHandle(0)
            }
        };
        *handle_slot.borrow_mut() = handle;
        closure.forget();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0 as i32);
        }
    }
}

/// Measures a DOM element's client rect
pub struct ElementPlayfield {
    element: Element,
}

impl ElementPlayfield {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl PlayfieldSource for ElementPlayfield {
    fn measure(&self) -> Playfield {
        let rect = self.element.get_bounding_client_rect();
        Playfield::new(rect.width() as f32, rect.height() as f32)
    }
}
