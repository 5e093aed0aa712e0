use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::window;

use super::microphone::{AnalyserSettings, MicrophoneAnalyser};
use super::stage::Stage;
use crate::audio::CaptureSession;
use crate::render_loop::{LoopControl, LoopState, RenderLoop};
use crate::viz::SurfaceSlot;

/// Drives a [`RenderLoop`] from `requestAnimationFrame`.
///
/// Owns the frame callback, the pending frame handle and the window resize
/// listener. Callbacks only hold weak references, so dropping the driver
/// tears everything down.
pub struct Driver {
    inner: Rc<Inner>,
}

struct Inner {
    render_loop: RefCell<RenderLoop>,
    stage: SurfaceSlot<Stage>,
    settings: AnalyserSettings,
    frame_callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    pending_frame: Cell<Option<i32>>,
    resize_listener: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Driver {
    pub fn new(
        render_loop: RenderLoop,
        stage: SurfaceSlot<Stage>,
        settings: AnalyserSettings,
    ) -> Result<Self, JsValue> {
        let inner = Rc::new(Inner {
            render_loop: RefCell::new(render_loop),
            stage,
            settings,
            frame_callback: RefCell::new(None),
            pending_frame: Cell::new(None),
            resize_listener: RefCell::new(None),
        });

        // The frame closure reschedules itself through `inner.frame_callback`,
        // so it is created first and stored where it can find itself.
        let weak = Rc::downgrade(&inner);
        *inner.frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            if let Some(inner) = weak.upgrade() {
                inner.on_frame(timestamp);
            }
        }) as Box<dyn FnMut(f64)>));

        // Resize the drawing buffer with the window
        let weak: Weak<Inner> = Rc::downgrade(&inner);
        let listener = Closure::wrap(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.sync_size();
            }
        }) as Box<dyn FnMut()>);
        window()
            .ok_or("no window")?
            .add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())?;
        *inner.resize_listener.borrow_mut() = Some(listener);

        inner.sync_size();
        Ok(Self { inner })
    }

    pub fn render_loop(&self) -> std::cell::Ref<'_, RenderLoop> {
        self.inner.render_loop.borrow()
    }

    /// Requests the microphone; the loop starts once access is granted.
    pub fn start(&self) {
        let Some(ticket) = self.inner.render_loop.borrow_mut().begin_start() else {
            return;
        };
        let weak = Rc::downgrade(&self.inner);
        spawn_local(async move {
            let Some(settings) = weak.upgrade().map(|inner| inner.settings.clone()) else {
                return;
            };
            let session = MicrophoneAnalyser::acquire(&settings)
                .await
                .map(|analyser| CaptureSession::new(Box::new(analyser)));

            match weak.upgrade() {
                Some(inner) => {
                    inner.sync_size();
                    inner.render_loop.borrow_mut().complete_start(ticket, session);
                    inner.schedule();
                }
                // Driver gone while waiting: dropping the session releases it.
                None => drop(session),
            }
        });
    }

    pub fn stop(&self) {
        self.inner.cancel_frame();
        self.inner.render_loop.borrow_mut().stop();
    }

    pub fn switch_visualization(&self, id: &str) {
        self.inner.render_loop.borrow_mut().switch_visualization(id);
    }

    pub fn resize(&self) {
        self.inner.sync_size();
    }
}

impl Inner {
    fn on_frame(&self, timestamp: f64) {
        self.pending_frame.set(None);
        let control = self.render_loop.borrow_mut().tick(timestamp);
        if control == LoopControl::Continue {
            self.schedule();
        }
    }

    fn schedule(&self) {
        if self.pending_frame.get().is_some()
            || self.render_loop.borrow().state() != LoopState::Active
        {
            return;
        }
        let Some(window) = window() else {
            return;
        };
        let callback = self.frame_callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => self.pending_frame.set(Some(handle)),
            Err(e) => warn!("requestAnimationFrame failed: {e:?}"),
        }
    }

    fn cancel_frame(&self) {
        if let Some(handle) = self.pending_frame.take() {
            if let Some(window) = window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }

    fn sync_size(&self) {
        let (width, height) = self.stage.peek().client_size();
        let ratio = window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let mut render_loop = self.render_loop.borrow_mut();
        render_loop.resize_coordinator_mut().set_pixel_ratio(ratio);
        let viewport = render_loop.resize(width, height);
        debug!("stage synced to {}x{}", viewport.width, viewport.height);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel_frame();
        self.render_loop.get_mut().stop();
        if let (Some(window), Some(listener)) = (window(), self.resize_listener.get_mut().take()) {
            let _ = window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref());
        }
    }
}
