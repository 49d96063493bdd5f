use crate::core::{FrameInput, RenderParams, RenderThrottle, SceneInputs, ScrollStyle};
use crate::render::{self, GpuSurface};
use glam::Vec2;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    pub delta_sec: f32,
    pub elapsed_sec: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    ContextLost,
}

/// Per-surface animation state; lives and dies with the surface.
pub struct FrameState {
    throttle: RenderThrottle,
    style: ScrollStyle,
}

impl FrameState {
    pub fn new(inputs: &SceneInputs) -> Self {
        Self {
            throttle: RenderThrottle::new(),
            style: ScrollStyle {
                scale: inputs.scale(),
                tint: inputs.tint(),
            },
        }
    }

    pub fn frame(
        &mut self,
        surface: &mut GpuSurface,
        clock: FrameClock,
        params: &RenderParams,
        inputs: &SceneInputs,
        pointer: Vec2,
    ) -> FrameOutcome {
        if surface.is_context_lost() {
            return FrameOutcome::ContextLost;
        }
        let plan = self.throttle.plan(
            FrameInput {
                delta_sec: clock.delta_sec,
                elapsed_sec: clock.elapsed_sec,
                pointer,
            },
            params,
            inputs,
        );
        if let Some(style) = plan.style {
            self.style = style;
        }
        match render::render_frame(
            surface,
            &plan,
            self.throttle.rotation(),
            self.style.scale,
            self.style.tint,
        ) {
            Ok(()) => FrameOutcome::Continue,
            Err(wgpu::SurfaceError::OutOfMemory) => FrameOutcome::ContextLost,
            Err(e) => {
                // skipped; the next frame or resize reconfigures
                log::debug!("[frame] skipped: {:?}", e);
                FrameOutcome::Continue
            }
        }
    }
}

/// `requestAnimationFrame` loop that can be stopped from anywhere,
/// including from inside its own callback.
pub struct RenderLoop {
    running: Rc<Cell<bool>>,
    handle: Rc<Cell<Option<i32>>>,
    tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl RenderLoop {
    /// `on_frame` returns `false` to stop the loop.
    pub fn start(mut on_frame: impl FnMut(FrameClock) -> bool + 'static) -> Self {
        let running = Rc::new(Cell::new(true));
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

        let running_tick = running.clone();
        let handle_tick = handle.clone();
        let tick_clone = tick.clone();
        let started = Instant::now();
        let mut last = started;
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            handle_tick.set(None);
            if !running_tick.get() {
                return;
            }
            let now = Instant::now();
            let clock = FrameClock {
                delta_sec: (now - last).as_secs_f32(),
                elapsed_sec: (now - started).as_secs_f32(),
            };
            last = now;
            if !on_frame(clock) {
                running_tick.set(false);
            }
            // on_frame may have stopped us
            if !running_tick.get() {
                return;
            }
            if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
                handle_tick.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
            }
        }) as Box<dyn FnMut()>));

        if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
            handle.set(w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
        }
        log::debug!("[frame] loop started");
        Self {
            running,
            handle,
            tick,
        }
    }

    pub fn stop(&self) {
        if !self.running.replace(false) && self.tick.borrow().is_none() {
            return;
        }
        if let (Some(id), Some(w)) = (self.handle.take(), web::window()) {
            _ = w.cancel_animation_frame(id);
        }
        // breaks the closure's self-reference; wasm-bindgen defers the free
        // when this runs inside the callback itself
        let closure = self.tick.borrow_mut().take();
        drop(closure);
        log::debug!("[frame] loop stopped");
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
