use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A `setTimeout`/`setInterval` registration, cleared on drop.
///
/// Dropping the handle is the only way the scene cancels a timer, so no
/// callback can fire after its owner has gone.
pub struct Timer {
    handle: i32,
    repeat: bool,
    _closure: Closure<dyn FnMut()>,
}

impl Timer {
    pub fn start(delay_ms: u64, repeat: bool, callback: impl FnMut() + 'static) -> Option<Self> {
        let window = web::window()?;
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        let delay = delay_ms.min(i32::MAX as u64) as i32;
        let registered = if repeat {
            window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay,
            )
        } else {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay,
            )
        };
        match registered {
            Ok(handle) => Some(Self {
                handle,
                repeat,
                _closure: closure,
            }),
            Err(e) => {
                log::warn!("[scene] timer registration failed: {:?}", e);
                None
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(window) = web::window() {
            if self.repeat {
                window.clear_interval_with_handle(self.handle);
            } else {
                window.clear_timeout_with_handle(self.handle);
            }
        }
    }
}
