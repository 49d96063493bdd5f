//! Browser listener wiring. Each handler holds only a `Weak` to the scene,
//! so a listener that outlives its scene does nothing.

use crate::core::{Event, ACTIVITY_EVENTS};
use crate::dom::Listener;
use crate::host::SceneShared;
use std::rc::Weak;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Mount-scoped listeners: resize, visibility, context loss, page unload
/// and (optionally) scroll tracking.
pub fn attach_environment(
    scene: &Weak<SceneShared>,
    canvas: &web::HtmlCanvasElement,
    track_scroll: bool,
) -> Vec<Listener> {
    let Some(window) = web::window() else {
        return Vec::new();
    };
    let mut listeners = Vec::with_capacity(5);

    let weak = scene.clone();
    listeners.extend(Listener::new(window.as_ref(), "resize", true, move |_| {
        if let Some(s) = weak.upgrade() {
            s.on_resize();
        }
    }));

    if let Some(document) = window.document() {
        let weak = scene.clone();
        let doc = document.clone();
        listeners.extend(Listener::new(
            document.as_ref(),
            "visibilitychange",
            false,
            move |_| {
                if let Some(s) = weak.upgrade() {
                    s.submit(Event::VisibilityChanged(!doc.hidden()));
                }
            },
        ));
    }

    // WebGPU reports loss through the device callback; this covers canvases
    // a page has also handed to a WebGL context
    let weak = scene.clone();
    listeners.extend(Listener::new(
        canvas.as_ref(),
        "webglcontextlost",
        false,
        move |_| {
            if let Some(s) = weak.upgrade() {
                s.submit(Event::ContextLost);
            }
        },
    ));

    let weak = scene.clone();
    listeners.extend(Listener::new(window.as_ref(), "pagehide", false, move |_| {
        if let Some(s) = weak.upgrade() {
            s.submit(Event::PageUnload);
        }
    }));

    if track_scroll {
        let weak = scene.clone();
        listeners.extend(Listener::new(window.as_ref(), "scroll", true, move |_| {
            if let Some(s) = weak.upgrade() {
                s.on_scroll();
            }
        }));
    }
    log::debug!("[scene] {} environment listeners attached", listeners.len());
    listeners
}

/// Surface-scoped activity listeners feeding the idle tracker.
pub fn attach_activity(scene: &Weak<SceneShared>) -> Vec<Listener> {
    let Some(window) = web::window() else {
        return Vec::new();
    };
    let target: &web::EventTarget = window.unchecked_ref();
    ACTIVITY_EVENTS
        .iter()
        .filter_map(|&kind| {
            let weak = scene.clone();
            Listener::new(target, kind, true, move |ev| {
                if let Some(s) = weak.upgrade() {
                    s.on_activity(&ev);
                }
            })
        })
        .collect()
}

/// Scene-lifetime `pageshow` listener. `pagehide` unmounts; a page restored
/// from the back/forward cache mounts again.
pub fn attach_page_restore(scene: &Weak<SceneShared>) -> Option<Listener> {
    let window = web::window()?;
    let weak = scene.clone();
    Listener::new(window.as_ref(), "pageshow", false, move |ev| {
        let persisted = ev
            .dyn_ref::<web::PageTransitionEvent>()
            .is_some_and(|e| e.persisted());
        if !persisted {
            return;
        }
        if let Some(s) = weak.upgrade() {
            s.on_page_restore();
        }
    })
}
