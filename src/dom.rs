use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn canvas_by_id(document: &web::Document, id: &str) -> Option<web::HtmlCanvasElement> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok())
}

/// An event listener that unregisters itself when dropped.
///
/// Every registration made by the scene goes through this type, so each
/// `addEventListener` is paired with exactly one `removeEventListener`.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &opts,
            )
            .map_err(|e| log::warn!("[scene] addEventListener({}) failed: {:?}", kind, e))
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

/// Size the canvas backing store to CSS size times `pixel_ratio`.
/// Returns the new backing size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, pixel_ratio: f32) -> (u32, u32) {
    let rect = canvas.get_bounding_client_rect();
    let w_px = ((rect.width() as f32 * pixel_ratio) as u32).max(1);
    let h_px = ((rect.height() as f32 * pixel_ratio) as u32).max(1);
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
    (w_px, h_px)
}

const IN_HERO_CLASS: &str = "hero-scene--in-hero";
const PAGE_CLASS: &str = "hero-scene--page";

/// Positioning hooks for the page stylesheet; the scene itself ignores them.
pub fn set_layout_classes(canvas: &web::HtmlCanvasElement, in_hero: bool) {
    let target: web::Element = match canvas.parent_element() {
        Some(parent) => parent,
        None => canvas.clone().into(),
    };
    let cl = target.class_list();
    _ = cl.toggle_with_force(IN_HERO_CLASS, in_hero);
    _ = cl.toggle_with_force(PAGE_CLASS, !in_hero);
}

/// Pointer position in normalised device coordinates of the viewport,
/// y up, matching the camera's parallax convention.
pub fn pointer_ndc(ev: &web::Event) -> Option<glam::Vec2> {
    let ev = ev.dyn_ref::<web::MouseEvent>()?;
    let window = web::window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let x = (ev.client_x() as f64 / w) * 2.0 - 1.0;
    let y = 1.0 - (ev.client_y() as f64 / h) * 2.0;
    Some(glam::Vec2::new(x as f32, y as f32))
}
