use crate::core::{EnvironmentProbe, ScrollMetrics};
use web_sys as web;

/// [`EnvironmentProbe`] backed by `window`, `navigator` and `document`.
///
/// Every read degrades to a conservative value when the API is missing:
/// zero width (mobile-classed), unknown cores (low-end), hidden tab.
#[derive(Clone, Default)]
pub struct BrowserProbe;

impl EnvironmentProbe for BrowserProbe {
    fn viewport_width(&self) -> u32 {
        web::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|v| v.as_f64())
            .filter(|w| w.is_finite() && *w > 0.0)
            .map_or(0, |w| w as u32)
    }

    fn hardware_concurrency(&self) -> Option<u32> {
        let cores = web::window()?.navigator().hardware_concurrency();
        (cores.is_finite() && cores >= 1.0).then_some(cores as u32)
    }

    fn is_visible(&self) -> bool {
        web::window()
            .and_then(|w| w.document())
            .is_some_and(|d| !d.hidden())
    }

    fn now_ms(&self) -> f64 {
        web::window()
            .and_then(|w| w.performance())
            .map_or_else(js_sys::Date::now, |p| p.now())
    }

    fn device_pixel_ratio(&self) -> f64 {
        web::window().map_or(1.0, |w| w.device_pixel_ratio())
    }
}

/// Measure the page for scroll tracking. `None` until the hero element is
/// attached; callers skip the update and wait for the next event.
pub fn scroll_metrics(hero_element_id: &str) -> Option<ScrollMetrics> {
    let window = web::window()?;
    let document = window.document()?;
    let hero = document.get_element_by_id(hero_element_id)?;
    let body = document.body()?;
    Some(ScrollMetrics {
        scroll_top: window.scroll_y().unwrap_or(0.0),
        document_height: body.scroll_height() as f64,
        viewport_height: window.inner_height().ok()?.as_f64()?,
        hero_height: hero.get_bounding_client_rect().height(),
    })
}
