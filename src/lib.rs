pub mod constants;
pub mod core;

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod frame;
#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod render;
#[cfg(target_arch = "wasm32")]
mod timers;

#[cfg(target_arch = "wasm32")]
pub use web_api::*;

#[cfg(target_arch = "wasm32")]
mod web_api {
    use crate::core::{SceneConfig, SceneError};
    use crate::dom;
    use crate::host::{self, SceneShared};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    const AUTO_CANVAS_ID: &str = "hero-canvas";

    thread_local! {
        static AUTO_SCENE: RefCell<Option<HeroScene>> = const { RefCell::new(None) };
    }

    /// Handle the host page keeps for one mounted scene.
    ///
    /// Every method is safe to call on an inert handle (canvas missing) and
    /// after `unmount`; they simply report a disabled scene.
    #[wasm_bindgen]
    pub struct HeroScene {
        shared: Option<Rc<SceneShared>>,
    }

    #[wasm_bindgen]
    impl HeroScene {
        #[wasm_bindgen(constructor)]
        pub fn new(canvas_id: &str, config_json: Option<String>) -> HeroScene {
            let shared = dom::window_document()
                .and_then(|doc| dom::canvas_by_id(&doc, canvas_id))
                .map(|canvas| {
                    let config = resolve_config(config_json.as_deref(), &canvas);
                    host::mount(canvas, config)
                });
            if shared.is_none() {
                let err = SceneError::MissingElement(canvas_id.to_string());
                log::warn!("[scene] {}; scene stays inert", err);
            }
            HeroScene { shared }
        }

        pub fn set_in_hero(&self, in_hero: bool) {
            if let Some(s) = &self.shared {
                s.set_in_hero(in_hero);
            }
        }

        pub fn set_scroll_progress(&self, progress: f32) {
            if let Some(s) = &self.shared {
                s.set_scroll_progress(progress);
            }
        }

        pub fn should_render(&self) -> bool {
            self.shared.as_ref().is_some_and(|s| s.status().should_render)
        }

        pub fn quality_tier(&self) -> String {
            self.shared
                .as_ref()
                .map_or("disabled", |s| s.status().state.as_str())
                .to_string()
        }

        pub fn rotation_multiplier(&self) -> f32 {
            self.params().map_or(0.0, |p| p.rotation_multiplier)
        }

        pub fn resolution_scale(&self) -> f32 {
            self.params().map_or(0.0, |p| p.resolution_scale)
        }

        pub fn antialiasing(&self) -> bool {
            self.params().is_some_and(|p| p.antialiasing)
        }

        pub fn post_processing(&self) -> bool {
            self.params().is_some_and(|p| p.post_processing)
        }

        pub fn unmount(&mut self) {
            if let Some(s) = self.shared.take() {
                s.unmount();
            }
        }
    }

    impl HeroScene {
        fn params(&self) -> Option<crate::core::RenderParams> {
            self.shared.as_ref().and_then(|s| s.status().params)
        }
    }

    impl Drop for HeroScene {
        fn drop(&mut self) {
            self.unmount();
        }
    }

    fn resolve_config(
        explicit: Option<&str>,
        canvas: &web_sys::HtmlCanvasElement,
    ) -> SceneConfig {
        let json = explicit
            .map(str::to_owned)
            .or_else(|| canvas.get_attribute("data-scene-config"));
        match json {
            Some(json) => SceneConfig::from_json(&json).unwrap_or_else(|e| {
                log::warn!("[config] {}; using defaults", SceneError::from(e));
                SceneConfig::default()
            }),
            None => SceneConfig::default(),
        }
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("hero-scene starting");

        let has_canvas = dom::window_document()
            .and_then(|doc| doc.get_element_by_id(AUTO_CANVAS_ID))
            .is_some();
        if has_canvas {
            let scene = HeroScene::new(AUTO_CANVAS_ID, None);
            AUTO_SCENE.with(|slot| *slot.borrow_mut() = Some(scene));
        }
        Ok(())
    }
}
