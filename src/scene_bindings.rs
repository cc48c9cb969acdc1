//! JavaScript interop for the three.js scene and the Lenis smooth-scroll engine.
//! Provides Rust bindings to helper functions defined in scene_helpers.js.

use crate::BackdropError;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

#[wasm_bindgen(module = "/scene_helpers.js")]
extern "C" {
    #[wasm_bindgen(js_name = mountScene, catch)]
    fn mount_scene_js(canvas: &HtmlCanvasElement) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = applySceneFrame, catch)]
    fn apply_scene_frame_js(frame: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = disposeScene)]
    fn dispose_scene_js();

    #[wasm_bindgen(js_name = startSmoothScroll, catch)]
    fn start_smooth_scroll_js(on_scroll: &js_sys::Function) -> Result<(), JsValue>;

    #[wasm_bindgen(js_name = stopSmoothScroll)]
    fn stop_smooth_scroll_js();
}

/// Create the renderer, camera and static lights on `canvas`.
pub fn mount_scene(canvas: &HtmlCanvasElement) -> Result<(), BackdropError> {
    mount_scene_js(canvas).map_err(BackdropError::from)
}

/// Push one serialized [`crate::scene::SceneFrame`] and render it.
pub fn apply_scene_frame(frame: &JsValue) -> Result<(), BackdropError> {
    apply_scene_frame_js(frame).map_err(BackdropError::from)
}

pub fn dispose_scene() {
    dispose_scene_js();
}

/// Start Lenis and call `on_scroll` for every scroll event it emits.
pub fn start_smooth_scroll(on_scroll: &js_sys::Function) -> Result<(), BackdropError> {
    start_smooth_scroll_js(on_scroll).map_err(BackdropError::from)
}

pub fn stop_smooth_scroll() {
    stop_smooth_scroll_js();
}
