//! Browser implementations of the pipeline's host traits.

use crate::debounce::Scheduler;
use crate::frame_loop::{FrameHost, FrameLoop};
use crate::scene::{SceneFrame, SceneSink};
use crate::scene_bindings::{apply_scene_frame, start_smooth_scroll, stop_smooth_scroll};
use crate::scroll::{ScrollSource, ScrollSubscription};
use crate::signals::SignalProvider;
use crate::BackdropError;
use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, Performance, Window};

fn js_number(target: &JsValue, key: &str) -> Option<f64> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
        .ok()?
        .as_f64()
}

/// Reads the four classification signals from `window` and `navigator`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSignals;

impl SignalProvider for BrowserSignals {
    fn sample_viewport_width(&self) -> Option<f64> {
        web_sys::window()?.inner_width().ok()?.as_f64()
    }

    fn sample_core_count(&self) -> Option<u32> {
        let cores = web_sys::window()?.navigator().hardware_concurrency();
        (cores >= 1.0).then_some(cores as u32)
    }

    fn sample_device_pixel_ratio(&self) -> Option<f64> {
        web_sys::window().map(|w| w.device_pixel_ratio())
    }

    // Not part of web-sys; only Chromium reports it.
    fn sample_device_memory(&self) -> Option<f64> {
        let navigator: JsValue = web_sys::window()?.navigator().into();
        js_number(&navigator, "deviceMemory")
    }
}

/// Current viewport size in CSS pixels, `(width, height)`.
pub fn viewport_size(window: &Window) -> (f64, f64) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (width, height)
}

/// Look up the backdrop canvas by element id.
pub fn find_canvas(id: &str) -> Result<HtmlCanvasElement, BackdropError> {
    let document = web_sys::window()
        .ok_or(BackdropError::NoWindow)?
        .document()
        .ok_or(BackdropError::NoDocument)?;
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| BackdropError::MissingElement(id.to_string()))
}

/// Used JS heap in MB, where `performance.memory` exists.
pub fn heap_used_mb() -> Option<u32> {
    let performance: JsValue = web_sys::window()?.performance()?.into();
    let memory = js_sys::Reflect::get(&performance, &JsValue::from_str("memory")).ok()?;
    if memory.is_undefined() {
        return None;
    }
    let used = js_number(&memory, "usedJSHeapSize")?;
    Some((used / 1_048_576.0).round() as u32)
}

/// `setTimeout`-backed scheduler with a `performance.now()` clock.
#[derive(Debug, Clone)]
pub struct TimeoutScheduler {
    performance: Option<Performance>,
}

impl TimeoutScheduler {
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|w| w.performance());
        if performance.is_none() {
            warn!("performance.now() unavailable, scroll timestamps will read 0");
        }
        Self { performance }
    }
}

impl Default for TimeoutScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn now_ms(&self) -> f64 {
        self.performance.as_ref().map(|p| p.now()).unwrap_or(0.0)
    }

    fn schedule(&self, delay_ms: u32, action: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, action)
    }
}

/// Event listener on `window`, removed when dropped.
pub struct WindowListener {
    window: Window,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl WindowListener {
    pub fn new(
        window: &Window,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, BackdropError> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            window: window.clone(),
            event,
            callback,
        })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Native `scroll` events, used when the smooth-scroll engine cannot start.
#[derive(Debug, Clone)]
pub struct WindowScroll {
    window: Window,
}

impl WindowScroll {
    pub fn new(window: &Window) -> Self {
        Self {
            window: window.clone(),
        }
    }
}

impl ScrollSource for WindowScroll {
    fn subscribe(&self, mut listener: Box<dyn FnMut()>) -> Result<ScrollSubscription, BackdropError> {
        let guard = WindowListener::new(&self.window, "scroll", move |_| listener())?;
        Ok(ScrollSubscription::new(guard))
    }
}

/// Scroll events from the Lenis engine started by `scene_helpers.js`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmoothScroll;

struct SmoothScrollGuard {
    _callback: Closure<dyn FnMut()>,
}

impl Drop for SmoothScrollGuard {
    fn drop(&mut self) {
        stop_smooth_scroll();
    }
}

impl ScrollSource for SmoothScroll {
    fn subscribe(&self, listener: Box<dyn FnMut()>) -> Result<ScrollSubscription, BackdropError> {
        let callback = Closure::wrap(listener);
        start_smooth_scroll(callback.as_ref().unchecked_ref())?;
        Ok(ScrollSubscription::new(SmoothScrollGuard {
            _callback: callback,
        }))
    }
}

/// Serializes frames and hands them to the JS scene.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsSceneSink;

impl SceneSink for JsSceneSink {
    fn draw(&mut self, frame: &SceneFrame) -> Result<(), BackdropError> {
        let value = serde_wasm_bindgen::to_value(frame)?;
        apply_scene_frame(&value)
    }
}

/// `requestAnimationFrame` on the page window.
#[derive(Debug, Clone)]
pub struct RafHost {
    window: Window,
}

impl RafHost {
    pub fn new() -> Result<Self, BackdropError> {
        let window = web_sys::window().ok_or(BackdropError::NoWindow)?;
        Ok(Self { window })
    }
}

impl FrameHost for RafHost {
    type Callback = Closure<dyn FnMut(f64)>;

    fn wrap(&self, tick: Box<dyn FnMut(f64)>) -> Self::Callback {
        Closure::wrap(tick)
    }

    fn request(&self, callback: &Self::Callback) -> Result<i32, BackdropError> {
        Ok(self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())?)
    }

    fn cancel(&self, id: i32) {
        let _ = self.window.cancel_animation_frame(id);
    }
}

/// The browser frame loop.
pub type AnimationLoop = FrameLoop<RafHost>;
