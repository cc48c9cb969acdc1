//! Composition root: wires the pipeline into a live page and tears it down.

use crate::debounce::{DebounceKey, TrailingDebounce};
use crate::frame_loop::{FrameHost, FrameLoop};
use crate::monitor::{FpsMeter, FpsReading};
use crate::perf::PerfSignalSampler;
use crate::platform::{
    heap_used_mb, viewport_size, AnimationLoop, BrowserSignals, JsSceneSink, RafHost,
    SmoothScroll, TimeoutScheduler, WindowListener, WindowScroll,
};
use crate::scene::{FrameConsumer, HostInput, SceneComposer};
use crate::scene_bindings::{dispose_scene, mount_scene};
use crate::scroll::ScrollActivityTracker;
use crate::state::BackdropState;
use crate::BackdropError;
use log::{info, warn};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent};

type BrowserSampler = PerfSignalSampler<BrowserSignals, TimeoutScheduler>;

/// A mounted backdrop. Dropping it cancels every timer, listener and frame
/// callback it registered.
pub struct Backdrop {
    debounce: Rc<TrailingDebounce<DebounceKey, TimeoutScheduler>>,
    sampler: Rc<BrowserSampler>,
    tracker: ScrollActivityTracker<TimeoutScheduler>,
    listeners: Vec<WindowListener>,
    frame_loop: Option<AnimationLoop>,
    // Declared last: the scene is released after everything that draws into it.
    _scene: SceneGuard<fn()>,
}

/// Releases a mounted scene when dropped.
struct SceneGuard<F: FnMut()> {
    dispose: F,
}

impl<F: FnMut()> SceneGuard<F> {
    fn new(dispose: F) -> Self {
        Self { dispose }
    }
}

impl<F: FnMut()> Drop for SceneGuard<F> {
    fn drop(&mut self) {
        (self.dispose)();
    }
}

/// Start the frame loop for a mounted scene. On failure the guard is dropped,
/// which releases the scene.
fn start_scene_loop<H, F>(
    scene: SceneGuard<F>,
    host: H,
    consumers: Vec<Box<dyn FrameConsumer>>,
) -> Result<(FrameLoop<H>, SceneGuard<F>), BackdropError>
where
    H: FrameHost + 'static,
    H::Callback: 'static,
    F: FnMut(),
{
    let frame_loop = FrameLoop::start(host, consumers)?;
    Ok((frame_loop, scene))
}

impl Backdrop {
    /// Mount onto `canvas`. With `on_fps`, a frame-rate meter rides along in the frame loop.
    pub fn mount(
        state: Rc<BackdropState>,
        canvas: &HtmlCanvasElement,
        on_fps: Option<Box<dyn FnMut(FpsReading)>>,
    ) -> Result<Self, BackdropError> {
        let window = web_sys::window().ok_or(BackdropError::NoWindow)?;
        let debounce = Rc::new(TrailingDebounce::new(TimeoutScheduler::new()));
        let sampler = Rc::new(PerfSignalSampler::new(
            BrowserSignals,
            state.clone(),
            debounce.clone(),
        ));

        let input = HostInput::new();
        let (width, height) = viewport_size(&window);
        input.set_viewport(width, height, window.device_pixel_ratio());

        let mut listeners = Vec::with_capacity(2);
        {
            let sampler = sampler.clone();
            let input = input.clone();
            let win = window.clone();
            listeners.push(WindowListener::new(&window, "resize", move |_| {
                let (width, height) = viewport_size(&win);
                input.set_viewport(width, height, win.device_pixel_ratio());
                sampler.on_resize();
            })?);
        }
        {
            let input = input.clone();
            let win = window.clone();
            listeners.push(WindowListener::new(&window, "mousemove", move |event| {
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    let (width, height) = viewport_size(&win);
                    input.set_pointer_px(
                        f64::from(mouse.client_x()),
                        f64::from(mouse.client_y()),
                        width,
                        height,
                    );
                }
            })?);
        }

        let tracker = ScrollActivityTracker::new(state.clone(), debounce.clone());
        if let Err(e) = tracker.attach(&SmoothScroll) {
            warn!("smooth scroll unavailable ({}), tracking native scroll", e);
            tracker.attach(&WindowScroll::new(&window))?;
        }

        mount_scene(canvas)?;
        let scene = SceneGuard::new(dispose_scene as fn());

        let mut consumers: Vec<Box<dyn FrameConsumer>> = vec![Box::new(SceneComposer::new(
            state.clone(),
            input,
            JsSceneSink,
        ))];
        if let Some(on_fps) = on_fps {
            consumers.push(Box::new(FpsMeter::new(on_fps).with_heap_probe(heap_used_mb)));
        }
        let (frame_loop, scene) = start_scene_loop(scene, RafHost::new()?, consumers)?;

        info!(
            "backdrop mounted ({} performance, {} tier)",
            state.performance_class(),
            state.quality().tier
        );
        Ok(Self {
            debounce,
            sampler,
            tracker,
            listeners,
            frame_loop: Some(frame_loop),
            _scene: scene,
        })
    }

    /// Developer toggle: forcing on pins the scene to the low tier.
    pub fn set_manual_override(&self, on: bool) {
        self.sampler.set_manual_override(on);
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.frame_loop.take();
        self.tracker.teardown();
        self.sampler.teardown();
        self.listeners.clear();
        self.debounce.cancel_all();
        info!("backdrop torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualFrames;
    use std::cell::Cell;

    fn counting_guard() -> (Rc<Cell<u32>>, SceneGuard<impl FnMut()>) {
        let disposed = Rc::new(Cell::new(0));
        let count = disposed.clone();
        (disposed, SceneGuard::new(move || count.set(count.get() + 1)))
    }

    #[test]
    fn failed_frame_loop_releases_the_scene() {
        let (disposed, scene) = counting_guard();
        let frames = ManualFrames::new();
        frames.refuse_requests();
        assert!(start_scene_loop(scene, frames, Vec::new()).is_err());
        assert_eq!(disposed.get(), 1);
    }

    #[test]
    fn running_scene_is_released_once_after_its_loop() {
        let (disposed, scene) = counting_guard();
        let frames = ManualFrames::new();
        let (frame_loop, scene) =
            start_scene_loop(scene, frames.clone(), Vec::new()).expect("started");
        assert_eq!(disposed.get(), 0);

        drop(frame_loop);
        assert_eq!(frames.pending(), 0);
        assert_eq!(disposed.get(), 0);
        drop(scene);
        assert_eq!(disposed.get(), 1);
    }
}
