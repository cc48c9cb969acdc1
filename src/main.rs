//! Main module for the adaptive backdrop using Yew.
//! Owns the shared state, mounts the 3D backdrop and renders the developer controls.

use adaptive_backdrop::config::CANVAS_ID;
use adaptive_backdrop::monitor::FpsReading;
use yew::prelude::*;

mod components;
mod hooks;

use components::{DevPanel, PerfOverlay};
use hooks::{use_backdrop, use_backdrop_state};

/// Composition root: state lives here and is torn down with this component.
#[function_component]
pub fn App() -> Html {
    let state = use_backdrop_state();
    let force_low_quality = use_state(|| false);
    let fps = use_state(|| None::<FpsReading>);
    let canvas = use_node_ref();
    let dev_build = cfg!(debug_assertions);

    let on_fps = dev_build.then(|| {
        let fps = fps.clone();
        Callback::from(move |reading: FpsReading| fps.set(Some(reading)))
    });
    use_backdrop(canvas.clone(), state.clone(), *force_low_quality, on_fps);

    let on_toggle = {
        let force_low_quality = force_low_quality.clone();
        Callback::from(move |on: bool| force_low_quality.set(on))
    };

    html! {
        <>
            <canvas id={CANVAS_ID} class="backdrop-canvas" ref={canvas} />
            <DevPanel
                hidden={!dev_build}
                force_low_quality={*force_low_quality}
                {on_toggle}
                performance={state.performance_class()}
                tier={state.quality().tier}
                scrolling={state.is_scrolling()}
            />
            if dev_build {
                <PerfOverlay reading={*fps} />
            }
        </>
    }
}

/// Entry point: installs panic and log hooks, then renders the App component.
fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    console_log::init_with_level(level).ok();
    yew::Renderer::<App>::new().render();
}
