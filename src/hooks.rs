use adaptive_backdrop::backdrop::Backdrop;
use adaptive_backdrop::config::CANVAS_ID;
use adaptive_backdrop::monitor::FpsReading;
use adaptive_backdrop::platform::find_canvas;
use adaptive_backdrop::BackdropState;
use log::warn;
use std::rc::Rc;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

/// Shared flag record for the page. The calling component re-renders whenever
/// a flag changes, so panels reading the state stay current.
#[hook]
pub fn use_backdrop_state() -> Rc<BackdropState> {
    let state = use_state(BackdropState::new);
    let revision = use_state(|| 0u64);

    {
        let state = (*state).clone();
        let revision = revision.clone();
        use_effect_with((), move |_| {
            state.set_listener(move |rev| revision.set(rev));
            move || state.clear_listener()
        });
    }

    (*state).clone()
}

/// Mounts the backdrop onto `canvas` after the first render and tears it down
/// on unmount. `force_low_quality` is forwarded to the sampler on every change.
#[hook]
pub fn use_backdrop(
    canvas: NodeRef,
    state: Rc<BackdropState>,
    force_low_quality: bool,
    on_fps: Option<Callback<FpsReading>>,
) {
    let backdrop = use_mut_ref(|| None::<Backdrop>);

    // Mount once; the destructor runs on unmount.
    {
        let backdrop = backdrop.clone();
        use_effect_with((), move |_| {
            let element = match canvas.cast::<HtmlCanvasElement>() {
                Some(element) => Ok(element),
                None => find_canvas(CANVAS_ID),
            };
            match element {
                Ok(element) => {
                    let on_fps = on_fps.map(|cb| {
                        Box::new(move |reading: FpsReading| cb.emit(reading))
                            as Box<dyn FnMut(FpsReading)>
                    });
                    match Backdrop::mount(state, &element, on_fps) {
                        Ok(mounted) => *backdrop.borrow_mut() = Some(mounted),
                        Err(e) => warn!("backdrop disabled: {}", e),
                    }
                }
                Err(e) => warn!("backdrop canvas unavailable: {}", e),
            }
            move || {
                // Drop outside the borrow: teardown notifies state listeners.
                let mounted = backdrop.borrow_mut().take();
                drop(mounted);
            }
        });
    }

    {
        let backdrop = backdrop.clone();
        use_effect_with(force_low_quality, move |&on| {
            if let Some(mounted) = backdrop.borrow().as_ref() {
                mounted.set_manual_override(on);
            }
            || ()
        });
    }
}
