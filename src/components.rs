//! Developer-facing view components for the backdrop.
//!
//! Both components are stateless and render from props only.

use adaptive_backdrop::monitor::FpsReading;
use adaptive_backdrop::{PerformanceClass, QualityTier};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Quality controls. Hidden in release builds but still wired.
#[derive(Properties, PartialEq)]
pub struct DevPanelProps {
    pub hidden: bool,
    pub force_low_quality: bool,
    pub on_toggle: Callback<bool>,
    pub performance: PerformanceClass,
    pub tier: QualityTier,
    pub scrolling: bool,
}

#[function_component(DevPanel)]
pub fn dev_panel(props: &DevPanelProps) -> Html {
    let onchange = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_toggle.emit(input.checked());
        })
    };

    html! {
        <div class="dev-panel" hidden={props.hidden}>
            <div class="dev-panel-title">{ "Renderer" }</div>
            <label class="dev-panel-toggle">
                <input type="checkbox"
                    checked={props.force_low_quality}
                    {onchange}
                />
                { "Force Low Quality" }
            </label>
            <div class="dev-panel-status">
                { format!("Device: {} | Tier: {}{}",
                          props.performance,
                          props.tier,
                          if props.scrolling { " (scrolling)" } else { "" }) }
            </div>
        </div>
    }
}

/// Frame-rate and heap readout.
#[derive(Properties, PartialEq)]
pub struct PerfOverlayProps {
    pub reading: Option<FpsReading>,
}

#[function_component(PerfOverlay)]
pub fn perf_overlay(props: &PerfOverlayProps) -> Html {
    let Some(reading) = props.reading else {
        return html! {};
    };

    html! {
        <div class="perf-overlay">
            <div>{ format!("FPS: {}", reading.fps) }</div>
            { if let Some(mb) = reading.heap_mb.filter(|mb| *mb > 0) {
                html!{ <div>{ format!("Memory: {}MB", mb) }</div> }
            } else { html!{} } }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::ServerRenderer;

    fn render_panel(hidden: bool) -> String {
        block_on(
            ServerRenderer::<DevPanel>::with_props(move || DevPanelProps {
                hidden,
                force_low_quality: false,
                on_toggle: Callback::noop(),
                performance: PerformanceClass::Normal,
                tier: QualityTier::Normal,
                scrolling: false,
            })
            .render(),
        )
    }

    #[test]
    fn release_panel_is_hidden_but_keeps_its_toggle() {
        let html = render_panel(true);
        assert!(html.contains("hidden"), "{html}");
        assert!(html.contains("type=\"checkbox\""), "{html}");
        assert!(html.contains("Force Low Quality"), "{html}");
    }

    #[test]
    fn dev_panel_is_visible() {
        let html = render_panel(false);
        assert!(!html.contains("hidden"), "{html}");
        assert!(html.contains("Force Low Quality"), "{html}");
    }
}
