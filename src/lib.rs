//! Adaptive-quality 3D backdrop for a single-page site.
//!
//! Device signals, scroll activity and a developer override are folded into a
//! small set of scene parameters that the per-frame composer reads on every
//! frame:
//!
//! - [`perf::PerfSignalSampler`] classifies the device from [`signals`]
//! - [`scroll::ScrollActivityTracker`] raises and clears the scrolling flag
//! - [`quality::resolve`] maps the flags onto a [`quality::QualityParameters`] tier
//! - [`scene::SceneComposer`] turns the tier into a [`scene::SceneFrame`]
//!
//! All flags live in one [`state::BackdropState`] owned by the composition root
//! ([`backdrop::Backdrop`] in the browser). Everything outside [`platform`],
//! [`scene_bindings`] and [`backdrop`] is free of browser calls and runs under
//! plain `cargo test`.

use std::fmt;
use wasm_bindgen::JsValue;

pub mod backdrop;
pub mod config;
pub mod debounce;
pub mod frame_loop;
pub mod monitor;
pub mod perf;
pub mod platform;
pub mod quality;
pub mod scene;
pub mod scene_bindings;
pub mod scroll;
pub mod signals;
pub mod state;

#[cfg(test)]
mod testing;

pub use quality::{resolve, QualityParameters, QualityTier};
pub use signals::PerformanceClass;
pub use state::BackdropState;

/// Failures while wiring the backdrop into the page.
#[derive(Debug, Clone, PartialEq)]
pub enum BackdropError {
    NoWindow,
    NoDocument,
    MissingElement(String),
    /// A browser or JS helper call threw.
    Js(String),
    Serialize(String),
}

impl fmt::Display for BackdropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackdropError::NoWindow => write!(f, "No global window available"),
            BackdropError::NoDocument => write!(f, "Window has no document"),
            BackdropError::MissingElement(id) => write!(f, "Element #{} not found", id),
            BackdropError::Js(msg) => write!(f, "JavaScript error: {}", msg),
            BackdropError::Serialize(msg) => write!(f, "Failed to serialize scene frame: {}", msg),
        }
    }
}

impl std::error::Error for BackdropError {}

impl From<JsValue> for BackdropError {
    fn from(value: JsValue) -> Self {
        BackdropError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<serde_wasm_bindgen::Error> for BackdropError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        BackdropError::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            BackdropError::MissingElement("backdrop-canvas".into()).to_string(),
            "Element #backdrop-canvas not found"
        );
        assert_eq!(
            BackdropError::Js("context lost".into()).to_string(),
            "JavaScript error: context lost"
        );
    }
}
