//! Device and viewport signals used to classify the host as low-performance.
//!
//! Signals are read through the [`SignalProvider`] trait so the classifier can
//! run against a live browser ([`crate::platform::BrowserSignals`]) or against
//! deterministic values in tests. A signal the host cannot report comes back as
//! `None` and is replaced by its default from [`crate::config`], which never
//! pushes the classification towards `Low` on its own.

use crate::config::{
    DEFAULT_CORE_COUNT, DEFAULT_DEVICE_MEMORY_GB, DEFAULT_DEVICE_PIXEL_RATIO,
    DEFAULT_VIEWPORT_WIDTH_PX, LOW_PERF_MAX_CORES, LOW_PERF_MAX_WIDTH_PX, LOW_PERF_MIN_DPR,
    LOW_PERF_MIN_MEMORY_GB,
};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Read-only access to the runtime environment.
pub trait SignalProvider {
    /// Viewport width in CSS pixels.
    fn sample_viewport_width(&self) -> Option<f64>;
    /// Logical core count.
    fn sample_core_count(&self) -> Option<u32>;
    fn sample_device_pixel_ratio(&self) -> Option<f64>;
    /// Device memory in GB. Most browsers other than Chromium never report it.
    fn sample_device_memory(&self) -> Option<f64>;
}

impl<P: SignalProvider + ?Sized> SignalProvider for Rc<P> {
    fn sample_viewport_width(&self) -> Option<f64> {
        (**self).sample_viewport_width()
    }

    fn sample_core_count(&self) -> Option<u32> {
        (**self).sample_core_count()
    }

    fn sample_device_pixel_ratio(&self) -> Option<f64> {
        (**self).sample_device_pixel_ratio()
    }

    fn sample_device_memory(&self) -> Option<f64> {
        (**self).sample_device_memory()
    }
}

/// Whether the current device warrants reduced visual fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PerformanceClass {
    #[default]
    Normal,
    Low,
}

impl PerformanceClass {
    pub fn is_low(self) -> bool {
        self == PerformanceClass::Low
    }
}

impl fmt::Display for PerformanceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceClass::Normal => write!(f, "normal"),
            PerformanceClass::Low => write!(f, "low"),
        }
    }
}

/// One sample of all four signals, with defaults already applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSignals {
    pub viewport_width: f64,
    pub core_count: u32,
    pub device_pixel_ratio: f64,
    pub device_memory_gb: f64,
}

impl Default for DeviceSignals {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH_PX,
            core_count: DEFAULT_CORE_COUNT,
            device_pixel_ratio: DEFAULT_DEVICE_PIXEL_RATIO,
            device_memory_gb: DEFAULT_DEVICE_MEMORY_GB,
        }
    }
}

impl DeviceSignals {
    /// Read every signal from `provider`, substituting defaults for the missing ones.
    pub fn sample<P: SignalProvider + ?Sized>(provider: &P) -> Self {
        let defaults = Self::default();
        Self {
            viewport_width: provider
                .sample_viewport_width()
                .unwrap_or(defaults.viewport_width),
            core_count: provider
                .sample_core_count()
                .filter(|&n| n > 0)
                .unwrap_or(defaults.core_count),
            device_pixel_ratio: provider
                .sample_device_pixel_ratio()
                .filter(|r| *r > 0.0)
                .unwrap_or(defaults.device_pixel_ratio),
            device_memory_gb: provider
                .sample_device_memory()
                .unwrap_or(defaults.device_memory_gb),
        }
    }

    pub fn narrow_viewport(&self) -> bool {
        self.viewport_width < LOW_PERF_MAX_WIDTH_PX
    }

    pub fn few_cores(&self) -> bool {
        self.core_count <= LOW_PERF_MAX_CORES
    }

    pub fn dense_display(&self) -> bool {
        self.device_pixel_ratio > LOW_PERF_MIN_DPR
    }

    pub fn low_memory(&self) -> bool {
        self.device_memory_gb < LOW_PERF_MIN_MEMORY_GB
    }

    /// `Low` when any single threshold trips.
    pub fn classify(&self) -> PerformanceClass {
        if self.narrow_viewport() || self.few_cores() || self.dense_display() || self.low_memory()
        {
            PerformanceClass::Low
        } else {
            PerformanceClass::Normal
        }
    }
}
