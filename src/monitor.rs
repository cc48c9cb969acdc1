//! Frame-rate meter for the developer overlay.

use crate::config::FPS_SAMPLE_WINDOW_MS;
use crate::scene::FrameConsumer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FpsReading {
    pub fps: u32,
    /// Used JS heap in MB, when the browser exposes it.
    pub heap_mb: Option<u32>,
}

/// Counts frames and reports the rate once per sample window.
pub struct FpsMeter {
    frames: u32,
    elapsed_ms: f64,
    heap_probe: Box<dyn Fn() -> Option<u32>>,
    on_report: Box<dyn FnMut(FpsReading)>,
}

impl FpsMeter {
    pub fn new(on_report: impl FnMut(FpsReading) + 'static) -> Self {
        Self {
            frames: 0,
            elapsed_ms: 0.0,
            heap_probe: Box::new(|| None),
            on_report: Box::new(on_report),
        }
    }

    pub fn with_heap_probe(mut self, probe: impl Fn() -> Option<u32> + 'static) -> Self {
        self.heap_probe = Box::new(probe);
        self
    }
}

impl FrameConsumer for FpsMeter {
    fn on_frame(&mut self, elapsed: f64) {
        self.frames += 1;
        self.elapsed_ms += elapsed.max(0.0) * 1000.0;
        if self.elapsed_ms >= FPS_SAMPLE_WINDOW_MS {
            let fps = (f64::from(self.frames) * 1000.0 / self.elapsed_ms).round() as u32;
            let reading = FpsReading {
                fps,
                heap_mb: (self.heap_probe)(),
            };
            self.frames = 0;
            self.elapsed_ms = 0.0;
            (self.on_report)(reading);
        }
    }
}
