//! Samples device signals into the shared [`PerformanceClass`].

use crate::config::RESIZE_DEBOUNCE_MS;
use crate::debounce::{DebounceKey, Scheduler, TrailingDebounce};
use crate::signals::{DeviceSignals, PerformanceClass, SignalProvider};
use crate::state::BackdropState;
use log::debug;
use std::rc::{Rc, Weak};

type SharedDebounce<S> = Rc<TrailingDebounce<DebounceKey, S>>;

struct SamplerCore<P, S: Scheduler> {
    provider: P,
    state: Rc<BackdropState>,
    debounce: SharedDebounce<S>,
}

impl<P: SignalProvider, S: Scheduler> SamplerCore<P, S> {
    fn refresh(&self) -> PerformanceClass {
        let class = if self.state.manual_override() {
            PerformanceClass::Low
        } else {
            let signals = DeviceSignals::sample(&self.provider);
            debug!("sampled {:?}", signals);
            signals.classify()
        };
        self.state.set_performance_class(class);
        class
    }
}

/// Keeps the performance class in step with resizes and the manual override.
pub struct PerfSignalSampler<P, S: Scheduler> {
    core: Rc<SamplerCore<P, S>>,
}

impl<P, S> PerfSignalSampler<P, S>
where
    P: SignalProvider + 'static,
    S: Scheduler + 'static,
    S::Handle: 'static,
{
    /// Takes an initial sample right away.
    pub fn new(provider: P, state: Rc<BackdropState>, debounce: SharedDebounce<S>) -> Self {
        let sampler = Self {
            core: Rc::new(SamplerCore {
                provider,
                state,
                debounce,
            }),
        };
        sampler.refresh();
        sampler
    }

    /// Reclassify now. A manual override short-circuits sampling.
    pub fn refresh(&self) -> PerformanceClass {
        self.core.refresh()
    }

    /// Reclassify once the current burst of resizes has been quiet for the debounce window.
    pub fn on_resize(&self) {
        let weak: Weak<SamplerCore<P, S>> = Rc::downgrade(&self.core);
        self.core
            .debounce
            .schedule(DebounceKey::Resize, RESIZE_DEBOUNCE_MS, move || {
                if let Some(core) = weak.upgrade() {
                    core.refresh();
                }
            });
    }

    /// Forcing on pins the class to `Low`; releasing resamples immediately.
    pub fn set_manual_override(&self, on: bool) {
        self.core.state.set_manual_override(on);
        self.refresh();
    }

    pub fn resize_pending(&self) -> bool {
        self.core.debounce.is_pending(DebounceKey::Resize)
    }

    pub fn teardown(&self) {
        self.core.debounce.cancel(DebounceKey::Resize);
    }
}

impl<P, S: Scheduler> Drop for PerfSignalSampler<P, S> {
    fn drop(&mut self) {
        self.core.debounce.cancel(DebounceKey::Resize);
    }
}
