//! Turns a stream of scroll events into the shared "currently scrolling" flag.

use crate::config::SCROLL_IDLE_MS;
use crate::debounce::{DebounceKey, Scheduler, TrailingDebounce};
use crate::state::BackdropState;
use crate::BackdropError;
use log::debug;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Anything that emits scroll events, e.g. the smooth-scroll engine.
pub trait ScrollSource {
    fn subscribe(&self, listener: Box<dyn FnMut()>) -> Result<ScrollSubscription, BackdropError>;
}

/// Keeps a listener registered; dropping it unsubscribes.
pub struct ScrollSubscription {
    _guard: Box<dyn Any>,
}

impl ScrollSubscription {
    pub fn new(guard: impl Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for ScrollSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScrollSubscription")
    }
}

struct TrackerCore<S: Scheduler> {
    state: Rc<BackdropState>,
    debounce: Rc<TrailingDebounce<DebounceKey, S>>,
    idle_ms: u32,
    active: Cell<bool>,
}

impl<S> TrackerCore<S>
where
    S: Scheduler + 'static,
    S::Handle: 'static,
{
    fn record_scroll(&self) {
        if !self.active.get() {
            return;
        }
        self.state.mark_scrolling(self.debounce.scheduler().now_ms());
        let state = Rc::clone(&self.state);
        self.debounce
            .schedule(DebounceKey::ScrollIdle, self.idle_ms, move || {
                state.clear_scrolling()
            });
    }
}

/// Sets the scrolling flag on every event and clears it once events stop
/// for the idle window.
pub struct ScrollActivityTracker<S: Scheduler> {
    core: Rc<TrackerCore<S>>,
    subscription: RefCell<Option<ScrollSubscription>>,
}

impl<S> ScrollActivityTracker<S>
where
    S: Scheduler + 'static,
    S::Handle: 'static,
{
    pub fn new(state: Rc<BackdropState>, debounce: Rc<TrailingDebounce<DebounceKey, S>>) -> Self {
        Self::with_idle_window(state, debounce, SCROLL_IDLE_MS)
    }

    pub fn with_idle_window(
        state: Rc<BackdropState>,
        debounce: Rc<TrailingDebounce<DebounceKey, S>>,
        idle_ms: u32,
    ) -> Self {
        Self {
            core: Rc::new(TrackerCore {
                state,
                debounce,
                idle_ms,
                active: Cell::new(true),
            }),
            subscription: RefCell::new(None),
        }
    }

    /// Subscribe to `source`, replacing any earlier subscription.
    pub fn attach(&self, source: &dyn ScrollSource) -> Result<(), BackdropError> {
        let core = Rc::clone(&self.core);
        let subscription = source.subscribe(Box::new(move || core.record_scroll()))?;
        let previous = self.subscription.replace(Some(subscription));
        drop(previous);
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Feed one scroll event by hand.
    pub fn on_scroll(&self) {
        self.core.record_scroll();
    }

    pub fn idle_pending(&self) -> bool {
        self.core.debounce.is_pending(DebounceKey::ScrollIdle)
    }

    /// Unsubscribe and cancel the idle timer. Later events are ignored.
    pub fn teardown(&self) {
        if self.core.active.replace(false) {
            debug!("scroll tracker torn down");
        }
        let subscription = self.subscription.borrow_mut().take();
        drop(subscription);
        self.core.debounce.cancel(DebounceKey::ScrollIdle);
    }
}

impl<S: Scheduler> Drop for ScrollActivityTracker<S> {
    fn drop(&mut self) {
        self.core.active.set(false);
        self.subscription.get_mut().take();
        self.core.debounce.cancel(DebounceKey::ScrollIdle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeScrollEngine, ManualScheduler};

    struct Fixture {
        scheduler: ManualScheduler,
        state: Rc<BackdropState>,
        engine: FakeScrollEngine,
        tracker: ScrollActivityTracker<ManualScheduler>,
    }

    fn fixture() -> Fixture {
        let scheduler = ManualScheduler::new();
        let state = BackdropState::new();
        let debounce = Rc::new(TrailingDebounce::new(scheduler.clone()));
        let engine = FakeScrollEngine::new();
        let tracker = ScrollActivityTracker::new(state.clone(), debounce);
        tracker.attach(&engine).expect("fake engine accepts listeners");
        Fixture {
            scheduler,
            state,
            engine,
            tracker,
        }
    }

    #[test]
    fn event_sets_flag_and_timestamp() {
        let fx = fixture();
        fx.scheduler.advance(12.0);
        fx.engine.emit();
        let scroll = fx.state.scroll_state();
        assert!(scroll.is_scrolling);
        assert_eq!(scroll.last_scroll_ms, Some(12.0));
    }

    #[test]
    fn burst_clears_exactly_once_at_last_plus_window() {
        let fx = fixture();
        let clears = Rc::new(Cell::new(0u32));
        let cleared_at = Rc::new(Cell::new(None));
        {
            let state = fx.state.clone();
            let clears = clears.clone();
            let cleared_at = cleared_at.clone();
            let clock = fx.scheduler.clone();
            fx.state.set_listener(move |_| {
                if !state.is_scrolling() {
                    clears.set(clears.get() + 1);
                    cleared_at.set(Some(clock.now_ms()));
                }
            });
        }

        for _ in 0..8 {
            fx.engine.emit();
            fx.scheduler.advance(50.0);
        }
        // last event at t=350
        fx.scheduler.advance(99.0);
        assert!(fx.state.is_scrolling());
        assert_eq!(clears.get(), 0);

        fx.scheduler.advance(1.0);
        assert!(!fx.state.is_scrolling());
        assert_eq!(clears.get(), 1);
        assert_eq!(cleared_at.get(), Some(500.0));

        fx.scheduler.advance(1000.0);
        assert_eq!(clears.get(), 1);
    }

    #[test]
    fn teardown_unsubscribes_and_cancels_timer() {
        let fx = fixture();
        fx.engine.emit();
        assert!(fx.tracker.idle_pending());

        fx.tracker.teardown();
        assert!(!fx.engine.is_subscribed());
        assert!(!fx.tracker.is_attached());
        assert_eq!(fx.scheduler.pending(), 0);

        let revision = fx.state.revision();
        fx.scheduler.advance(1000.0);
        fx.tracker.on_scroll();
        assert_eq!(fx.state.revision(), revision);
    }

    #[test]
    fn dropping_tracker_tears_down() {
        let Fixture {
            scheduler,
            state,
            engine,
            tracker,
        } = fixture();
        engine.emit();
        drop(tracker);
        assert!(!engine.is_subscribed());
        scheduler.advance(1000.0);
        // No callback survived to clear the flag.
        assert!(state.is_scrolling());
    }

    #[test]
    fn custom_idle_window() {
        let scheduler = ManualScheduler::new();
        let state = BackdropState::new();
        let debounce = Rc::new(TrailingDebounce::new(scheduler.clone()));
        let tracker = ScrollActivityTracker::with_idle_window(state.clone(), debounce, 100);
        tracker.on_scroll();
        scheduler.advance(100.0);
        assert!(!state.is_scrolling());
    }
}
