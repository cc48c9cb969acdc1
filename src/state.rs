//! The flag set shared by every stage of the pipeline.
//!
//! One [`BackdropState`] is created by the composition root and handed out as
//! `Rc<BackdropState>`. Everything runs on the browser's event loop, so plain
//! `Cell`s are enough: a write and a later read can never interleave.

use crate::quality::{resolve, QualityParameters};
use crate::signals::PerformanceClass;
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Scroll activity as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    pub is_scrolling: bool,
    /// Clock reading of the latest scroll event, if any arrived yet.
    pub last_scroll_ms: Option<f64>,
}

type ChangeListener = Rc<dyn Fn(u64)>;

#[derive(Default)]
pub struct BackdropState {
    performance_class: Cell<PerformanceClass>,
    scroll: Cell<ScrollState>,
    manual_override: Cell<bool>,
    revision: Cell<u64>,
    listener: RefCell<Option<ChangeListener>>,
}

impl BackdropState {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn performance_class(&self) -> PerformanceClass {
        self.performance_class.get()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.get().is_scrolling
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll.get()
    }

    pub fn manual_override(&self) -> bool {
        self.manual_override.get()
    }

    /// Bumped on every change that alters a flag.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Resolved fresh from the current flags on every call.
    pub fn quality(&self) -> QualityParameters {
        resolve(
            self.performance_class(),
            self.is_scrolling(),
            self.manual_override(),
        )
    }

    /// Called after every effective change with the new revision.
    pub fn set_listener(&self, listener: impl Fn(u64) + 'static) {
        *self.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub fn clear_listener(&self) {
        self.listener.borrow_mut().take();
    }

    pub fn set_performance_class(&self, class: PerformanceClass) {
        if self.performance_class.replace(class) != class {
            info!("performance class is now {}", class);
            self.changed();
        }
    }

    pub fn set_manual_override(&self, on: bool) {
        if self.manual_override.replace(on) != on {
            info!("manual low-quality override {}", if on { "on" } else { "off" });
            self.changed();
        }
    }

    /// Record a scroll event at `now_ms`.
    pub fn mark_scrolling(&self, now_ms: f64) {
        let was_scrolling = self.is_scrolling();
        self.scroll.set(ScrollState {
            is_scrolling: true,
            last_scroll_ms: Some(now_ms),
        });
        if !was_scrolling {
            debug!("scrolling started");
            self.changed();
        }
    }

    pub fn clear_scrolling(&self) {
        let scroll = self.scroll.get();
        if scroll.is_scrolling {
            self.scroll.set(ScrollState {
                is_scrolling: false,
                ..scroll
            });
            debug!("scrolling settled");
            self.changed();
        }
    }

    fn changed(&self) {
        let revision = self.revision.get().wrapping_add(1);
        self.revision.set(revision);
        // Clone out so the listener may touch the state again.
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(revision);
        }
    }
}

impl fmt::Debug for BackdropState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackdropState")
            .field("performance_class", &self.performance_class())
            .field("scroll", &self.scroll_state())
            .field("manual_override", &self.manual_override())
            .field("revision", &self.revision())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityTier;

    #[test]
    fn starts_at_full_quality() {
        let state = BackdropState::new();
        assert_eq!(state.quality(), QualityParameters::NORMAL);
        assert_eq!(state.revision(), 0);
        assert_eq!(state.scroll_state(), ScrollState::default());
    }

    #[test]
    fn only_effective_changes_bump_revision() {
        let state = BackdropState::new();
        state.set_performance_class(PerformanceClass::Normal);
        state.set_manual_override(false);
        state.clear_scrolling();
        assert_eq!(state.revision(), 0);

        state.set_performance_class(PerformanceClass::Low);
        assert_eq!(state.revision(), 1);
        state.mark_scrolling(10.0);
        state.mark_scrolling(20.0);
        assert_eq!(state.revision(), 2);
        assert_eq!(state.scroll_state().last_scroll_ms, Some(20.0));
    }

    #[test]
    fn listener_sees_each_revision() {
        let state = BackdropState::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        state.set_listener(move |rev| sink.borrow_mut().push(rev));

        state.set_manual_override(true);
        state.mark_scrolling(0.0);
        state.clear_scrolling();
        state.clear_listener();
        state.set_manual_override(false);

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert_eq!(state.revision(), 4);
    }

    #[test]
    fn quality_follows_flags_without_caching() {
        let state = BackdropState::new();
        state.mark_scrolling(0.0);
        assert_eq!(state.quality().tier, QualityTier::Scrolling);
        state.clear_scrolling();
        assert_eq!(state.quality().tier, QualityTier::Normal);
        state.set_manual_override(true);
        assert_eq!(state.quality().tier, QualityTier::Low);
    }

    #[test]
    fn clearing_keeps_last_scroll_timestamp() {
        let state = BackdropState::new();
        state.mark_scrolling(42.0);
        state.clear_scrolling();
        assert_eq!(
            state.scroll_state(),
            ScrollState {
                is_scrolling: false,
                last_scroll_ms: Some(42.0)
            }
        );
    }
}
