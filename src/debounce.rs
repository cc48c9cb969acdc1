//! Keyed trailing debounce over an injectable timer source.

use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

/// Deferred-callback source on the host event loop.
///
/// Dropping a returned handle must cancel the action if it has not fired yet,
/// the way `gloo_timers::callback::Timeout` does.
pub trait Scheduler {
    type Handle;

    /// Monotonic clock in milliseconds.
    fn now_ms(&self) -> f64;

    fn schedule(&self, delay_ms: u32, action: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Timers owned by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebounceKey {
    Resize,
    ScrollIdle,
}

struct Slot<H> {
    generation: u64,
    armed: bool,
    // Kept after firing and released by the next schedule or cancel. An action
    // that re-arms its own key releases its handle while running.
    handle: Option<H>,
}

impl<H> Default for Slot<H> {
    fn default() -> Self {
        Self {
            generation: 0,
            armed: false,
            handle: None,
        }
    }
}

type Slots<K, H> = Rc<RefCell<HashMap<K, Slot<H>>>>;

/// Runs an action only once a burst of `schedule` calls for the same key has
/// been quiet for the requested delay.
pub struct TrailingDebounce<K, S: Scheduler> {
    scheduler: S,
    slots: Slots<K, S::Handle>,
}

impl<K: Eq + Hash, S: Scheduler> TrailingDebounce<K, S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            slots: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.slots
            .borrow()
            .get(&key)
            .map(|slot| slot.armed)
            .unwrap_or(false)
    }

    pub fn cancel(&self, key: K) {
        let removed = self.slots.borrow_mut().remove(&key);
        drop(removed);
    }

    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.slots.borrow_mut().drain().collect();
        drop(drained);
    }
}

impl<K, S> TrailingDebounce<K, S>
where
    K: Copy + Eq + Hash + fmt::Debug + 'static,
    S: Scheduler,
    S::Handle: 'static,
{
    /// Cancel whatever is pending for `key` and arm `action` to run after `delay_ms`.
    pub fn schedule(&self, key: K, delay_ms: u32, action: impl FnOnce() + 'static) {
        let (generation, previous) = {
            let mut slots = self.slots.borrow_mut();
            let slot = slots.entry(key).or_default();
            slot.generation += 1;
            let rearmed = slot.armed;
            slot.armed = true;
            if rearmed {
                debug!("debounce {:?}: re-armed for {} ms", key, delay_ms);
            }
            (slot.generation, slot.handle.take())
        };
        drop(previous);

        let weak: Weak<RefCell<HashMap<K, Slot<S::Handle>>>> = Rc::downgrade(&self.slots);
        let handle = self.scheduler.schedule(
            delay_ms,
            Box::new(move || {
                let Some(slots) = weak.upgrade() else {
                    return;
                };
                let due = match slots.borrow_mut().get_mut(&key) {
                    Some(slot) if slot.armed && slot.generation == generation => {
                        slot.armed = false;
                        true
                    }
                    _ => false,
                };
                if due {
                    action();
                }
            }),
        );

        if let Some(slot) = self.slots.borrow_mut().get_mut(&key) {
            if slot.generation == generation {
                slot.handle = Some(handle);
            }
        }
    }
}

impl<K, S: Scheduler> Drop for TrailingDebounce<K, S> {
    fn drop(&mut self) {
        // Handles cancel on drop; release them outside the borrow.
        let drained: Vec<_> = self.slots.borrow_mut().drain().collect();
        drop(drained);
    }
}

impl<K, S: Scheduler> fmt::Debug for TrailingDebounce<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let armed = self
            .slots
            .try_borrow()
            .map(|slots| slots.values().filter(|slot| slot.armed).count())
            .unwrap_or(0);
        f.debug_struct("TrailingDebounce")
            .field("armed", &armed)
            .finish()
    }
}
