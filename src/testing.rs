//! Deterministic stand-ins for the browser, shared by the unit tests.

use crate::debounce::Scheduler;
use crate::frame_loop::FrameHost;
use crate::scene::{SceneFrame, SceneSink};
use crate::scroll::{ScrollSource, ScrollSubscription};
use crate::signals::SignalProvider;
use crate::BackdropError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Signal provider whose readings can be changed between samples.
#[derive(Debug, Default)]
pub struct FakeSignals {
    pub width: Cell<Option<f64>>,
    pub cores: Cell<Option<u32>>,
    pub dpr: Cell<Option<f64>>,
    pub memory: Cell<Option<f64>>,
    pub reads: Cell<u32>,
}

impl FakeSignals {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn desktop() -> Self {
        Self::with(1920.0, 8, 1.0, 8.0)
    }

    pub fn with(width: f64, cores: u32, dpr: f64, memory: f64) -> Self {
        Self {
            width: Cell::new(Some(width)),
            cores: Cell::new(Some(cores)),
            dpr: Cell::new(Some(dpr)),
            memory: Cell::new(Some(memory)),
            reads: Cell::new(0),
        }
    }
}

impl SignalProvider for FakeSignals {
    fn sample_viewport_width(&self) -> Option<f64> {
        self.reads.set(self.reads.get() + 1);
        self.width.get()
    }

    fn sample_core_count(&self) -> Option<u32> {
        self.cores.get()
    }

    fn sample_device_pixel_ratio(&self) -> Option<f64> {
        self.dpr.get()
    }

    fn sample_device_memory(&self) -> Option<f64> {
        self.memory.get()
    }
}

struct Entry {
    due: f64,
    seq: u64,
    live: Rc<Cell<bool>>,
    action: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Timeline {
    now: f64,
    seq: u64,
    queue: Vec<Entry>,
}

/// Virtual-clock scheduler. Time only moves when the test calls `advance`.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timeline: Rc<RefCell<Timeline>>,
}

/// Cancels its entry when dropped, like a gloo `Timeout`.
pub struct ManualHandle {
    live: Rc<Cell<bool>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.live.set(false);
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward, running every live action that falls due, in order.
    pub fn advance(&self, ms: f64) {
        let target = self.timeline.borrow().now + ms;
        loop {
            let next = {
                let mut timeline = self.timeline.borrow_mut();
                timeline.queue.retain(|entry| entry.live.get());
                let position = timeline
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
                    .map(|(i, _)| i);
                position.map(|i| {
                    let entry = timeline.queue.remove(i);
                    timeline.now = entry.due;
                    entry
                })
            };
            match next {
                Some(entry) => {
                    entry.live.set(false);
                    (entry.action)();
                }
                None => break,
            }
        }
        self.timeline.borrow_mut().now = target;
    }

    /// Number of actions still waiting to fire.
    pub fn pending(&self) -> usize {
        self.timeline
            .borrow()
            .queue
            .iter()
            .filter(|entry| entry.live.get())
            .count()
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn now_ms(&self) -> f64 {
        self.timeline.borrow().now
    }

    fn schedule(&self, delay_ms: u32, action: Box<dyn FnOnce()>) -> ManualHandle {
        let mut timeline = self.timeline.borrow_mut();
        let live = Rc::new(Cell::new(true));
        timeline.seq += 1;
        let entry = Entry {
            due: timeline.now + f64::from(delay_ms),
            seq: timeline.seq,
            live: live.clone(),
            action,
        };
        timeline.queue.push(entry);
        ManualHandle { live }
    }
}

/// Scroll engine driven by hand.
#[derive(Clone, Default)]
pub struct FakeScrollEngine {
    listener: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
}

impl FakeScrollEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self) {
        if let Some(listener) = self.listener.borrow_mut().as_mut() {
            listener();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.listener.borrow().is_some()
    }
}

struct FakeScrollGuard {
    listener: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
}

impl Drop for FakeScrollGuard {
    fn drop(&mut self) {
        self.listener.borrow_mut().take();
    }
}

impl ScrollSource for FakeScrollEngine {
    fn subscribe(&self, listener: Box<dyn FnMut()>) -> Result<ScrollSubscription, BackdropError> {
        *self.listener.borrow_mut() = Some(listener);
        Ok(ScrollSubscription::new(FakeScrollGuard {
            listener: self.listener.clone(),
        }))
    }
}

/// Keeps every frame it is handed.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub frames: Rc<RefCell<Vec<SceneFrame>>>,
}

impl RecordingSink {
    pub fn last(&self) -> Option<SceneFrame> {
        self.frames.borrow().last().cloned()
    }
}

impl SceneSink for RecordingSink {
    fn draw(&mut self, frame: &SceneFrame) -> Result<(), BackdropError> {
        self.frames.borrow_mut().push(frame.clone());
        Ok(())
    }
}

type FrameCallback = Rc<RefCell<Box<dyn FnMut(f64)>>>;

#[derive(Default)]
struct FrameQueue {
    next_id: i32,
    pending: Vec<(i32, FrameCallback)>,
    cancelled: u32,
    refuse: bool,
}

/// Frame host stepped by hand, like a `requestAnimationFrame` that only
/// fires when the test says so.
#[derive(Clone, Default)]
pub struct ManualFrames {
    queue: Rc<RefCell<FrameQueue>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback requested so far with `timestamp` in milliseconds.
    pub fn fire(&self, timestamp: f64) {
        let due = std::mem::take(&mut self.queue.borrow_mut().pending);
        for (_, callback) in due {
            let mut tick = callback.borrow_mut();
            (*tick)(timestamp);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    pub fn cancelled(&self) -> u32 {
        self.queue.borrow().cancelled
    }

    pub fn refuse_requests(&self) {
        self.queue.borrow_mut().refuse = true;
    }
}

impl FrameHost for ManualFrames {
    type Callback = FrameCallback;

    fn wrap(&self, tick: Box<dyn FnMut(f64)>) -> FrameCallback {
        Rc::new(RefCell::new(tick))
    }

    fn request(&self, callback: &FrameCallback) -> Result<i32, BackdropError> {
        let mut queue = self.queue.borrow_mut();
        if queue.refuse {
            return Err(BackdropError::Js("frame request refused".into()));
        }
        queue.next_id += 1;
        let id = queue.next_id;
        queue.pending.push((id, callback.clone()));
        Ok(id)
    }

    fn cancel(&self, id: i32) {
        let mut queue = self.queue.borrow_mut();
        let before = queue.pending.len();
        queue.pending.retain(|(pending, _)| *pending != id);
        if queue.pending.len() < before {
            queue.cancelled += 1;
        }
    }
}
