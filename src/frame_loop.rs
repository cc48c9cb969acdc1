//! Host-driven frame loop feeding every registered [`FrameConsumer`].

use crate::scene::FrameConsumer;
use crate::BackdropError;
use log::warn;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Per-frame callback registration on the host, e.g. `requestAnimationFrame`.
///
/// A request is one-shot: the host invokes the callback once with a timestamp
/// in milliseconds, and the loop re-requests from inside it.
pub trait FrameHost {
    type Callback;

    fn wrap(&self, tick: Box<dyn FnMut(f64)>) -> Self::Callback;
    fn request(&self, callback: &Self::Callback) -> Result<i32, BackdropError>;
    fn cancel(&self, id: i32);
}

struct LoopShared<H: FrameHost> {
    host: H,
    frame_id: Cell<Option<i32>>,
    last_timestamp: Cell<Option<f64>>,
    callback: RefCell<Option<H::Callback>>,
    consumers: RefCell<Vec<Box<dyn FrameConsumer>>>,
}

impl<H: FrameHost> LoopShared<H> {
    fn request(&self) -> Result<(), BackdropError> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let id = self.host.request(callback)?;
        self.frame_id.set(Some(id));
        Ok(())
    }

    fn tick(&self, timestamp: f64) {
        self.frame_id.set(None);
        let elapsed = self
            .last_timestamp
            .replace(Some(timestamp))
            .map(|last| ((timestamp - last) / 1000.0).max(0.0))
            .unwrap_or(0.0);
        for consumer in self.consumers.borrow_mut().iter_mut() {
            consumer.on_frame(elapsed);
        }
        if let Err(e) = self.request() {
            warn!("animation loop stopped: {}", e);
        }
    }
}

/// Calls every consumer once per host frame with the seconds elapsed since the
/// previous frame (zero on the first). Dropping the loop cancels the pending
/// frame and releases the callback.
pub struct FrameLoop<H: FrameHost> {
    shared: Rc<LoopShared<H>>,
}

impl<H> FrameLoop<H>
where
    H: FrameHost + 'static,
    H::Callback: 'static,
{
    pub fn start(host: H, consumers: Vec<Box<dyn FrameConsumer>>) -> Result<Self, BackdropError> {
        let shared = Rc::new(LoopShared {
            host,
            frame_id: Cell::new(None),
            last_timestamp: Cell::new(None),
            callback: RefCell::new(None),
            consumers: RefCell::new(consumers),
        });
        let weak = Rc::downgrade(&shared);
        let callback = shared.host.wrap(Box::new(move |timestamp: f64| {
            if let Some(shared) = weak.upgrade() {
                shared.tick(timestamp);
            }
        }));
        *shared.callback.borrow_mut() = Some(callback);
        shared.request()?;
        Ok(Self { shared })
    }

    pub fn is_scheduled(&self) -> bool {
        self.shared.frame_id.get().is_some()
    }
}

impl<H: FrameHost> Drop for FrameLoop<H> {
    fn drop(&mut self) {
        if let Some(id) = self.shared.frame_id.take() {
            self.shared.host.cancel(id);
        }
        self.shared.callback.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualFrames;

    fn recorder() -> (Rc<RefCell<Vec<f64>>>, Box<dyn FrameConsumer>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |dt: f64| sink.borrow_mut().push(dt)))
    }

    #[test]
    fn consumers_receive_elapsed_seconds() {
        let frames = ManualFrames::new();
        let (seen, consumer) = recorder();
        let frame_loop = FrameLoop::start(frames.clone(), vec![consumer]).expect("started");
        assert!(frame_loop.is_scheduled());

        frames.fire(1000.0);
        frames.fire(1016.0);
        frames.fire(1050.0);
        assert_eq!(*seen.borrow(), vec![0.0, 0.016, 0.034]);
        assert_eq!(frames.pending(), 1);
    }

    #[test]
    fn every_consumer_runs_each_frame() {
        let frames = ManualFrames::new();
        let (first, a) = recorder();
        let (second, b) = recorder();
        let _frame_loop = FrameLoop::start(frames.clone(), vec![a, b]).expect("started");
        frames.fire(0.0);
        frames.fire(20.0);
        assert_eq!(first.borrow().len(), 2);
        assert_eq!(*first.borrow(), *second.borrow());
    }

    #[test]
    fn dropping_the_loop_deregisters_its_frame() {
        let frames = ManualFrames::new();
        let (seen, consumer) = recorder();
        let frame_loop = FrameLoop::start(frames.clone(), vec![consumer]).expect("started");
        frames.fire(0.0);
        assert_eq!(frames.pending(), 1);

        drop(frame_loop);
        assert_eq!(frames.pending(), 0);
        assert_eq!(frames.cancelled(), 1);
        frames.fire(16.0);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn failed_request_fails_start() {
        let frames = ManualFrames::new();
        frames.refuse_requests();
        let (_, consumer) = recorder();
        assert!(FrameLoop::start(frames, vec![consumer]).is_err());
    }
}
