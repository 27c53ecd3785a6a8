//! Single-threaded scheduling primitives for the background animation.
//!
//! Host environments (the browser, or the manual hosts in [`manual`]) only
//! need to provide one-shot callbacks: [`FrameHost`] for display frames and
//! [`TimerHost`] for delays. On top of those this crate builds
//!
//! * [`FrameLoop`], a repeating per-frame task that re-arms itself after each
//!   callback until its [`CancellationToken`] is cancelled, and
//! * [`RestartableTimeout`], a single pending delay where every restart
//!   cancels the previous one (last call wins).
//!
//! Everything here is `Rc`-based and deliberately `!Send`.

pub mod manual;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

/// Schedules one-shot display-frame callbacks.
///
/// The callback receives the host's frame timestamp in milliseconds.
/// Timestamps are monotonically increasing and callbacks never overlap.
pub trait FrameHost {
    type Handle;

    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) -> Self::Handle;

    fn cancel_frame(&self, handle: Self::Handle);
}

/// Schedules one-shot delayed callbacks.
pub trait TimerHost {
    type Handle;

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Handle;

    fn clear_timeout(&self, handle: Self::Handle);
}

/// Shared flag used to stop a [`FrameLoop`] from outside its owner.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Repeating per-frame task.
///
/// Each frame callback runs `on_frame` and then requests the next frame.
/// Cancelling (directly, through a cloned token, or by dropping the loop)
/// stops rescheduling; [`FrameLoop::cancel`] and drop also withdraw the
/// pending request from the host.
pub struct FrameLoop<H: FrameHost> {
    inner: Rc<LoopInner<H>>,
}

struct LoopInner<H: FrameHost> {
    host: H,
    token: CancellationToken,
    pending: RefCell<Option<H::Handle>>,
    on_frame: RefCell<Box<dyn FnMut(f64)>>,
    frames: Cell<u64>,
}

impl<H: FrameHost + 'static> FrameLoop<H> {
    pub fn start<F>(host: H, on_frame: F) -> Self
    where
        F: FnMut(f64) + 'static,
    {
        Self::with_token(host, CancellationToken::new(), on_frame)
    }

    pub fn with_token<F>(host: H, token: CancellationToken, on_frame: F) -> Self
    where
        F: FnMut(f64) + 'static,
    {
        let inner = Rc::new(LoopInner {
            host,
            token,
            pending: RefCell::new(None),
            on_frame: RefCell::new(Box::new(on_frame)),
            frames: Cell::new(0),
        });
        debug!("frame loop started");
        schedule_next(&inner);
        Self { inner }
    }

    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Number of frames delivered to `on_frame` so far.
    pub fn frames(&self) -> u64 {
        self.inner.frames.get()
    }

    pub fn is_running(&self) -> bool {
        !self.inner.token.is_cancelled()
    }

    pub fn cancel(&self) {
        let already = self.inner.token.is_cancelled();
        self.inner.token.cancel();
        let pending = self.inner.pending.borrow_mut().take();
        if let Some(handle) = pending {
            self.inner.host.cancel_frame(handle);
        }
        if !already {
            debug!(frames = self.frames(), "frame loop cancelled");
        }
    }
}

impl<H: FrameHost> Drop for FrameLoop<H> {
    fn drop(&mut self) {
        self.inner.token.cancel();
        let pending = self.inner.pending.borrow_mut().take();
        if let Some(handle) = pending {
            self.inner.host.cancel_frame(handle);
        }
    }
}

fn schedule_next<H: FrameHost + 'static>(inner: &Rc<LoopInner<H>>) {
    if inner.token.is_cancelled() {
        return;
    }
    let weak: Weak<LoopInner<H>> = Rc::downgrade(inner);
    let handle = inner.host.request_frame(Box::new(move |timestamp| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        inner.pending.borrow_mut().take();
        if inner.token.is_cancelled() {
            return;
        }
        (inner.on_frame.borrow_mut())(timestamp);
        inner.frames.set(inner.frames.get() + 1);
        schedule_next(&inner);
    }));
    *inner.pending.borrow_mut() = Some(handle);
}

/// A single pending delay that is cancelled and re-armed on every restart.
///
/// A callback only runs if no restart or cancel happened after it was armed.
pub struct RestartableTimeout<H: TimerHost> {
    host: H,
    slot: Rc<TimeoutSlot<H::Handle>>,
}

struct TimeoutSlot<T> {
    // Kept until the next restart/cancel, even after firing.
    handle: RefCell<Option<T>>,
    generation: Cell<u64>,
    armed: Cell<bool>,
}

impl<H: TimerHost> RestartableTimeout<H>
where
    H::Handle: 'static,
{
    pub fn new(host: H) -> Self {
        Self {
            host,
            slot: Rc::new(TimeoutSlot {
                handle: RefCell::new(None),
                generation: Cell::new(0),
                armed: Cell::new(false),
            }),
        }
    }

    pub fn restart<F>(&self, delay: Duration, on_expire: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel();
        let generation = self.slot.generation.get();
        let slot = Rc::downgrade(&self.slot);
        let handle = self.host.set_timeout(
            delay,
            Box::new(move || {
                let Some(slot) = slot.upgrade() else {
                    return;
                };
                if slot.generation.get() != generation || !slot.armed.get() {
                    return;
                }
                slot.armed.set(false);
                on_expire();
            }),
        );
        *self.slot.handle.borrow_mut() = Some(handle);
        self.slot.armed.set(true);
    }

    /// Withdraws the pending callback. Returns whether one was still armed.
    pub fn cancel(&self) -> bool {
        let was_armed = self.slot.armed.replace(false);
        self.slot.generation.set(self.slot.generation.get().wrapping_add(1));
        let handle = self.slot.handle.borrow_mut().take();
        if let Some(handle) = handle {
            self.host.clear_timeout(handle);
        }
        was_armed
    }

    pub fn is_pending(&self) -> bool {
        self.slot.armed.get()
    }
}

impl<H: TimerHost> Drop for RestartableTimeout<H> {
    fn drop(&mut self) {
        self.slot.armed.set(false);
        let handle = self.slot.handle.borrow_mut().take();
        if let Some(handle) = handle {
            self.host.clear_timeout(handle);
        }
    }
}
