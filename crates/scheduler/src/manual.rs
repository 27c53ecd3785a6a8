//! Hosts driven explicitly by the caller instead of a real event loop.
//!
//! Used by the headless renderer and by tests: frames are delivered by
//! [`ManualFrames::advance`] and timers fire when [`ManualTimers::advance`]
//! moves the virtual clock past their deadline.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::{FrameHost, TimerHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualFrameHandle(u64);

#[derive(Clone, Default)]
pub struct ManualFrames {
    state: Rc<RefCell<FrameQueue>>,
}

#[derive(Default)]
struct FrameQueue {
    next_id: u64,
    callbacks: Vec<(u64, Box<dyn FnOnce(f64)>)>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `timestamp` to every callback requested before this call.
    /// Returns how many callbacks ran.
    pub fn advance(&self, timestamp: f64) -> usize {
        let due = std::mem::take(&mut self.state.borrow_mut().callbacks);
        let count = due.len();
        for (_, callback) in due {
            callback(timestamp);
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().callbacks.len()
    }
}

impl FrameHost for ManualFrames {
    type Handle = ManualFrameHandle;

    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) -> Self::Handle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.callbacks.push((id, callback));
        ManualFrameHandle(id)
    }

    fn cancel_frame(&self, handle: Self::Handle) {
        self.state
            .borrow_mut()
            .callbacks
            .retain(|(id, _)| *id != handle.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualTimerHandle(u64);

#[derive(Clone, Default)]
pub struct ManualTimers {
    state: Rc<RefCell<TimerQueue>>,
}

#[derive(Default)]
struct TimerQueue {
    now: Duration,
    next_id: u64,
    timers: Vec<PendingTimer>,
}

struct PendingTimer {
    id: u64,
    deadline: Duration,
    callback: Box<dyn FnOnce()>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Moves the clock forward by `by`, firing due timers in deadline order.
    /// Timers armed by a firing callback run too if they fall inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().now + by;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.deadline <= target)
                    .min_by_key(|(_, timer)| (timer.deadline, timer.id))
                    .map(|(index, _)| index);
                due.map(|index| {
                    let timer = state.timers.remove(index);
                    state.now = timer.deadline;
                    timer.callback
                })
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
    }
}

impl TimerHost for ManualTimers {
    type Handle = ManualTimerHandle;

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Handle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let deadline = state.now + delay;
        state.timers.push(PendingTimer {
            id,
            deadline,
            callback,
        });
        ManualTimerHandle(id)
    }

    fn clear_timeout(&self, handle: Self::Handle) {
        self.state
            .borrow_mut()
            .timers
            .retain(|timer| timer.id != handle.0);
    }
}
