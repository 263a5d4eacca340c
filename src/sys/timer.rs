//! Deferred tasks with explicit cancellation.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::actor::switcher;
use crate::common::collections::HashMap;
use crate::sys::shell::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    fn next() -> TimerId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TimerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// First paint of the overlay.
    InitialDelay,
    /// Fallback for a close request whose destroy notification never arrived.
    CheckDestroyed(WindowId),
}

pub trait Timers {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerId;
    /// Cancelling a timer that already fired is a no-op.
    fn cancel(&mut self, id: TimerId);
}

/// Delivers [`switcher::Event::TimerFired`] through the actor channel.
pub struct TokioTimers {
    tx: switcher::Sender,
    pending: HashMap<TimerId, CancellationToken>,
}

impl TokioTimers {
    pub fn new(tx: switcher::Sender) -> Self {
        Self { tx, pending: HashMap::default() }
    }
}

impl Timers for TokioTimers {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        self.pending.retain(|_, token| !token.is_cancelled());

        let id = TimerId::next();
        let token = CancellationToken::new();
        let child = token.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => trace!(?id, "timer cancelled"),
                _ = tokio::time::sleep(delay) => {
                    child.cancel();
                    tx.send(switcher::Event::TimerFired { id, kind });
                }
            }
        });
        self.pending.insert(id, token);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(token) = self.pending.remove(&id) {
            token.cancel();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, token) in self.pending.drain() {
            token.cancel();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub id: TimerId,
    pub delay: Duration,
    pub kind: TimerKind,
}

#[derive(Default, Debug)]
struct ManualState {
    pending: Vec<ScheduledTimer>,
    cancelled: Vec<TimerId>,
}

/// Timers that only fire when the owner says so. Clones share state.
#[derive(Clone, Default, Debug)]
pub struct ManualTimers {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTimers {
    pub fn new() -> Self { Self::default() }

    pub fn pending(&self) -> Vec<ScheduledTimer> { self.state.borrow().pending.clone() }

    pub fn cancelled(&self) -> Vec<TimerId> { self.state.borrow().cancelled.clone() }

    /// Removes and returns the oldest pending timer of `kind`, as if it had fired.
    pub fn fire(&self, kind: TimerKind) -> Option<ScheduledTimer> {
        let mut state = self.state.borrow_mut();
        let pos = state.pending.iter().position(|t| t.kind == kind)?;
        Some(state.pending.remove(pos))
    }
}

impl Timers for ManualTimers {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        let id = TimerId::next();
        self.state.borrow_mut().pending.push(ScheduledTimer { id, delay, kind });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.pending.iter().position(|t| t.id == id) {
            state.pending.remove(pos);
            state.cancelled.push(id);
        }
    }
}
