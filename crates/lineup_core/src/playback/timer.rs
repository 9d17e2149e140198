//! Advance timer and clocks
//!
//! The timer is plain data owned by the playback machine: a due time and a
//! kind. There is one slot, so arming always replaces whatever was pending.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds on a monotonic clock
pub type Millis = u64;

/// Source of monotonic time for a session
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall clock measured from construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock. Clones share the same time, so a test keeps one handle
/// and gives the other to the session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, delta_ms: Millis) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }

    pub fn set(&self, now_ms: Millis) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// What happens when the timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Move to the next item
    Advance,
    /// Hold on the last item has elapsed, stop playback
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTimer {
    pub due_at: Millis,
    pub kind: TimerKind,
    pub generation: u64,
}

/// Single-slot timer. `generation` increases on every arm and cancel.
#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    pending: Option<AdvanceTimer>,
    generation: u64,
    armed_total: u64,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Millis, delay: Millis, kind: TimerKind) -> AdvanceTimer {
        self.generation += 1;
        self.armed_total += 1;
        let timer = AdvanceTimer { due_at: now.saturating_add(delay), kind, generation: self.generation };
        self.pending = Some(timer);
        timer
    }

    pub fn cancel(&mut self) -> Option<AdvanceTimer> {
        let cancelled = self.pending.take();
        if cancelled.is_some() {
            self.generation += 1;
        }
        cancelled
    }

    pub fn pending(&self) -> Option<&AdvanceTimer> {
        self.pending.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// False once the slot has been re-armed or cancelled after `timer`
    pub fn is_current(&self, timer: &AdvanceTimer) -> bool {
        timer.generation == self.generation
    }

    /// Remove and return the pending timer if it is due at `now`. A pending
    /// timer from an older generation is dropped without firing.
    pub fn take_due(&mut self, now: Millis) -> Option<AdvanceTimer> {
        let timer = self.pending?;
        if !self.is_current(&timer) {
            log::warn!("Discarding stale timer (generation {} != {})", timer.generation, self.generation);
            self.pending = None;
            return None;
        }
        if timer.due_at > now {
            return None;
        }
        self.pending.take()
    }

    pub fn remaining(&self, now: Millis) -> Option<Millis> {
        self.pending.map(|t| t.due_at.saturating_sub(now))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of times the slot has been armed since construction
    pub fn armed_total(&self) -> u64 {
        self.armed_total
    }
}
