//! Timer primitive
//!
//! The session has exactly one concurrency primitive: single-shot delayed
//! wakeups that can be cancelled. Everything time-driven (countdowns, the
//! solved-group display) is built from it.
//!
//! # Architecture
//!
//! - [`Scheduler`] — schedules a wakeup tagged with the owning [`Phase`]
//! - [`Countdown`] — owned 1-second-granularity countdown handle
//! - [`Delay`] — owned single-shot wait
//! - [`ManualScheduler`] — virtual clock for tests and scripted replays
//!
//! The production scheduler lives in [`crate::runtime`]. A wakeup is
//! delivered back to the controller as a [`TimerFired`]; a handle only acts
//! on the id it is currently waiting for, so a cancelled or superseded wakeup
//! can never reach a phase it no longer belongs to.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::experiment::Phase;

/// Countdown granularity.
pub const TICK: Duration = Duration::from_secs(1);

/// Opaque, monotonically increasing timer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Wraps a raw id. Schedulers must never reuse a value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A wakeup delivered back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    /// Which wakeup fired
    pub id: TimerId,
    /// Phase that scheduled it
    pub owner: Phase,
}

/// Schedules single-shot wakeups.
///
/// Implementations deliver a [`TimerFired`] once `delay` has elapsed unless
/// [`cancel`](Scheduler::cancel) was called first. Cancelling an unknown or
/// already-fired id is a no-op.
pub trait Scheduler {
    /// Schedules a wakeup after `delay` on behalf of `owner`.
    fn schedule(&mut self, delay: Duration, owner: Phase) -> TimerId;

    /// Cancels a pending wakeup.
    fn cancel(&mut self, id: TimerId);
}

// ============================================================================
// Countdown
// ============================================================================

/// Result of routing a wakeup to a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// The wakeup was not the one this countdown is waiting for
    Stale,
    /// One second elapsed; `remaining` seconds are left
    Tick {
        /// Seconds left after this tick
        remaining: u32,
    },
    /// The countdown reached zero; it is now inactive
    Expired,
}

/// A 1-second-granularity countdown.
///
/// Holds at most one pending wakeup. After [`cancel`](Self::cancel) or
/// expiry it is inactive and every further delivery is
/// [`CountdownStep::Stale`].
#[derive(Debug)]
pub struct Countdown {
    owner: Phase,
    remaining: u32,
    pending: Option<TimerId>,
}

impl Countdown {
    /// Starts counting down from `seconds`.
    ///
    /// Expiry arrives `seconds` ticks after the start. A zero-length
    /// countdown still waits for its first tick before expiring.
    pub fn start(seconds: u32, owner: Phase, scheduler: &mut dyn Scheduler) -> Self {
        let pending = Some(scheduler.schedule(TICK, owner));
        Self {
            owner,
            remaining: seconds,
            pending,
        }
    }

    /// Routes a wakeup to this countdown.
    pub fn on_fired(&mut self, id: TimerId, scheduler: &mut dyn Scheduler) -> CountdownStep {
        if self.pending != Some(id) {
            return CountdownStep::Stale;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.pending = None;
            CountdownStep::Expired
        } else {
            self.pending = Some(scheduler.schedule(TICK, self.owner));
            CountdownStep::Tick {
                remaining: self.remaining,
            }
        }
    }

    /// Stops the countdown. Idempotent.
    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }

    /// Seconds left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether a tick is still pending.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.pending.is_some()
    }
}

// ============================================================================
// Delay
// ============================================================================

/// A single-shot wait owned by one phase.
#[derive(Debug)]
pub struct Delay {
    pending: Option<TimerId>,
}

impl Delay {
    /// Schedules the wait.
    pub fn start(delay: Duration, owner: Phase, scheduler: &mut dyn Scheduler) -> Self {
        Self {
            pending: Some(scheduler.schedule(delay, owner)),
        }
    }

    /// Returns `true` (once) if `id` is the wakeup this delay waits for.
    pub fn on_fired(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Abandons the wait. Idempotent.
    pub fn cancel(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel(id);
        }
    }

    /// Whether the wakeup is still pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

// ============================================================================
// Manual scheduler
// ============================================================================

/// Deterministic virtual-clock scheduler.
///
/// Time only moves when the owner pops due wakeups. Wakeups due at the same
/// instant fire in scheduling order.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Phase>,
    due_at: HashMap<TimerId, Duration>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of wakeups still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pops the earliest wakeup due at or before `deadline`, moving the clock
    /// to its due time.
    pub fn pop_until(&mut self, deadline: Duration) -> Option<TimerFired> {
        let (&(due, id), _) = self.queue.first_key_value()?;
        if due > deadline {
            return None;
        }
        let owner = self.queue.remove(&(due, id))?;
        self.due_at.remove(&id);
        self.now = self.now.max(due);
        Some(TimerFired { id, owner })
    }

    /// Moves the clock forward without firing anything.
    ///
    /// Callers pop every wakeup due before `to` first.
    pub fn set_now(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, owner: Phase) -> TimerId {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);
        let due = self.now + delay;
        self.queue.insert((due, id), owner);
        self.due_at.insert(id, due);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(due) = self.due_at.remove(&id) {
            self.queue.remove(&(due, id));
        }
    }
}
