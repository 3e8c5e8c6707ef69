//! Timer table for a session.
//!
//! Every timer lives in a named slot, so arming a slot that is already armed replaces
//! the old timer in one step. Nothing here runs on its own: the owner feeds in the
//! current time and pulls due timers one at a time with [`Scheduler::pop_due`].
//! [`Scheduler::teardown`] drops every timer and moves the scheduler to a new epoch,
//! so a handle captured before a transition can never fire after it.

use crate::target::TargetId;
use log::trace;
use std::collections::BTreeMap;

/// Milliseconds on the session clock.
pub type Millis = u64;

pub const CLOCK_PERIOD_MS: Millis = 1000;
pub const ESCALATION_PERIOD_MS: Millis = 3000;
pub const MAX_CONCURRENT_CEILING: usize = 15;
pub const DISAPPEAR_AFTER_MS: Millis = 500;
pub const FIRST_REACTION_DELAY_MS: (Millis, Millis) = (0, 10_000);
pub const NEXT_REACTION_DELAY_MS: (Millis, Millis) = (2_000, 10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerSlot {
    /// Elapsed-seconds clock.
    Clock,
    /// Periodic spawn ticker, or the one-shot reaction spawn delay.
    Spawn,
    /// Raises the concurrency cap.
    Escalation,
    /// Reaction target timeout.
    Disappear,
    /// Deferred removal of a target shown in its hit state.
    HitRemoval(TargetId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timer {
    due: Millis,
    period: Option<Millis>,
    target: Option<TargetId>,
    epoch: u64,
    seq: u64,
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub slot: TimerSlot,
    pub due: Millis,
    pub target: Option<TargetId>,
    pub epoch: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Millis,
    epoch: u64,
    seq: u64,
    timers: BTreeMap<TimerSlot, Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn catch_up(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    /// Arm a one-shot timer `delay` ms from now, replacing whatever held `slot`.
    pub fn arm_once(&mut self, slot: TimerSlot, delay: Millis, target: Option<TargetId>) {
        self.arm(slot, delay, None, target);
    }

    /// Arm a repeating timer, replacing whatever held `slot`.
    pub fn arm_every(&mut self, slot: TimerSlot, period: Millis) {
        self.arm(slot, period, Some(period.max(1)), None);
    }

    fn arm(&mut self, slot: TimerSlot, delay: Millis, period: Option<Millis>, target: Option<TargetId>) {
        self.seq += 1;
        let timer = Timer {
            due: self.now + delay,
            period,
            target,
            epoch: self.epoch,
            seq: self.seq,
        };
        trace!("arm {:?} due at {}ms", slot, timer.due);
        self.timers.insert(slot, timer);
    }

    pub fn cancel(&mut self, slot: TimerSlot) -> bool {
        self.timers.remove(&slot).is_some()
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.timers.contains_key(&slot)
    }

    pub fn due_at(&self, slot: TimerSlot) -> Option<Millis> {
        self.timers.get(&slot).map(|t| t.due)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every timer and invalidate the current epoch.
    pub fn teardown(&mut self) {
        if !self.timers.is_empty() {
            trace!("teardown of {} timers at epoch {}", self.timers.len(), self.epoch);
        }
        self.timers.clear();
        self.epoch += 1;
    }

    /// Earliest timer due at or before `until`, ties broken by arm order.
    ///
    /// The clock is moved to the timer's due time before returning, so anything the
    /// caller arms while handling it is relative to that moment. Repeating timers are
    /// rescheduled in place.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired> {
        loop {
            let (slot, timer) = self
                .timers
                .iter()
                .filter(|(_, t)| t.due <= until)
                .min_by_key(|(_, t)| (t.due, t.seq))
                .map(|(s, t)| (*s, *t))?;

            if timer.epoch != self.epoch {
                self.timers.remove(&slot);
                continue;
            }

            self.now = self.now.max(timer.due);
            match timer.period {
                Some(period) => {
                    self.seq += 1;
                    if let Some(t) = self.timers.get_mut(&slot) {
                        t.due += period;
                        t.seq = self.seq;
                    }
                }
                None => {
                    self.timers.remove(&slot);
                }
            }

            return Some(Fired {
                slot,
                due: timer.due,
                target: timer.target,
                epoch: timer.epoch,
            });
        }
    }
}
