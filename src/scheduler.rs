//! A virtual-time timer queue.
//!
//! All timers of a replay share one queue and one clock. Timers fire in
//! order of their due time, and timers due at the same time fire in the
//! order they were scheduled.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Duration;

/// Key for ordering timers in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerKey {
    /// When the timer fires.
    due: Duration,
    /// Sequence number for FIFO ordering of timers due at the same time.
    sequence: u64,
}

impl Ord for TimerKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for TimerKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A queue of one-shot timers carrying a payload of type `T`.
#[derive(Debug)]
pub struct Scheduler<T> {
    /// The current time.
    now: Duration,
    /// The pending timers.
    timers: BTreeMap<TimerKey, T>,
    /// The next sequence number.
    sequence: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            timers: BTreeMap::new(),
            sequence: 0,
        }
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler at time zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// The current time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// The number of timers that haven't fired yet.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// When the next timer is due, if there is one.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.keys().next().map(|key| key.due)
    }

    /// Schedules `payload` to fire after `delay`.
    pub fn schedule(&mut self, delay: Duration, payload: T) {
        let key = TimerKey {
            due: self.now + delay,
            sequence: self.sequence,
        };
        self.sequence += 1;
        self.timers.insert(key, payload);
    }

    /// Pops the next timer due no later than `until`, moving the clock to its due time.
    ///
    /// Callers should pull timers one at a time, as handling a timer may schedule more.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let (key, _) = self.timers.first_key_value()?;
        if key.due > until {
            return None;
        }
        let (key, payload) = self.timers.pop_first()?;
        self.now = self.now.max(key.due);
        Some(payload)
    }

    /// Moves the clock forward to `time`. Has no effect if `time` is in the past.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}
