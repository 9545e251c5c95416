//! Ordered timer queue for the cooperative driver.
//!
//! Events are keyed on `(due, seq)`: the earliest deadline pops first and
//! events sharing a deadline pop in the order they were scheduled. Every
//! event is periodic; popping one reschedules it one period later.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::features::FeatureKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Advance one animation frame and render it.
    Frame,
    /// Issue one fetch for the stream's current index.
    Poll(FeatureKind),
}

/// A popped event and the offset from the schedule origin it was due at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueEvent {
    pub kind: EventKind,
    pub due: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    due: Duration,
    seq: u64,
    kind: EventKind,
    period: Duration,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a periodic event whose first occurrence is at `first_due`.
    ///
    /// A zero period is bumped to one microsecond so the queue always moves
    /// forward.
    pub fn schedule(&mut self, kind: EventKind, first_due: Duration, period: Duration) {
        let period = period.max(Duration::from_micros(1));
        self.push(kind, first_due, period);
    }

    fn push(&mut self, kind: EventKind, due: Duration, period: Duration) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due,
            seq,
            kind,
            period,
        }));
    }

    /// Deadline of the next event without removing it.
    pub fn peek_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Remove the earliest event and queue its next occurrence.
    pub fn pop(&mut self) -> Option<DueEvent> {
        let Reverse(entry) = self.queue.pop()?;
        self.push(entry.kind, entry.due + entry.period, entry.period);
        Some(DueEvent {
            kind: entry.kind,
            due: entry.due,
        })
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
