//! The four pending-container ordering disciplines.

use chrono::{DateTime, Utc};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use super::message::Message;

/// Wraps a message for the `Priority` variant's max-heap: ordered by
/// `(priority, Reverse(created_at))` so higher priority pops first and,
/// within a priority, the older message pops first.
pub(crate) struct PriorityItem<P>(Message<P>);

impl<P> PriorityItem<P> {
    fn key(&self) -> (u8, Reverse<DateTime<Utc>>) {
        (self.0.priority as u8, Reverse(self.0.created_at))
    }
}

impl<P> PartialEq for PriorityItem<P> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl<P> Eq for PriorityItem<P> {}
impl<P> PartialOrd for PriorityItem<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<P> Ord for PriorityItem<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Wraps a message for the `Delay` variant's min-heap: ordered by
/// `(delay_until, created_at)` ascending, per the spec's tie-break
/// resolution of the source's undefined secondary heap order.
pub(crate) struct DelayItem<P>(Message<P>);

impl<P> DelayItem<P> {
    fn key(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.0.delay_until.unwrap_or(self.0.created_at),
            self.0.created_at,
        )
    }
}

impl<P> PartialEq for DelayItem<P> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl<P> Eq for DelayItem<P> {}
impl<P> PartialOrd for DelayItem<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<P> Ord for DelayItem<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// The pending-message container, one variant per `QueueType`.
pub(crate) enum PendingContainer<P> {
    Fifo(VecDeque<Message<P>>),
    Lifo(VecDeque<Message<P>>),
    Priority(BinaryHeap<PriorityItem<P>>),
    Delay(BinaryHeap<Reverse<DelayItem<P>>>),
}

impl<P> PendingContainer<P> {
    pub(crate) fn push(&mut self, message: Message<P>) {
        match self {
            PendingContainer::Fifo(q) => q.push_back(message),
            PendingContainer::Lifo(q) => q.push_back(message),
            PendingContainer::Priority(heap) => heap.push(PriorityItem(message)),
            PendingContainer::Delay(heap) => heap.push(Reverse(DelayItem(message))),
        }
    }

    /// Remove and return the next deliverable message, if any. For the
    /// `Delay` variant this returns `None` when the earliest-due message
    /// is still in the future rather than popping it.
    pub(crate) fn pop_ready(&mut self, now: DateTime<Utc>) -> Option<Message<P>> {
        match self {
            PendingContainer::Fifo(q) => q.pop_front(),
            PendingContainer::Lifo(q) => q.pop_back(),
            PendingContainer::Priority(heap) => heap.pop().map(|item| item.0),
            PendingContainer::Delay(heap) => match heap.peek() {
                Some(Reverse(item)) if item.0.is_ready(now) => heap.pop().map(|Reverse(i)| i.0),
                _ => None,
            },
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            PendingContainer::Fifo(q) | PendingContainer::Lifo(q) => q.len(),
            PendingContainer::Priority(heap) => heap.len(),
            PendingContainer::Delay(heap) => heap.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
