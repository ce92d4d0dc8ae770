//! Global simulation clock and ordered event queue.
//!
//! The clock is the single timeline of the engine: every asset, equipment,
//! and port process "suspends" by scheduling its next event here and
//! returning. Events at the same timestamp execute in insertion order, which
//! keeps runs with the same seed byte-for-byte reproducible.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::event::{Event, EventKind};
use super::types::{EventId, SimError};

/// Heap entry. Ordered so that the binary max-heap pops the earliest time
/// first, breaking ties by insertion sequence (FIFO).
#[derive(Debug)]
struct Pending {
    time_h: f64,
    id: EventId,
    kind: EventKind,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Pending {}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: earliest time, then lowest id, wins.
        other
            .time_h
            .total_cmp(&self.time_h)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Simulation clock owning the pending-event queue.
///
/// Time is in hours and monotonically non-decreasing. Scheduling into the
/// past is an engine defect and fails with [`SimError::InvalidTime`].
///
/// # Examples
///
/// ```
/// use wfo_sim::sim::clock::Clock;
/// use wfo_sim::sim::event::EventKind;
///
/// let mut clock = Clock::new();
/// clock
///     .schedule(5.0, EventKind::DispatchCheck { equipment: 0, periodic: true })
///     .expect("future time");
/// let event = clock.advance().expect("one pending event");
/// assert_eq!(event.time_h, 5.0);
/// assert_eq!(clock.now(), 5.0);
/// ```
#[derive(Debug)]
pub struct Clock {
    now_h: f64,
    next_id: u64,
    queue: BinaryHeap<Pending>,
    cancelled: HashSet<EventId>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    /// Creates a clock at time zero with an empty queue.
    pub fn new() -> Self {
        Self {
            now_h: 0.0,
            next_id: 0,
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
        }
    }

    /// Current simulation time in hours.
    pub fn now(&self) -> f64 {
        self.now_h
    }

    /// Number of queue entries, including not-yet-skipped cancelled ones.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Schedules an event at `time_h` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTime`] if `time_h` is before the current
    /// time or not a finite number.
    pub fn schedule(&mut self, time_h: f64, kind: EventKind) -> Result<EventId, SimError> {
        if !(time_h >= self.now_h) || !time_h.is_finite() {
            return Err(SimError::InvalidTime {
                now: self.now_h,
                requested: time_h,
            });
        }
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.queue.push(Pending { time_h, id, kind });
        Ok(id)
    }

    /// Cancels a still-pending event. Cancelling an id that already fired
    /// has no effect on the timeline.
    pub fn cancel(&mut self, id: EventId) {
        self.cancelled.insert(id);
    }

    fn drop_cancelled_head(&mut self) {
        while let Some(head) = self.queue.peek() {
            if self.cancelled.remove(&head.id) {
                self.queue.pop();
            } else {
                break;
            }
        }
    }

    /// Time of the next live event, if any.
    pub fn peek_time(&mut self) -> Option<f64> {
        self.drop_cancelled_head();
        self.queue.peek().map(|p| p.time_h)
    }

    /// Pops the earliest live event and advances the clock to its time.
    pub fn advance(&mut self) -> Option<Event> {
        self.drop_cancelled_head();
        let head = self.queue.pop()?;
        self.now_h = head.time_h;
        Some(Event {
            id: head.id,
            time_h: head.time_h,
            kind: head.kind,
        })
    }

    /// Pops the earliest live event only if it fires at or before `horizon_h`.
    pub fn advance_through(&mut self, horizon_h: f64) -> Option<Event> {
        match self.peek_time() {
            Some(t) if t <= horizon_h => self.advance(),
            _ => None,
        }
    }
}
