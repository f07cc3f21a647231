//! `Timeline` — the ordered resume queue that drives the simulated clock.
//!
//! # Why a sequence number
//!
//! [`BinaryHeap`] offers no stability guarantee, but agents scheduled for the
//! same simulated time must resume in insertion order: dispatchers publish a
//! plan and wake drivers in a deliberate sequence, and reordering equal-time
//! events would reshuffle who gets which job.  Every event therefore carries
//! a monotone sequence number and orders by `(time, seq)`.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use cartage_core::{EngineError, EngineResult, SimTime};

use crate::agent::{AgentHandle, Directive, start};

// ── Event ─────────────────────────────────────────────────────────────────────

/// A scheduled resumption: at `time`, resume `agent` once.
struct Event {
    time: SimTime,
    /// Insertion counter; breaks ties so equal times pop FIFO.
    seq: u64,
    agent: AgentHandle,
}

// Ordering is inverted so the std max-heap surfaces the earliest event first.
// The agent handle takes no part in comparisons.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for Event {}

// ── Timeline ──────────────────────────────────────────────────────────────────

struct TimelineState {
    heap:     BinaryHeap<Event>,
    next_seq: u64,
    now:      SimTime,
}

/// The discrete-event queue and simulated clock.
///
/// Cheap to clone: all clones share one queue.  Agents hold a clone and call
/// [`Timeline::until`] to obtain suspension directives; the owner of the
/// simulation calls [`Timeline::run`] once everything is spawned.
#[derive(Clone)]
pub struct Timeline {
    state: Rc<RefCell<TimelineState>>,
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            state: Rc::new(RefCell::new(TimelineState {
                heap:     BinaryHeap::new(),
                next_seq: 0,
                now:      SimTime::ZERO,
            })),
        }
    }

    /// The current simulated time.  Monotonically non-decreasing.
    pub fn now(&self) -> SimTime {
        self.state.borrow().now
    }

    /// Number of pending events.
    pub fn pending(&self) -> usize {
        self.state.borrow().heap.len()
    }

    /// Enqueue `agent` for resumption at `time`.
    ///
    /// Scheduling at exactly the current time is allowed (the event runs
    /// after everything already queued for that instant); scheduling strictly
    /// earlier fails with [`EngineError::PastSchedule`].
    pub fn schedule(&self, time: SimTime, agent: AgentHandle) -> EngineResult<()> {
        let mut state = self.state.borrow_mut();
        if time < state.now {
            return Err(EngineError::PastSchedule {
                now: state.now,
                requested: time,
            });
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Event { time, seq, agent });
        Ok(())
    }

    /// A directive that, when yielded, schedules the yielding agent to
    /// resume at `time`.
    pub fn until(&self, time: SimTime) -> Directive {
        let timeline = self.clone();
        Directive::new(move |agent| timeline.schedule(time, agent))
    }

    /// Pop events in `(time, insertion)` order, advancing the clock to each
    /// event's time and resuming its agent once.  Returns when the queue is
    /// empty; a fatal error from any agent aborts the run.
    pub fn run(&self) -> EngineResult<()> {
        loop {
            // Pop under a short borrow: the resumed agent will re-borrow the
            // timeline to schedule its next step.
            let event = {
                let mut state = self.state.borrow_mut();
                match state.heap.pop() {
                    None => return Ok(()),
                    Some(event) => {
                        state.now = event.time;
                        event
                    }
                }
            };
            start(event.agent)?;
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
