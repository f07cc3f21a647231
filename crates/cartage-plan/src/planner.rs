//! `RoutePlanner` — enumerate and score every feasible route for one cart
//! and a small slate of jobs.
//!
//! # Algorithm
//!
//! Each job contributes exactly two **slots** (see [`slots_from_jobs`]) so
//! the permutation trie's even/odd pairing rule lines up with
//! pickup-before-dropoff.  The planner walks the trie depth-first, simulating
//! the action sequence against a cloned [`RouteState`] per branch; an action
//! that violates a constraint prunes that subtree only.  Every complete leaf
//! is a feasible route; the one with the smallest working time wins, ties
//! broken by first discovery.
//!
//! The simulation is pure given pure estimators: two searches over the same
//! snapshot at the same time return the same best route.

use std::rc::Rc;

use cartage_core::{Duration, Estimator, LocationId, SimTime};
use cartage_fleet::{BreakState, Cart, Job, JobKind, TransferState};

use crate::error::{PlanError, PlanResult};
use crate::route::{Action, ActionKind, Route};
use crate::trie::{TrieNode, build_trie};

// ── Slots ─────────────────────────────────────────────────────────────────────

/// One trie slot: a real action, or a terminator filling the second slot of
/// a job that has already passed its first action.
enum Slot {
    Do(Action),
    Terminator,
}

/// Expand a slate into its 2-slots-per-job form.
fn slots_from_jobs(jobs: &[Job]) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(jobs.len() * 2);
    for job in jobs {
        match &job.kind {
            JobKind::Transfer {
                quantity,
                pickup_location,
                pickup_after,
                dropoff_location,
                dropoff_before,
                state,
            } => {
                let dropoff = Action {
                    job: job.id,
                    location: *dropoff_location,
                    kind: ActionKind::Dropoff { time: *dropoff_before, quantity: *quantity },
                };
                match state {
                    TransferState::BeforePickup => {
                        slots.push(Slot::Do(Action {
                            job: job.id,
                            location: *pickup_location,
                            kind: ActionKind::Pickup { time: *pickup_after, quantity: *quantity },
                        }));
                        slots.push(Slot::Do(dropoff));
                    }
                    // Items already on board: only the dropoff remains.
                    TransferState::Enroute => {
                        slots.push(Slot::Do(dropoff));
                        slots.push(Slot::Terminator);
                    }
                }
            }
            JobKind::OutOfService { suspend_location, suspend_time, resume_time, state } => {
                match state {
                    BreakState::BeforeBreak => {
                        slots.push(Slot::Do(Action {
                            job: job.id,
                            location: *suspend_location,
                            kind: ActionKind::Suspend {
                                suspend_time: *suspend_time,
                                resume_time: *resume_time,
                            },
                        }));
                        slots.push(Slot::Terminator);
                    }
                    // Break already underway: nothing left for the route.
                    BreakState::OnBreak => {
                        slots.push(Slot::Terminator);
                        slots.push(Slot::Terminator);
                    }
                }
            }
        }
    }
    slots
}

// ── RouteState ────────────────────────────────────────────────────────────────

/// Simulated cart state threaded through one candidate action sequence.
#[derive(Clone)]
struct RouteState {
    time:              SimTime,
    location:          LocationId,
    payload:           u32,
    working_time:      Duration,
    quantity_unloaded: u32,
}

impl RouteState {
    fn from_cart(cart: &Cart, time: SimTime) -> Self {
        RouteState {
            time,
            location:          cart.last_known_location,
            payload:           cart.payload,
            working_time:      0,
            quantity_unloaded: 0,
        }
    }
}

// ── RoutePlanner ──────────────────────────────────────────────────────────────

/// Exhaustive route search for one cart and up to `max_jobs` jobs.
pub struct RoutePlanner {
    max_jobs: usize,
    estimator: Rc<dyn Estimator>,
    /// Permutation trie over `2 * max_jobs` slots, built once and reused.
    trie: Vec<TrieNode>,
}

impl RoutePlanner {
    pub fn new(max_jobs: usize, estimator: Rc<dyn Estimator>) -> Self {
        RoutePlanner { max_jobs, estimator, trie: build_trie(max_jobs * 2) }
    }

    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }

    /// The feasible route with the smallest working time, or `None` if no
    /// ordering of the slate's actions satisfies every constraint.
    pub fn get_best_route(
        &self,
        cart: &Cart,
        jobs: &[Job],
        time: SimTime,
    ) -> PlanResult<Option<Route>> {
        if jobs.len() > self.max_jobs {
            return Err(PlanError::TooManyJobs {
                cart: cart.id,
                got: jobs.len(),
                max: self.max_jobs,
            });
        }

        let slots = slots_from_jobs(jobs);
        let state = RouteState::from_cart(cart, time);
        let mut best: Option<Route> = None;
        self.search(&self.trie, cart, &state, &slots, &mut Vec::new(), &mut best);
        Ok(best)
    }

    /// Depth-first walk over the trie.  `head` carries the real actions
    /// placed so far; `prev` is the simulated state after them.
    fn search(
        &self,
        nodes: &[TrieNode],
        cart: &Cart,
        prev: &RouteState,
        slots: &[Slot],
        head: &mut Vec<Action>,
        best: &mut Option<Route>,
    ) {
        let mut is_leaf = true;
        for node in nodes {
            // Slots beyond the actual slate size exist only because the trie
            // is built for the maximum; skip them.
            if node.key >= slots.len() {
                continue;
            }
            is_leaf = false;

            match &slots[node.key] {
                Slot::Terminator => {
                    self.search(&node.children, cart, prev, slots, head, best);
                }
                Slot::Do(action) => {
                    let mut state = prev.clone();
                    if !self.apply_action(cart.capacity, &mut state, action) {
                        continue; // constraint violated: prune this subtree
                    }
                    head.push(*action);
                    self.search(&node.children, cart, &state, slots, head, best);
                    head.pop();
                }
            }
        }

        if is_leaf {
            let better = match best {
                None => true,
                Some(route) => prev.working_time < route.working_time,
            };
            if better {
                let score = if prev.working_time > 0 {
                    f64::from(prev.quantity_unloaded) / prev.working_time as f64
                } else {
                    0.0
                };
                *best = Some(Route {
                    cart: cart.id,
                    actions: head.clone(),
                    working_time: prev.working_time,
                    score,
                });
            }
        }
    }

    /// Simulate one action.  Returns `false` when a constraint is violated;
    /// these are pruning signals, never surfaced as errors.
    fn apply_action(&self, capacity: u32, state: &mut RouteState, action: &Action) -> bool {
        let action_start = state.time;

        // Drive to the action's location first, whatever the action is.
        if action.location != state.location {
            let transit =
                self.estimator.transit_time(state.location, action.location, state.time);
            state.time += transit;
            state.location = action.location;
            // Suspend transit is working time even though the idle that
            // follows is not; pickup/dropoff fold transit into the final
            // end-minus-start accounting below.
            if matches!(action.kind, ActionKind::Suspend { .. }) {
                state.working_time += transit;
            }
        }

        match action.kind {
            ActionKind::Pickup { time, quantity } => {
                // Items may not be ready yet: wait out the window.
                if time > state.time {
                    state.time = time;
                }
                state.time += self.estimator.load_time(action.location, quantity, state.time);
                state.payload += quantity;
                if state.payload > capacity {
                    return false;
                }
                state.working_time += state.time - action_start;
                true
            }
            ActionKind::Dropoff { time, quantity } => {
                state.time += self.estimator.unload_time(action.location, quantity, state.time);
                if quantity > state.payload {
                    return false; // would go negative
                }
                state.payload -= quantity;
                state.quantity_unloaded += quantity;
                if state.time > time {
                    return false; // deadline missed
                }
                state.working_time += state.time - action_start;
                true
            }
            ActionKind::Suspend { suspend_time, resume_time } => {
                if state.time > suspend_time {
                    return false; // arrived too late to suspend
                }
                // Idle until service resumes; idle is not working time.
                if state.time < resume_time {
                    state.time = resume_time;
                }
                true
            }
        }
    }
}
