//! `JobAssigner` — exhaustive combinatorial assignment of unassigned jobs
//! to carts.
//!
//! For every cart the assigner tries every combination of unassigned jobs
//! that fits alongside the cart's existing slate, scores each feasible slate
//! by its best route's working time, and then commits the cheapest
//! non-conflicting alternatives greedily.  Jobs committed once stay committed
//! for the life of the assigner, so successive planning cycles never churn a
//! job between carts before a driver has picked it up.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use cartage_core::{CartId, Duration, Estimator, INFINITE_WORK, JobId, SimTime};
use cartage_fleet::{Cart, Job};

use crate::combinations::combinations;
use crate::planner::RoutePlanner;

// ── Assignment ────────────────────────────────────────────────────────────────

/// A slate of jobs proposed for one cart, scored by expected working time
/// (lower is better).
#[derive(Clone, Debug)]
pub struct Assignment {
    pub cart:  CartId,
    pub jobs:  Vec<JobId>,
    pub score: Duration,
}

/// The seam between a dispatcher and whatever assignment strategy it runs.
pub trait AssignmentPlanner {
    /// Partition the snapshot's jobs across the snapshot's carts.
    ///
    /// Both maps are deep copies taken by the caller; implementations are
    /// free to call the route planner any number of times against them.
    fn create_assignment(
        &self,
        jobs: &BTreeMap<JobId, Job>,
        fleet: &BTreeMap<CartId, Cart>,
        time: SimTime,
    ) -> Vec<Assignment>;
}

// ── JobAssigner ───────────────────────────────────────────────────────────────

/// Exhaustive assigner backed by a [`RoutePlanner`].
pub struct JobAssigner {
    max_jobs: usize,
    planner: RoutePlanner,
    /// Jobs committed in any previous cycle; persists for the assigner's
    /// lifetime.
    committed: RefCell<BTreeSet<JobId>>,
}

impl JobAssigner {
    pub fn new(max_jobs: usize, estimator: Rc<dyn Estimator>) -> Self {
        JobAssigner {
            max_jobs,
            planner: RoutePlanner::new(max_jobs, estimator),
            committed: RefCell::new(BTreeSet::new()),
        }
    }
}

impl AssignmentPlanner for JobAssigner {
    fn create_assignment(
        &self,
        jobs: &BTreeMap<JobId, Job>,
        fleet: &BTreeMap<CartId, Cart>,
        time: SimTime,
    ) -> Vec<Assignment> {
        // ── Partition: per-cart existing slates and the unassigned pool ───
        let mut existing: Vec<(&Cart, Vec<Job>)> =
            fleet.values().map(|cart| (cart, Vec::new())).collect();
        let mut unassigned: Vec<Job> = Vec::new();

        for job in jobs.values() {
            match job.assigned_to {
                Some(cart_id) => {
                    if let Some((_, held)) =
                        existing.iter_mut().find(|(cart, _)| cart.id == cart_id)
                    {
                        held.push(job.clone());
                    }
                }
                None => unassigned.push(job.clone()),
            }
        }

        // ── Enumerate candidate slates per cart ───────────────────────────
        let mut alternatives: Vec<Assignment> = Vec::new();
        for (cart, held) in &existing {
            if held.len() >= self.max_jobs {
                // Cart is full: lock it with an unbeatable score so the
                // conflict filter reserves it without adding work.
                alternatives.push(Assignment {
                    cart: cart.id,
                    jobs: held.iter().map(|job| job.id).collect(),
                    score: INFINITE_WORK,
                });
                continue;
            }

            let max_new = self.max_jobs - held.len();
            for take in 1..=max_new {
                for combo in combinations(take, unassigned.len()) {
                    let mut slate: Vec<Job> = held.clone();
                    slate.extend(combo.iter().map(|&i| unassigned[i].clone()));

                    // Infeasible slates and planner refusals simply produce
                    // no candidate.
                    if let Ok(Some(route)) = self.planner.get_best_route(cart, &slate, time) {
                        alternatives.push(Assignment {
                            cart: cart.id,
                            jobs: slate.iter().map(|job| job.id).collect(),
                            score: route.working_time,
                        });
                    }
                }
            }
        }

        // ── Commit greedily, best (lowest) score first ────────────────────
        alternatives.sort_by_key(|alternative| alternative.score);

        let mut committed_jobs = self.committed.borrow_mut();
        let mut committed_carts: BTreeSet<CartId> = BTreeSet::new();
        let mut assignments = Vec::new();

        for alternative in alternatives {
            let conflicting = committed_carts.contains(&alternative.cart)
                || alternative.jobs.iter().any(|job| committed_jobs.contains(job));
            if conflicting {
                continue;
            }
            committed_carts.insert(alternative.cart);
            committed_jobs.extend(alternative.jobs.iter().copied());
            assignments.push(alternative);
        }

        assignments
    }
}
