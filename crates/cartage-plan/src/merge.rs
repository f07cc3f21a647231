//! Merge a freshly computed assignment with authoritative state.
//!
//! The planner worked from a snapshot; by the time its plan is published,
//! drivers may have picked jobs up or completed them.  The merge reconciles
//! the two: authority wins for anything already in flight, and the plan only
//! contributes jobs that still exist and are still unassigned.

use std::collections::BTreeMap;

use cartage_core::{CartId, EngineError, EngineResult, JobId};
use cartage_fleet::{Cart, Job};

use crate::assigner::Assignment;

/// Produce the per-cart job lists that become the published plan.
///
/// - Every cart in `fleet` appears, with an empty list by default.
/// - Every job already assigned to a cart lands on that cart's list.
/// - Plan jobs are appended only if still present in `jobs` and unassigned.
/// - A plan referring to a cart outside the fleet fails with
///   [`EngineError::UnknownCart`].
pub fn merge(
    fleet: &BTreeMap<CartId, Cart>,
    jobs: &BTreeMap<JobId, Job>,
    plan: &[Assignment],
) -> EngineResult<BTreeMap<CartId, Vec<JobId>>> {
    let mut merged: BTreeMap<CartId, Vec<JobId>> =
        fleet.keys().map(|&cart| (cart, Vec::new())).collect();

    // Authoritative assignments first: these jobs are already in flight.
    for job in jobs.values() {
        if let Some(cart) = job.assigned_to
            && let Some(list) = merged.get_mut(&cart)
        {
            list.push(job.id);
        }
    }

    for assignment in plan {
        let Some(list) = merged.get_mut(&assignment.cart) else {
            return Err(EngineError::UnknownCart(assignment.cart));
        };
        for &job_id in &assignment.jobs {
            // Jobs that finished or were claimed since the snapshot are
            // silently dropped from the plan.
            if let Some(job) = jobs.get(&job_id)
                && job.assigned_to.is_none()
            {
                list.push(job_id);
            }
        }
    }

    Ok(merged)
}
