//! Engine error type.
//!
//! Every variant here is a *fatal* fault: it indicates the simulation has
//! violated one of its own invariants and must abort.  Recoverable conditions
//! (an infeasible route, a job that misses its deadline) are ordinary return
//! values, never errors — see `cartage-plan`.
//!
//! Sub-crates may define their own error enums for their recoverable surfaces
//! and keep `EngineError` for the fatal paths; both patterns are acceptable.

use thiserror::Error;

use crate::{CartId, JobId, SimTime};

/// Fatal faults that abort the simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An event was scheduled strictly before the current simulated time.
    #[error("cannot schedule at {requested} before current time {now}")]
    PastSchedule { now: SimTime, requested: SimTime },

    /// An agent was resumed outside the single-directive yield protocol
    /// (resumed again after reporting completion).
    #[error("agent resumed after completion: single-directive yield protocol violated")]
    BadYield,

    /// A load or unload at execution time would breach a cart's physical
    /// limits.  The planner only emits routes it has verified, so this means
    /// planner and executor have diverged.
    #[error("cart {cart} with payload {payload}/{capacity} cannot move {quantity} items")]
    CapacityViolation {
        cart:     CartId,
        payload:  u32,
        capacity: u32,
        quantity: u32,
    },

    /// A job was completed a second time.
    #[error("job {0} completed a second time")]
    DoubleComplete(JobId),

    /// A published plan refers to a cart that is not in the fleet.
    #[error("plan refers to unknown cart {0}")]
    UnknownCart(CartId),
}

/// Shorthand result type for all engine crates.
pub type EngineResult<T> = Result<T, EngineError>;
