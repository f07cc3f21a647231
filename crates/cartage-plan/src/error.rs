use cartage_core::CartId;
use thiserror::Error;

/// Recoverable planner faults.  Infeasibility is not an error — an infeasible
/// slate is an ordinary `Ok(None)` from the planner.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("slate of {got} jobs exceeds the {max}-job limit for cart {cart}")]
    TooManyJobs { cart: CartId, got: usize, max: usize },
}

pub type PlanResult<T> = Result<T, PlanError>;
