//! Top-level engine configuration.

use crate::{Duration, MINUTE, SimTime};

/// Knobs shared by the planner, the assigner, and the dispatchers.
///
/// Typically built in the application crate and handed to whichever
/// components need it; the engine itself holds no global configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetConfig {
    /// Hard cap on the number of jobs in one cart's slate, both when the
    /// planner enumerates routes and when the assigner builds candidate
    /// assignments.  Route enumeration is factorial in twice this number;
    /// 3 is the practical ceiling.
    pub max_jobs_per_cart: usize,

    /// Earliest simulated time a plan may be published.
    pub planning_start_time: SimTime,

    /// Pacing delay between planning cycles.  Also models the time the
    /// planner itself takes: a plan computed from a snapshot at `t` is
    /// published no earlier than `t + planning_interval`.
    pub planning_interval: Duration,

    /// Default capacity for newly created carts.
    pub cart_capacity: u32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            max_jobs_per_cart: 3,
            planning_start_time: SimTime::ZERO,
            planning_interval: 15 * MINUTE,
            cart_capacity: 10,
        }
    }
}
