//! The `Estimator` trait — injected cost model for driving, loading and
//! unloading.
//!
//! The engine treats every method as a pure function of its arguments: the
//! route planner may call them any number of times while scoring candidate
//! routes, and calls carry no side effects.  Anything that actually knows the
//! facility's geometry (a road graph, a lookup table, a learned model) lives
//! behind this trait.

use crate::{Duration, LocationId, MINUTE, SECOND, SimTime};

/// Cost model consulted by the route planner and the drivers.
pub trait Estimator {
    /// Simulated seconds to drive from `origin` to `destination`, departing
    /// at `now`.
    fn transit_time(&self, origin: LocationId, destination: LocationId, now: SimTime)
    -> Duration;

    /// The next location on the way from `origin` to `destination`.
    /// Returning `destination` means the next hop completes the journey;
    /// returning `origin` means there is nowhere to go (already there).
    fn route_next_step(
        &self,
        origin: LocationId,
        destination: LocationId,
        now: SimTime,
    ) -> LocationId;

    /// Simulated seconds to load `quantity` items at `location`.
    fn load_time(&self, location: LocationId, quantity: u32, now: SimTime) -> Duration;

    /// Simulated seconds to unload `quantity` items at `location`.
    fn unload_time(&self, location: LocationId, quantity: u32, now: SimTime) -> Duration;
}

// ── LinearCorridor ────────────────────────────────────────────────────────────

/// Locations laid out on a line, one minute of driving per unit of distance.
///
/// The model behind the demo scenarios and most tests: carts step one
/// location per hop, loading costs 30 s per item and unloading 10 s per item
/// regardless of place or time of day.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearCorridor;

impl Estimator for LinearCorridor {
    fn transit_time(
        &self,
        origin: LocationId,
        destination: LocationId,
        _now: SimTime,
    ) -> Duration {
        Duration::from(destination.0.abs_diff(origin.0)) * MINUTE
    }

    fn route_next_step(
        &self,
        origin: LocationId,
        destination: LocationId,
        _now: SimTime,
    ) -> LocationId {
        use std::cmp::Ordering::*;
        match origin.0.cmp(&destination.0) {
            Less => LocationId(origin.0 + 1),
            Greater => LocationId(origin.0 - 1),
            Equal => origin,
        }
    }

    fn load_time(&self, _location: LocationId, quantity: u32, _now: SimTime) -> Duration {
        30 * SECOND * Duration::from(quantity)
    }

    fn unload_time(&self, _location: LocationId, quantity: u32, _now: SimTime) -> Duration {
        10 * SECOND * Duration::from(quantity)
    }
}
