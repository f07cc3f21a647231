//! `cartage-core` — foundational types for the cartage fleet-routing engine.
//!
//! This crate is a dependency of every other `cartage-*` crate.  It
//! intentionally has no `cartage-*` dependencies and minimal external ones
//! (only `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                            |
//! |--------------|-----------------------------------------------------|
//! | [`ids`]      | `CartId`, `JobId`, `LocationId`                     |
//! | [`time`]     | `SimTime`, `Duration`, time constants, formatting   |
//! | [`error`]    | `EngineError`, `EngineResult`                       |
//! | [`estimate`] | `Estimator` trait, `LinearCorridor` model           |
//! | [`config`]   | `FleetConfig`                                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod config;
pub mod error;
pub mod estimate;
pub mod ids;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::FleetConfig;
pub use error::{EngineError, EngineResult};
pub use estimate::{Estimator, LinearCorridor};
pub use ids::{CartId, JobId, LocationId};
pub use time::{DAY, Duration, HOUR, INFINITE_WORK, MINUTE, SECOND, SimTime};
