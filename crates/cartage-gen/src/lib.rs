//! `cartage-gen` — scenario generators and job loaders.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`transfer`] | `TransferGenerator` — random arrivals and connections    |
//! | [`staffing`] | `StaffingPlan` — shifts → carts + break jobs             |
//! | [`loader`]   | CSV transfer-job loader                                  |
//! | [`error`]    | `GenError`, `GenResult`                                  |
//!
//! Both generators run their schedules on a private [`Timeline`], exercising
//! the same cooperative kernel as the simulation proper.  All randomness
//! flows from an explicit seed; a fixed seed reproduces the exact scenario.
//!
//! [`Timeline`]: cartage_kernel::Timeline

pub mod error;
pub mod loader;
pub mod staffing;
pub mod transfer;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GenError, GenResult};
pub use loader::{load_transfers_csv, load_transfers_reader};
pub use staffing::{
    Break, Crew, Interval, Shift, StaffingPlan, adjust_shift, contains, interval, standard_shift,
};
pub use transfer::{Arrival, Departure, TransferConfig, TransferGenerator, Turnaround};
