//! `cartage-fleet` — carts, jobs, the authoritative registry, and trace
//! observers.
//!
//! # Crate layout
//!
//! | Module          | Contents                                             |
//! |-----------------|------------------------------------------------------|
//! | [`cart`]        | `Cart`, `CartFactory`                                |
//! | [`job`]         | `Job`, `JobKind`, job states, `JobFactory`           |
//! | [`environment`] | `Environment` registry, snapshots, lifecycle         |
//! | [`trace`]       | `Trace` observer trait, `TextTrace` line sink        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the entity types.         |

pub mod cart;
pub mod environment;
pub mod job;
pub mod trace;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cart::{Cart, CartFactory};
pub use environment::{Environment, SharedEnvironment, shared};
pub use job::{BreakState, Job, JobFactory, JobKind, TransferState};
pub use trace::{TextTrace, Trace};
