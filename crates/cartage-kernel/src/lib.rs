//! `cartage-kernel` — the single-threaded cooperative scheduler.
//!
//! # Execution model
//!
//! Exactly one agent executes at a time; agents interleave only at yield
//! points.  The two suspension primitives are:
//!
//! - [`Timeline::until`] — resume at a future simulated time;
//! - [`Condition::sleep`] — resume when another agent signals.
//!
//! Everything else is synchronous.  No pre-emption, no atomics, no locks:
//! shared structures are `Rc<RefCell<…>>` and no borrow is ever held across
//! an agent resumption.
//!
//! # Crate layout
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`agent`]     | `Agent`, `Step`, `Directive`, `start`                |
//! | [`timeline`]  | `Timeline` — ordered resume queue + simulated clock  |
//! | [`condition`] | `Condition` — sleep / wake-one / wake-all with credit|

pub mod agent;
pub mod condition;
pub mod timeline;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use agent::{Agent, AgentHandle, Directive, Step, handle, resumed_after_done, start};
pub use condition::Condition;
pub use timeline::Timeline;
