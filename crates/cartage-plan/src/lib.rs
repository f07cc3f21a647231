//! `cartage-plan` — route enumeration and combinatorial job assignment.
//!
//! # Crate layout
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`combinations`] | Lexicographic k-subset enumeration                    |
//! | [`trie`]         | Permutation trie over action orderings                |
//! | [`route`]        | `Action`, `ActionKind`, `Route`                       |
//! | [`planner`]      | `RoutePlanner` — best route for one cart + slate      |
//! | [`assigner`]     | `Assignment`, `AssignmentPlanner`, `JobAssigner`      |
//! | [`merge`]        | Reconcile a new plan with authoritative assignments   |
//! | [`error`]        | `PlanError`, `PlanResult`                             |
//!
//! # Cost model
//!
//! Everything here consumes the injected [`Estimator`] as a pure function:
//! planning has no side effects and is idempotent on a snapshot.
//!
//! [`Estimator`]: cartage_core::Estimator

pub mod assigner;
pub mod combinations;
pub mod error;
pub mod merge;
pub mod planner;
pub mod route;
pub mod trie;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use assigner::{Assignment, AssignmentPlanner, JobAssigner};
pub use combinations::combinations;
pub use error::{PlanError, PlanResult};
pub use merge::merge;
pub use planner::RoutePlanner;
pub use route::{Action, ActionKind, Route};
pub use trie::{TrieNode, build_trie};
