//! Routes and the actions they are made of.

use std::fmt;

use cartage_core::{CartId, Duration, JobId, LocationId, SimTime};

// ── Action ────────────────────────────────────────────────────────────────────

/// What a cart does at one stop of a route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Load `quantity` items, not before `time`.
    Pickup { time: SimTime, quantity: u32 },
    /// Unload `quantity` items, finishing no later than `time`.
    Dropoff { time: SimTime, quantity: u32 },
    /// Go out of service from arrival (no later than `suspend_time`) until
    /// `resume_time`.
    Suspend { suspend_time: SimTime, resume_time: SimTime },
}

/// One stop of a route: the job it serves, where, and what happens there.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub job:      JobId,
    pub location: LocationId,
    pub kind:     ActionKind,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActionKind::Pickup { time, quantity } => write!(
                f,
                "pickup {quantity} items at location {} after {} (job {})",
                self.location,
                time.format_hms(),
                self.job
            ),
            ActionKind::Dropoff { time, quantity } => write!(
                f,
                "dropoff {quantity} items at location {} before {} (job {})",
                self.location,
                time.format_hms(),
                self.job
            ),
            ActionKind::Suspend { suspend_time, resume_time } => write!(
                f,
                "suspend at location {} before {} until {} (job {})",
                self.location,
                suspend_time.format_hms(),
                resume_time.format_hms(),
                self.job
            ),
        }
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A feasible action sequence for one cart, with its cost.
#[derive(Clone, Debug)]
pub struct Route {
    pub cart: CartId,
    pub actions: Vec<Action>,
    /// Simulated seconds the cart spends working this route (driving,
    /// window waits, handling — suspend idle excluded).
    pub working_time: Duration,
    /// Items delivered per second of work; kept for observability only,
    /// route selection minimizes `working_time`.
    pub score: f64,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Route for cart {} (working time = {}, score = {:.3}):",
            self.cart, self.working_time, self.score
        )?;
        for action in &self.actions {
            writeln!(f, "    {action}")?;
        }
        Ok(())
    }
}
