//! Jobs: transfer and out-of-service work items.

use cartage_core::{CartId, JobId, LocationId, SimTime};

// ── States ────────────────────────────────────────────────────────────────────

/// Progress of a transfer job.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransferState {
    /// Items are still waiting at the pickup location.
    BeforePickup,
    /// Items are on a cart; only the dropoff remains.
    Enroute,
}

/// Progress of an out-of-service job.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BreakState {
    /// The cart has not yet suspended service.
    BeforeBreak,
    /// The cart is suspended and will resume at `resume_time`.
    OnBreak,
}

// ── Job ───────────────────────────────────────────────────────────────────────

/// The two kinds of work a cart can be given.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JobKind {
    /// Move `quantity` items from one location to another inside a time
    /// window.  Invariant: `pickup_after <= dropoff_before`.
    Transfer {
        quantity: u32,
        pickup_location: LocationId,
        /// Items are not available before this time.
        pickup_after: SimTime,
        dropoff_location: LocationId,
        /// The job fails if the dropoff finishes after this time.
        dropoff_before: SimTime,
        state: TransferState,
    },

    /// Take the cart out of service at a location for a time window
    /// (an operator break, a recharge).  Invariant:
    /// `suspend_time <= resume_time`.
    OutOfService {
        suspend_location: LocationId,
        /// The cart must arrive no later than this.
        suspend_time: SimTime,
        /// Service resumes at exactly this time.
        resume_time: SimTime,
        state: BreakState,
    },
}

/// A unit of work in the registry.
///
/// The back-reference to the serving cart is an id looked up in the fleet
/// registry, never an owning pointer, so snapshots are plain deep clones.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Job {
    pub id:          JobId,
    pub assigned_to: Option<CartId>,
    pub kind:        JobKind,
}

impl Job {
    /// `true` once a driver has started working the job.
    pub fn started(&self) -> bool {
        match &self.kind {
            JobKind::Transfer { state, .. } => *state == TransferState::Enroute,
            JobKind::OutOfService { state, .. } => *state == BreakState::OnBreak,
        }
    }
}

// ── JobFactory ────────────────────────────────────────────────────────────────

/// Issues jobs with sequential ids.
#[derive(Default)]
pub struct JobFactory {
    next_id: u32,
}

impl JobFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transfer job in its initial state.
    ///
    /// # Panics
    /// Panics in debug mode if `quantity == 0` or the window is inverted.
    pub fn transfer(
        &mut self,
        quantity: u32,
        pickup_location: LocationId,
        pickup_after: SimTime,
        dropoff_location: LocationId,
        dropoff_before: SimTime,
    ) -> Job {
        debug_assert!(quantity > 0, "transfer quantity must be positive");
        debug_assert!(pickup_after <= dropoff_before, "transfer window is inverted");
        Job {
            id: self.issue(),
            assigned_to: None,
            kind: JobKind::Transfer {
                quantity,
                pickup_location,
                pickup_after,
                dropoff_location,
                dropoff_before,
                state: TransferState::BeforePickup,
            },
        }
    }

    /// An out-of-service job in its initial state.
    ///
    /// # Panics
    /// Panics in debug mode if the window is inverted.
    pub fn out_of_service(
        &mut self,
        suspend_location: LocationId,
        suspend_time: SimTime,
        resume_time: SimTime,
    ) -> Job {
        debug_assert!(suspend_time <= resume_time, "break window is inverted");
        Job {
            id: self.issue(),
            assigned_to: None,
            kind: JobKind::OutOfService {
                suspend_location,
                suspend_time,
                resume_time,
                state: BreakState::BeforeBreak,
            },
        }
    }

    fn issue(&mut self) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        id
    }
}
