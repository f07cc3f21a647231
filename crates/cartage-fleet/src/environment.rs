//! The `Environment` — authoritative registry of fleet and jobs.
//!
//! # Ownership
//!
//! The environment owns the fleet and job containers as ordered maps keyed by
//! id.  Drivers mutate the live registry through the lifecycle methods here;
//! planners only ever see [`cart_snapshot`][Environment::cart_snapshot] /
//! [`job_snapshot`][Environment::job_snapshot] deep copies, so planning can
//! never observe a concurrent mutation mid-route.
//!
//! Every lifecycle transition notifies the optional trace sink.

use std::collections::BTreeMap;
use std::rc::Rc;

use cartage_core::{CartId, EngineError, EngineResult, Estimator, JobId};

use crate::{BreakState, Cart, Job, JobKind, Trace, TransferState};

/// Authoritative simulation state: fleet, live jobs, and the outcome ledgers.
pub struct Environment {
    estimator:       Rc<dyn Estimator>,
    trace:           Option<Rc<dyn Trace>>,
    fleet:           BTreeMap<CartId, Cart>,
    jobs:            BTreeMap<JobId, Job>,
    successful_jobs: Vec<Job>,
    failed_jobs:     Vec<Job>,
}

impl Environment {
    pub fn new(estimator: Rc<dyn Estimator>, trace: Option<Rc<dyn Trace>>) -> Self {
        Environment {
            estimator,
            trace,
            fleet:           BTreeMap::new(),
            jobs:            BTreeMap::new(),
            successful_jobs: Vec::new(),
            failed_jobs:     Vec::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn estimator(&self) -> Rc<dyn Estimator> {
        Rc::clone(&self.estimator)
    }

    pub fn trace(&self) -> Option<Rc<dyn Trace>> {
        self.trace.clone()
    }

    pub fn fleet(&self) -> &BTreeMap<CartId, Cart> {
        &self.fleet
    }

    pub fn jobs(&self) -> &BTreeMap<JobId, Job> {
        &self.jobs
    }

    pub fn cart(&self, id: CartId) -> Option<&Cart> {
        self.fleet.get(&id)
    }

    pub fn cart_mut(&mut self, id: CartId) -> Option<&mut Cart> {
        self.fleet.get_mut(&id)
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn successful_jobs(&self) -> &[Job] {
        &self.successful_jobs
    }

    pub fn failed_jobs(&self) -> &[Job] {
        &self.failed_jobs
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    /// Deep copy of the fleet for planning.
    pub fn cart_snapshot(&self) -> BTreeMap<CartId, Cart> {
        self.fleet.clone()
    }

    /// Deep copy of the live jobs.  Assignment back-links are ids, so they
    /// survive the copy and resolve against the matching cart snapshot.
    pub fn job_snapshot(&self) -> BTreeMap<JobId, Job> {
        self.jobs.clone()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Register a cart.  Idempotent: a second cart with a known id is
    /// ignored.
    pub fn add_cart(&mut self, cart: Cart) {
        self.fleet.entry(cart.id).or_insert(cart);
    }

    /// Register a job and announce it.
    pub fn add_job(&mut self, job: Job) {
        if let Some(trace) = &self.trace {
            trace.job_introduced(&job);
        }
        self.jobs.insert(job.id, job);
    }

    /// Attach `cart` to the job and, for a transfer, flip it to `Enroute`
    /// (called at pickup completion).
    pub fn assign_job(&mut self, job_id: JobId, cart: CartId) {
        if let Some(job) = self.jobs.get_mut(&job_id) {
            job.assigned_to = Some(cart);
            if let JobKind::Transfer { state, .. } = &mut job.kind {
                *state = TransferState::Enroute;
            }
            if let Some(trace) = &self.trace {
                trace.job_assigned(job);
            }
        }
    }

    /// Mark an out-of-service job as underway.
    pub fn suspend_job(&mut self, job_id: JobId) {
        if let Some(job) = self.jobs.get_mut(&job_id)
            && let JobKind::OutOfService { state, .. } = &mut job.kind
        {
            *state = BreakState::OnBreak;
        }
    }

    /// Move a job from the live registry to the successful ledger.
    ///
    /// Removing is remove-if-present; completing a job that is *already*
    /// successful fails with [`EngineError::DoubleComplete`].
    pub fn complete_job(&mut self, job_id: JobId) -> EngineResult<()> {
        if self.successful_jobs.iter().any(|j| j.id == job_id) {
            return Err(EngineError::DoubleComplete(job_id));
        }
        if let Some(job) = self.jobs.remove(&job_id) {
            if let Some(trace) = &self.trace {
                trace.job_succeeded(&job);
            }
            self.successful_jobs.push(job);
        }
        Ok(())
    }

    /// Move a job from the live registry to the failed ledger.
    /// No-op for a job that has already left the registry.
    pub fn fail_job(&mut self, job_id: JobId) {
        if let Some(job) = self.jobs.remove(&job_id) {
            if let Some(trace) = &self.trace {
                trace.job_failed(&job);
            }
            self.failed_jobs.push(job);
        }
    }
}

/// Shared handle to the environment; agents keep a clone each.
pub type SharedEnvironment = Rc<std::cell::RefCell<Environment>>;

/// Wrap an environment for sharing across agents.
pub fn shared(env: Environment) -> SharedEnvironment {
    Rc::new(std::cell::RefCell::new(env))
}
