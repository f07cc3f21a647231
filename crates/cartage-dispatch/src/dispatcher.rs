//! The `Dispatcher` contract and the one-shot alarm agent both dispatchers
//! are built from.

use std::collections::BTreeMap;

use cartage_core::{EngineResult, JobId, SimTime};
use cartage_fleet::{Cart, Job};
use cartage_kernel::{Agent, AgentHandle, Directive, Step, Timeline, handle, resumed_after_done};

/// What a driver needs from whoever hands out work.
///
/// Both dispatcher variants implement this; drivers hold `Rc<dyn Dispatcher>`
/// and never know which one they are talking to.
pub trait Dispatcher {
    /// A directive that suspends the caller until a plan newer than
    /// `last_seen` exists or shutdown is requested — or `None` when the
    /// caller should continue immediately (a newer plan is already there).
    fn wait_for_next_plan(&self, last_seen: SimTime) -> Option<Directive>;

    /// `true` when a plan newer than `last_seen` has been published.
    fn newer_plan_available(&self, last_seen: SimTime) -> bool;

    /// Publication time of the current plan.
    fn current_plan_time(&self) -> SimTime;

    /// The jobs `cart` should work on now: the cart's slice of the current
    /// plan, filtered down to jobs that are still in `jobs` and either
    /// unassigned or already assigned to this cart.
    fn get_plan(&self, cart: &Cart, jobs: &BTreeMap<JobId, Job>) -> Vec<Job>;

    /// An agent that reveals `job` to the environment at `at` and signals
    /// job availability.
    fn introduce_job(&self, job: Job, at: SimTime) -> AgentHandle;

    /// The dispatcher's planning agent, if it has one.
    fn planning_loop(&self) -> Option<AgentHandle>;

    /// An agent that raises the shutdown flag at `at`.
    fn shutdown_at(&self, at: SimTime) -> AgentHandle;

    fn is_shutting_down(&self) -> bool;
}

// ── Alarm agent ───────────────────────────────────────────────────────────────

enum AlarmState {
    Wait,
    Fire,
    Finished,
}

/// One-shot agent: suspend until a fixed time, run an action, finish.
/// `introduce_job` and `shutdown_at` are both alarms.
struct Alarm {
    timeline: Timeline,
    at:       SimTime,
    action:   Option<Box<dyn FnOnce() -> EngineResult<()>>>,
    state:    AlarmState,
}

impl Agent for Alarm {
    fn resume(&mut self) -> EngineResult<Step> {
        match self.state {
            AlarmState::Wait => {
                self.state = AlarmState::Fire;
                Ok(Step::Yield(self.timeline.until(self.at)))
            }
            AlarmState::Fire => {
                self.state = AlarmState::Finished;
                if let Some(action) = self.action.take() {
                    action()?;
                }
                Ok(Step::Done)
            }
            AlarmState::Finished => Err(resumed_after_done()),
        }
    }
}

/// Build an alarm agent for `timeline` firing `action` at `at`.
pub(crate) fn alarm(
    timeline: &Timeline,
    at: SimTime,
    action: impl FnOnce() -> EngineResult<()> + 'static,
) -> AgentHandle {
    handle(Alarm {
        timeline: timeline.clone(),
        at,
        action:   Some(Box::new(action)),
        state:    AlarmState::Wait,
    })
}
