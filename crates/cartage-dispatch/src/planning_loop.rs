//! `PlanningLoopDispatcher` — periodic global replanning.
//!
//! A dedicated planning agent cycles for the life of the simulation:
//! snapshot the world, sleep out the planning interval (which also models
//! the planner's own latency), run the assigner against the stale snapshot,
//! merge the result with whatever reality has become in the meantime, then
//! publish and wake every driver.
//!
//! Publication is atomic from the drivers' point of view: `current_plan` and
//! `current_plan_time` are both written before anyone is woken.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cartage_core::{CartId, Duration, EngineResult, JobId, SimTime};
use cartage_fleet::{Cart, Job, SharedEnvironment};
use cartage_kernel::{
    Agent, AgentHandle, Condition, Directive, Step, Timeline, handle, resumed_after_done,
};
use cartage_plan::{AssignmentPlanner, merge};

use crate::dispatcher::{Dispatcher, alarm};

struct PlanShared {
    shutting_down: bool,
    /// The published plan: per-cart job lists, merged against authority.
    current_plan: BTreeMap<CartId, Vec<JobId>>,
    current_plan_time: SimTime,
}

pub struct PlanningLoopDispatcher {
    timeline:            Timeline,
    env:                 SharedEnvironment,
    planner:             Rc<dyn AssignmentPlanner>,
    planning_start_time: SimTime,
    planning_interval:   Duration,
    shared:              Rc<RefCell<PlanShared>>,
    job_available:       Condition,
    new_plan:            Condition,
}

impl PlanningLoopDispatcher {
    pub fn new(
        timeline: Timeline,
        env: SharedEnvironment,
        planner: Rc<dyn AssignmentPlanner>,
        planning_start_time: SimTime,
        planning_interval: Duration,
    ) -> Self {
        PlanningLoopDispatcher {
            timeline,
            env,
            planner,
            planning_start_time,
            planning_interval,
            shared:        Rc::new(RefCell::new(PlanShared {
                shutting_down:     false,
                current_plan:      BTreeMap::new(),
                // No plan yet: every driver's first wait must park.
                current_plan_time: SimTime::NEVER,
            })),
            job_available: Condition::new(),
            new_plan:      Condition::new(),
        }
    }
}

impl Dispatcher for PlanningLoopDispatcher {
    fn wait_for_next_plan(&self, last_seen: SimTime) -> Option<Directive> {
        let shared = self.shared.borrow();
        if last_seen >= shared.current_plan_time && !shared.shutting_down {
            Some(self.new_plan.sleep())
        } else {
            None
        }
    }

    fn newer_plan_available(&self, last_seen: SimTime) -> bool {
        last_seen < self.shared.borrow().current_plan_time
    }

    fn current_plan_time(&self) -> SimTime {
        self.shared.borrow().current_plan_time
    }

    fn get_plan(&self, cart: &Cart, jobs: &BTreeMap<JobId, Job>) -> Vec<Job> {
        let unfiltered = self
            .shared
            .borrow()
            .current_plan
            .get(&cart.id)
            .cloned()
            .unwrap_or_default();

        // The plan may be stale: keep only jobs that still exist and are
        // either unclaimed or already ours.
        let filtered: Vec<Job> = unfiltered
            .iter()
            .filter_map(|job_id| jobs.get(job_id))
            .filter(|job| job.assigned_to.is_none() || job.assigned_to == Some(cart.id))
            .cloned()
            .collect();

        if let Some(trace) = self.env.borrow().trace() {
            let kept: Vec<JobId> = filtered.iter().map(|job| job.id).collect();
            trace.cart_plan_is(cart, &unfiltered, &kept);
        }
        filtered
    }

    fn introduce_job(&self, job: Job, at: SimTime) -> AgentHandle {
        let env = Rc::clone(&self.env);
        let job_available = self.job_available.clone();
        alarm(&self.timeline, at, move || {
            env.borrow_mut().add_job(job);
            job_available.wake_one()
        })
    }

    fn planning_loop(&self) -> Option<AgentHandle> {
        Some(handle(PlanningAgent {
            timeline:            self.timeline.clone(),
            env:                 Rc::clone(&self.env),
            planner:             Rc::clone(&self.planner),
            planning_start_time: self.planning_start_time,
            planning_interval:   self.planning_interval,
            shared:              Rc::clone(&self.shared),
            new_plan:            self.new_plan.clone(),
            state:               PlanningState::Snapshot,
        }))
    }

    fn shutdown_at(&self, at: SimTime) -> AgentHandle {
        let shared = Rc::clone(&self.shared);
        alarm(&self.timeline, at, move || {
            shared.borrow_mut().shutting_down = true;
            Ok(())
        })
    }

    fn is_shutting_down(&self) -> bool {
        self.shared.borrow().shutting_down
    }
}

// ── Planning agent ────────────────────────────────────────────────────────────

enum PlanningState {
    /// Top of a cycle: snapshot the world and sleep out the interval.
    Snapshot,
    /// Resumed at plan-ready time with the cycle's snapshots in hand.
    Publish {
        fleet: BTreeMap<CartId, Cart>,
        jobs:  BTreeMap<JobId, Job>,
    },
    Finished,
}

struct PlanningAgent {
    timeline:            Timeline,
    env:                 SharedEnvironment,
    planner:             Rc<dyn AssignmentPlanner>,
    planning_start_time: SimTime,
    planning_interval:   Duration,
    shared:              Rc<RefCell<PlanShared>>,
    new_plan:            Condition,
    state:               PlanningState,
}

impl Agent for PlanningAgent {
    fn resume(&mut self) -> EngineResult<Step> {
        loop {
            match std::mem::replace(&mut self.state, PlanningState::Finished) {
                PlanningState::Snapshot => {
                    if self.shared.borrow().shutting_down {
                        return Ok(Step::Done);
                    }
                    if let Some(trace) = self.env.borrow().trace() {
                        trace.planner_started();
                    }

                    let (fleet, jobs) = {
                        let env = self.env.borrow();
                        (env.cart_snapshot(), env.job_snapshot())
                    };

                    // Pace the loop and model planning latency in one step.
                    let ready = self
                        .planning_start_time
                        .max(self.timeline.now() + self.planning_interval);

                    self.state = PlanningState::Publish { fleet, jobs };
                    return Ok(Step::Yield(self.timeline.until(ready)));
                }

                PlanningState::Publish { fleet, jobs } => {
                    let now = self.timeline.now();
                    let plan = self.planner.create_assignment(&jobs, &fleet, now);

                    // Merge against *authoritative* state, not the snapshot:
                    // drivers kept working while we planned.
                    let merged = {
                        let env = self.env.borrow();
                        merge(env.fleet(), env.jobs(), &plan)?
                    };

                    {
                        let mut shared = self.shared.borrow_mut();
                        shared.current_plan = merged;
                        shared.current_plan_time = now;
                    }

                    if let Some(trace) = self.env.borrow().trace() {
                        trace.planner_finished();
                    }
                    // Both fields are published; now it is safe to wake.
                    self.new_plan.wake_all()?;

                    self.state = PlanningState::Snapshot;
                }

                PlanningState::Finished => return Err(resumed_after_done()),
            }
        }
    }
}
