//! `SimpleDispatcher` — no planner, one job per cart per wakeup.
//!
//! Introduced jobs go onto a stack of unallocated work; each `wake_one`
//! rouses one idle driver, which pops at most one job.  There is never a
//! published plan, so drivers are never pre-empted mid-route.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cartage_core::{JobId, SimTime};
use cartage_fleet::{Cart, Job, SharedEnvironment};
use cartage_kernel::{AgentHandle, Condition, Directive, Timeline};

use crate::dispatcher::{Dispatcher, alarm};

struct SimpleShared {
    shutting_down: bool,
    /// LIFO stack of jobs nobody has claimed yet.
    unallocated: Vec<JobId>,
}

pub struct SimpleDispatcher {
    timeline:      Timeline,
    env:           SharedEnvironment,
    shared:        Rc<RefCell<SimpleShared>>,
    job_available: Condition,
}

impl SimpleDispatcher {
    pub fn new(timeline: Timeline, env: SharedEnvironment) -> Self {
        SimpleDispatcher {
            timeline,
            env,
            shared: Rc::new(RefCell::new(SimpleShared {
                shutting_down: false,
                unallocated:   Vec::new(),
            })),
            job_available: Condition::new(),
        }
    }

    /// Waiters currently parked for work (for tests).
    pub fn idle_drivers(&self) -> usize {
        self.job_available.waiter_count()
    }
}

impl Dispatcher for SimpleDispatcher {
    fn wait_for_next_plan(&self, _last_seen: SimTime) -> Option<Directive> {
        if self.shared.borrow().shutting_down {
            None
        } else {
            Some(self.job_available.sleep())
        }
    }

    fn newer_plan_available(&self, _last_seen: SimTime) -> bool {
        // There is no plan; a driver only re-checks work when it wakes.
        false
    }

    fn current_plan_time(&self) -> SimTime {
        self.timeline.now()
    }

    fn get_plan(&self, cart: &Cart, jobs: &BTreeMap<JobId, Job>) -> Vec<Job> {
        let mut slate = Vec::new();
        let popped = self.shared.borrow_mut().unallocated.pop();
        if let Some(job_id) = popped
            && let Some(job) = jobs.get(&job_id)
        {
            slate.push(job.clone());
        }

        if let Some(trace) = self.env.borrow().trace() {
            let ids: Vec<JobId> = slate.iter().map(|job| job.id).collect();
            trace.cart_plan_is(cart, &ids, &ids);
        }
        slate
    }

    fn introduce_job(&self, job: Job, at: SimTime) -> AgentHandle {
        let env = Rc::clone(&self.env);
        let shared = Rc::clone(&self.shared);
        let job_available = self.job_available.clone();
        alarm(&self.timeline, at, move || {
            let job_id = job.id;
            env.borrow_mut().add_job(job);
            shared.borrow_mut().unallocated.push(job_id);
            job_available.wake_one()
        })
    }

    fn planning_loop(&self) -> Option<AgentHandle> {
        None
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
