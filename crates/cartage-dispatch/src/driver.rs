//! `Driver` — the long-lived agent that runs one cart.
//!
//! # Service loop
//!
//! ```text
//! loop:
//!   wait for a plan (or continue at once if one is already newer)
//!   exit if shutting down
//!   fetch this cart's slate; empty → loop
//!   ask the route planner for the best sequence
//!     no feasible route / planner refusal → fail the slate's jobs, loop
//!   for each action:
//!     a newer plan pre-empts the rest of the route (checked between
//!     actions only — the current leg or load always runs to completion)
//!     drive hop by hop, suspending once per hop
//!     pickup: wait out the window, commit to the job, load
//!     dropoff: unload, complete the job
//!     suspend: go off service until the resume time, complete the job
//! ```
//!
//! The driver is written as an explicit state machine: every suspension
//! point is a `Phase` value naming what has just finished when the agent is
//! next resumed.

use std::rc::Rc;

use cartage_core::{CartId, EngineError, EngineResult, LocationId, SimTime};
use cartage_fleet::{Cart, Job, SharedEnvironment, Trace};
use cartage_kernel::{Agent, AgentHandle, Directive, Step, Timeline, handle, resumed_after_done};
use cartage_plan::{Action, ActionKind, Route, RoutePlanner};

use crate::dispatcher::Dispatcher;

// ── Driver ────────────────────────────────────────────────────────────────────

/// Factory for per-cart driver agents.
pub struct Driver {
    timeline:   Timeline,
    dispatcher: Rc<dyn Dispatcher>,
    env:        SharedEnvironment,
    planner:    Rc<RoutePlanner>,
}

impl Driver {
    pub fn new(
        timeline: Timeline,
        dispatcher: Rc<dyn Dispatcher>,
        env: SharedEnvironment,
        planner: Rc<RoutePlanner>,
    ) -> Self {
        Driver { timeline, dispatcher, env, planner }
    }

    /// The agent that will serve `cart` until shutdown.
    pub fn drive(&self, cart: CartId) -> AgentHandle {
        handle(DriverAgent {
            timeline:            self.timeline.clone(),
            dispatcher:          Rc::clone(&self.dispatcher),
            env:                 Rc::clone(&self.env),
            planner:             Rc::clone(&self.planner),
            cart,
            last_seen_plan_time: SimTime::NEVER,
            state:               DriverState::AwaitPlan,
        })
    }
}

// ── State machine ─────────────────────────────────────────────────────────────

enum DriverState {
    /// Top of the service loop: about to ask the dispatcher for work.
    AwaitPlan,
    /// Woken (or passed straight through) with a plan possibly available.
    PlanReady,
    /// Working `route`, currently at `index`, inside `phase`.
    Executing { route: Route, index: usize, phase: Phase },
    Finished,
}

enum Phase {
    /// About to begin the action at `index`: the pre-emption checkpoint.
    Begin,
    /// Driving toward the action's location; `departed` is set once the
    /// departure has been traced.
    Travel { departed: bool },
    /// Mid-hop; on resume the cart reaches `next`.
    Hop { next: LocationId, departed: bool },
    /// At the action's location with any window wait behind us.
    Handle,
    /// Loading; on resume the items are aboard.
    Loading,
    /// Unloading; on resume the items are off.
    Unloading,
    /// Out of service; on resume the break is over.
    OnBreak,
}

struct DriverAgent {
    timeline:            Timeline,
    dispatcher:          Rc<dyn Dispatcher>,
    env:                 SharedEnvironment,
    planner:             Rc<RoutePlanner>,
    cart:                CartId,
    last_seen_plan_time: SimTime,
    state:               DriverState,
}

impl Agent for DriverAgent {
    fn resume(&mut self) -> EngineResult<Step> {
        loop {
            match std::mem::replace(&mut self.state, DriverState::Finished) {
                DriverState::AwaitPlan => {
                    match self.dispatcher.wait_for_next_plan(self.last_seen_plan_time) {
                        Some(directive) => {
                            self.state = DriverState::PlanReady;
                            return Ok(Step::Yield(directive));
                        }
                        // A newer plan already exists: continue at once.
                        None => self.state = DriverState::PlanReady,
                    }
                }

                DriverState::PlanReady => {
                    if self.dispatcher.is_shutting_down() {
                        return Ok(Step::Done);
                    }
                    self.last_seen_plan_time = self.timeline.now();

                    let slate: Vec<Job> = {
                        let env = self.env.borrow();
                        self.dispatcher.get_plan(&env.fleet()[&self.cart], env.jobs())
                    };
                    if slate.is_empty() {
                        self.state = DriverState::AwaitPlan;
                        continue;
                    }

                    let route = {
                        let env = self.env.borrow();
                        self.planner.get_best_route(
                            &env.fleet()[&self.cart],
                            &slate,
                            self.timeline.now(),
                        )
                    };
                    match route {
                        Ok(Some(route)) => {
                            self.state = DriverState::Executing {
                                route,
                                index: 0,
                                phase: Phase::Begin,
                            };
                        }
                        // No feasible sequence (or an over-long slate): the
                        // slate cannot be served — fail it and move on.
                        Ok(None) | Err(_) => {
                            {
                                let mut env = self.env.borrow_mut();
                                for job in &slate {
                                    env.fail_job(job.id);
                                }
                            }
                            self.state = DriverState::AwaitPlan;
                        }
                    }
                }

                DriverState::Executing { route, index, phase } => {
                    match self.execute(&route, index, phase)? {
                        Flow::Suspend { index, phase, directive } => {
                            self.state = DriverState::Executing { route, index, phase };
                            return Ok(Step::Yield(directive));
                        }
                        Flow::Continue { index, phase } => {
                            self.state = DriverState::Executing { route, index, phase };
                        }
                        Flow::RouteOver => self.state = DriverState::AwaitPlan,
                    }
                }

                DriverState::Finished => return Err(resumed_after_done()),
            }
        }
    }
}

/// What one execution step decided.
enum Flow {
    Suspend { index: usize, phase: Phase, directive: Directive },
    Continue { index: usize, phase: Phase },
    RouteOver,
}

impl DriverAgent {
    /// Advance route execution by one sub-step.
    fn execute(&mut self, route: &Route, index: usize, phase: Phase) -> EngineResult<Flow> {
        let now = self.timeline.now();
        let Some(action) = route.actions.get(index) else {
            return Ok(Flow::RouteOver);
        };

        match phase {
            Phase::Begin => {
                // The pre-emption checkpoint: a newer plan abandons the
                // remainder of the route.
                if self.dispatcher.newer_plan_available(self.last_seen_plan_time) {
                    return Ok(Flow::RouteOver);
                }
                Ok(Flow::Continue { index, phase: Phase::Travel { departed: false } })
            }

            Phase::Travel { departed } => {
                let cart = self.cart_view();
                if cart.last_known_location == action.location {
                    return self.arrive_at_action(action, index, now);
                }

                if !departed
                    && let Some(trace) = self.trace()
                {
                    trace.cart_departs(&cart, action.location);
                }

                let estimator = self.env.borrow().estimator();
                let next = estimator.route_next_step(
                    cart.last_known_location,
                    action.location,
                    now,
                );
                // An estimator may answer with the origin itself: no way
                // forward from here.  Break out of the drive loop instead of
                // spinning on zero-length hops.
                if next == cart.last_known_location {
                    return self.arrive_at_action(action, index, now);
                }
                let hop_time =
                    estimator.transit_time(cart.last_known_location, next, now);
                Ok(Flow::Suspend {
                    index,
                    phase: Phase::Hop { next, departed: true },
                    directive: self.timeline.until(now + hop_time),
                })
            }

            Phase::Hop { next, departed } => {
                {
                    let mut env = self.env.borrow_mut();
                    if let Some(cart) = env.cart_mut(self.cart) {
                        cart.last_known_location = next;
                    }
                }
                let cart = self.cart_view();
                if let Some(trace) = self.trace() {
                    if cart.last_known_location == action.location {
                        trace.cart_arrives(&cart);
                    } else {
                        trace.cart_passes(&cart);
                    }
                }
                Ok(Flow::Continue { index, phase: Phase::Travel { departed } })
            }

            Phase::Handle => self.handle_action(action, index, now),

            Phase::Loading => {
                let quantity = match action.kind {
                    ActionKind::Pickup { quantity, .. } => quantity,
                    _ => 0,
                };
                {
                    let mut env = self.env.borrow_mut();
                    if let Some(cart) = env.cart_mut(self.cart) {
                        cart.payload += quantity;
                    }
                }
                if let Some(trace) = self.trace() {
                    trace.cart_finishes_loading(&self.cart_view());
                }
                Ok(Flow::Continue { index: index + 1, phase: Phase::Begin })
            }

            Phase::Unloading => {
                let quantity = match action.kind {
                    ActionKind::Dropoff { quantity, .. } => quantity,
                    _ => 0,
                };
                {
                    let mut env = self.env.borrow_mut();
                    if let Some(cart) = env.cart_mut(self.cart) {
                        cart.payload -= quantity;
                    }
                }
                if let Some(trace) = self.trace() {
                    trace.cart_finishes_unloading(&self.cart_view());
                }
                self.env.borrow_mut().complete_job(action.job)?;
                Ok(Flow::Continue { index: index + 1, phase: Phase::Begin })
            }

            Phase::OnBreak => {
                if let Some(trace) = self.trace() {
                    trace.cart_resumes_service(&self.cart_view());
                }
                self.env.borrow_mut().complete_job(action.job)?;
                Ok(Flow::Continue { index: index + 1, phase: Phase::Begin })
            }
        }
    }

    /// The cart is at the action's location; bridge any pickup window, then
    /// hand over to [`handle_action`][Self::handle_action].
    fn arrive_at_action(
        &mut self,
        action: &Action,
        index: usize,
        now: SimTime,
    ) -> EngineResult<Flow> {
        if let ActionKind::Pickup { time, .. } = action.kind
            && now < time
        {
            if let Some(trace) = self.trace() {
                trace.cart_waits(&self.cart_view(), time);
            }
            return Ok(Flow::Suspend {
                index,
                phase: Phase::Handle,
                directive: self.timeline.until(time),
            });
        }
        self.handle_action(action, index, now)
    }

    /// Begin the in-place part of the action (load, unload, or suspend).
    fn handle_action(&mut self, action: &Action, index: usize, now: SimTime) -> EngineResult<Flow> {
        match action.kind {
            ActionKind::Pickup { quantity, .. } => {
                let cart = self.cart_view();
                if cart.payload + quantity > cart.capacity {
                    return Err(EngineError::CapacityViolation {
                        cart: cart.id,
                        payload: cart.payload,
                        capacity: cart.capacity,
                        quantity,
                    });
                }

                // The cart is committed to this job from the moment loading
                // begins.
                self.env.borrow_mut().assign_job(action.job, self.cart);

                if let Some(trace) = self.trace() {
                    trace.cart_begins_loading(&cart, quantity);
                }
                let load_time = self
                    .env
                    .borrow()
                    .estimator()
                    .load_time(action.location, quantity, now);
                Ok(Flow::Suspend {
                    index,
                    phase: Phase::Loading,
                    directive: self.timeline.until(now + load_time),
                })
            }

            ActionKind::Dropoff { quantity, .. } => {
                let cart = self.cart_view();
                if quantity > cart.payload {
                    return Err(EngineError::CapacityViolation {
                        cart: cart.id,
                        payload: cart.payload,
                        capacity: cart.capacity,
                        quantity,
                    });
                }
                if let Some(trace) = self.trace() {
                    trace.cart_begins_unloading(&cart, quantity);
                }
                let unload_time = self
                    .env
                    .borrow()
                    .estimator()
                    .unload_time(action.location, quantity, now);
                Ok(Flow::Suspend {
                    index,
                    phase: Phase::Unloading,
                    directive: self.timeline.until(now + unload_time),
                })
            }

            ActionKind::Suspend { resume_time, .. } => {
                if let Some(trace) = self.trace() {
                    trace.cart_suspends_service(&self.cart_view());
                }
                self.env.borrow_mut().suspend_job(action.job);

                if now < resume_time {
                    if let Some(trace) = self.trace() {
                        trace.cart_waits(&self.cart_view(), resume_time);
                    }
                    Ok(Flow::Suspend {
                        index,
                        phase: Phase::OnBreak,
                        directive: self.timeline.until(resume_time),
                    })
                } else {
                    // Resume time already reached: no idle needed.
                    Ok(Flow::Continue { index, phase: Phase::OnBreak })
                }
            }
        }
    }

    // ── Small helpers ─────────────────────────────────────────────────────

    /// A copy of the cart's current state for reads and traces.
    fn cart_view(&self) -> Cart {
        self.env.borrow().fleet()[&self.cart].clone()
    }

    fn trace(&self) -> Option<Rc<dyn Trace>> {
        self.env.borrow().trace()
    }
}
