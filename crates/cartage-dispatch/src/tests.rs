//! Unit and scenario tests for cartage-dispatch.

use std::rc::Rc;

use cartage_core::{CartId, JobId, LinearCorridor, LocationId, SimTime};
use cartage_fleet::{
    CartFactory, Environment, JobFactory, SharedEnvironment, TextTrace, Trace, shared,
};
use cartage_kernel::{Timeline, start};
use cartage_plan::{JobAssigner, RoutePlanner};

use crate::{Dispatcher, Driver, PlanningLoopDispatcher, SimpleDispatcher};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Rig {
    timeline: Timeline,
    env: SharedEnvironment,
}

fn rig(trace: Option<Rc<dyn Trace>>) -> Rig {
    let timeline = Timeline::new();
    let env = shared(Environment::new(Rc::new(LinearCorridor), trace));
    Rig { timeline, env }
}

fn planner() -> Rc<RoutePlanner> {
    Rc::new(RoutePlanner::new(3, Rc::new(LinearCorridor)))
}

// ── SimpleDispatcher ──────────────────────────────────────────────────────────

#[cfg(test)]
mod simple_dispatcher {
    use super::*;

    #[test]
    fn idle_driver_parks_on_the_job_condition() {
        let rig = rig(None);
        let dispatcher =
            Rc::new(SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env)));
        let driver = Driver::new(
            rig.timeline.clone(),
            dispatcher.clone(),
            Rc::clone(&rig.env),
            planner(),
        );

        let mut carts = CartFactory::new();
        let cart = carts.cart(10, LocationId(0));
        rig.env.borrow_mut().add_cart(cart.clone());
        start(driver.drive(cart.id)).unwrap();

        assert_eq!(dispatcher.idle_drivers(), 1);
    }

    #[test]
    fn no_plan_is_ever_newer() {
        let rig = rig(None);
        let dispatcher = SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env));
        assert!(!dispatcher.newer_plan_available(SimTime::NEVER));
        assert_eq!(dispatcher.current_plan_time(), SimTime::ZERO);
    }

    #[test]
    fn get_plan_with_no_backlog_is_empty() {
        let rig = rig(None);
        let dispatcher = SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env));
        let mut carts = CartFactory::new();
        let cart = carts.cart(10, LocationId(0));

        let slate = dispatcher.get_plan(&cart, rig.env.borrow().jobs());
        assert!(slate.is_empty());
    }

    #[test]
    fn introduce_job_registers_and_queues_the_job() {
        let rig = rig(None);
        let dispatcher = SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env));
        let mut jobs = JobFactory::new();
        let job = jobs.transfer(
            5,
            LocationId(0),
            SimTime(5),
            LocationId(1),
            SimTime(700),
        );

        start(dispatcher.introduce_job(job, SimTime::ZERO)).unwrap();
        rig.timeline.run().unwrap();

        assert_eq!(rig.env.borrow().jobs().len(), 1);

        // The queued job is what the next cart gets.
        let mut carts = CartFactory::new();
        let cart = carts.cart(10, LocationId(0));
        let env = rig.env.borrow();
        let slate = dispatcher.get_plan(&cart, env.jobs());
        assert_eq!(slate.len(), 1);
        assert_eq!(slate[0].id, JobId(0));
    }

    #[test]
    fn backlog_is_served_newest_first() {
        let rig = rig(None);
        let dispatcher = SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env));
        let mut jobs = JobFactory::new();
        for _ in 0..2 {
            let job =
                jobs.transfer(1, LocationId(0), SimTime::ZERO, LocationId(1), SimTime::FOREVER);
            start(dispatcher.introduce_job(job, SimTime::ZERO)).unwrap();
        }
        rig.timeline.run().unwrap();

        let mut carts = CartFactory::new();
        let cart = carts.cart(10, LocationId(0));
        let env = rig.env.borrow();
        // LIFO: the most recently introduced job pops first.
        assert_eq!(dispatcher.get_plan(&cart, env.jobs())[0].id, JobId(1));
        assert_eq!(dispatcher.get_plan(&cart, env.jobs())[0].id, JobId(0));
    }

    #[test]
    fn shutdown_flag_rises_at_the_requested_time() {
        let rig = rig(None);
        let dispatcher = SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env));

        start(dispatcher.shutdown_at(SimTime::hm(0, 1))).unwrap();
        assert!(!dispatcher.is_shutting_down());

        rig.timeline.run().unwrap();
        assert!(dispatcher.is_shutting_down());
        assert_eq!(rig.timeline.now(), SimTime::hm(0, 1));
    }
}

// ── Driver recovery ───────────────────────────────────────────────────────────

#[cfg(test)]
mod driver_recovery {
    use super::*;

    #[test]
    fn infeasible_slate_fails_its_jobs_and_the_driver_moves_on() {
        let rig = rig(None);
        let dispatcher: Rc<dyn Dispatcher> =
            Rc::new(SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env)));
        let driver = Driver::new(
            rig.timeline.clone(),
            dispatcher.clone(),
            Rc::clone(&rig.env),
            planner(),
        );

        let mut carts = CartFactory::new();
        let cart = carts.cart(5, LocationId(0));
        rig.env.borrow_mut().add_cart(cart.clone());
        start(driver.drive(cart.id)).unwrap();

        // Ten items through a five-item cart: no feasible route exists.
        let mut jobs = JobFactory::new();
        let job =
            jobs.transfer(10, LocationId(1), SimTime::ZERO, LocationId(2), SimTime::FOREVER);
        start(dispatcher.introduce_job(job, SimTime::ZERO)).unwrap();
        start(dispatcher.shutdown_at(SimTime::hm(0, 5))).unwrap();

        rig.timeline.run().unwrap();

        let env = rig.env.borrow();
        assert!(env.successful_jobs().is_empty());
        assert_eq!(env.failed_jobs().len(), 1);
        assert_eq!(env.failed_jobs()[0].id, JobId(0));
        // The cart never moved or loaded anything.
        let cart = &env.fleet()[&CartId(0)];
        assert_eq!(cart.payload, 0);
        assert_eq!(cart.last_known_location, LocationId(0));
    }
}

// ── Hello scenario (simple dispatcher, end to end) ────────────────────────────

#[cfg(test)]
mod hello_scenario {
    use super::*;

    /// Three capacity-10 carts at location 0; four jobs at time zero; simple
    /// dispatch; shutdown at 00:59:00.  Every job terminates well before
    /// shutdown; with this fleet all four succeed.
    fn run_hello(trace: Option<Rc<dyn Trace>>) -> (Rig, Rc<dyn Dispatcher>) {
        let rig = rig(trace);
        let dispatcher: Rc<dyn Dispatcher> =
            Rc::new(SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env)));
        let driver = Driver::new(
            rig.timeline.clone(),
            dispatcher.clone(),
            Rc::clone(&rig.env),
            planner(),
        );

        let mut carts = CartFactory::new();
        for _ in 0..3 {
            let cart = carts.cart(10, LocationId(0));
            rig.env.borrow_mut().add_cart(cart.clone());
            start(driver.drive(cart.id)).unwrap();
        }

        let mut factory = JobFactory::new();
        let jobs = vec![
            factory.transfer(5, LocationId(2), SimTime::hm(0, 3), LocationId(10), SimTime::hm(0, 30)),
            factory.transfer(6, LocationId(2), SimTime::hm(0, 3), LocationId(4), SimTime::hm(0, 25)),
            factory.out_of_service(LocationId(9), SimTime::hm(0, 30), SimTime::hm(0, 40)),
            factory.transfer(9, LocationId(7), SimTime::hm(0, 13), LocationId(4), SimTime::hm(0, 27)),
        ];
        for job in jobs {
            start(dispatcher.introduce_job(job, SimTime::ZERO)).unwrap();
        }
        start(dispatcher.shutdown_at(SimTime::hm(0, 59))).unwrap();

        rig.timeline.run().unwrap();
        (rig, dispatcher)
    }

    #[test]
    fn every_job_terminates_before_shutdown() {
        let (rig, _dispatcher) = run_hello(None);
        let env = rig.env.borrow();

        let done = env.successful_jobs().len() + env.failed_jobs().len();
        assert_eq!(done, 4);
        assert_eq!(env.successful_jobs().len(), 4);
        assert!(env.jobs().is_empty());
        assert_eq!(rig.timeline.now(), SimTime::hm(0, 59));
    }

    #[test]
    fn carts_end_empty_and_within_capacity() {
        let (rig, _dispatcher) = run_hello(None);
        let env = rig.env.borrow();
        for cart in env.fleet().values() {
            assert!(cart.payload <= cart.capacity);
            assert_eq!(cart.payload, 0);
        }
    }

    #[test]
    fn trace_narrates_the_run() {
        let timeline = Timeline::new();
        let trace = TextTrace::shared(timeline.clone(), Vec::new());
        let env = shared(Environment::new(
            Rc::new(LinearCorridor),
            Some(trace.clone() as Rc<dyn Trace>),
        ));
        let rig = Rig { timeline, env };

        let dispatcher: Rc<dyn Dispatcher> =
            Rc::new(SimpleDispatcher::new(rig.timeline.clone(), Rc::clone(&rig.env)));
        let driver = Driver::new(
            rig.timeline.clone(),
            dispatcher.clone(),
            Rc::clone(&rig.env),
            planner(),
        );

        let mut carts = CartFactory::new();
        let cart = carts.cart(10, LocationId(0));
        rig.env.borrow_mut().add_cart(cart.clone());
        start(driver.drive(cart.id)).unwrap();

        let mut factory = JobFactory::new();
        let job = factory.transfer(
            5,
            LocationId(2),
            SimTime::hm(0, 3),
            LocationId(10),
            SimTime::hm(0, 30),
        );
        start(dispatcher.introduce_job(job, SimTime::ZERO)).unwrap();
        start(dispatcher.shutdown_at(SimTime::hm(0, 59))).unwrap();
        rig.timeline.run().unwrap();

        let output = trace.read(|buffer| String::from_utf8_lossy(buffer).into_owned());
        assert!(output.contains("00:00:00 Job 0 introduced"));
        assert!(output.contains("Cart 0 departs location 0 for location 2"));
        assert!(output.contains("00:01:00 Cart 0 passes location 1"));
        assert!(output.contains("00:02:00 Cart 0 arrives at location 2"));
        assert!(output.contains("00:02:00 Cart 0 waits until 00:03:00"));
        assert!(output.contains("00:03:00 Cart 0 commits to job 0"));
        assert!(output.contains("Job 0 succeeded"));
    }
}

// ── Planning-loop scenario (end to end) ───────────────────────────────────────

#[cfg(test)]
mod planning_scenario {
    use super::*;

    #[test]
    fn assigner_splits_work_and_drivers_deliver() {
        let rig = rig(None);
        let assigner = Rc::new(JobAssigner::new(3, Rc::new(LinearCorridor)));
        let dispatcher: Rc<dyn Dispatcher> = Rc::new(PlanningLoopDispatcher::new(
            rig.timeline.clone(),
            Rc::clone(&rig.env),
            assigner,
            SimTime::ZERO,
            60,
        ));
        let driver = Driver::new(
            rig.timeline.clone(),
            dispatcher.clone(),
            Rc::clone(&rig.env),
            planner(),
        );

        let mut carts = CartFactory::new();
        let near_low = carts.cart(10, LocationId(5));
        let near_high = carts.cart(10, LocationId(15));
        for cart in [&near_low, &near_high] {
            rig.env.borrow_mut().add_cart(cart.clone());
            start(driver.drive(cart.id)).unwrap();
        }

        let mut factory = JobFactory::new();
        let low_job =
            factory.transfer(2, LocationId(6), SimTime::ZERO, LocationId(7), SimTime::FOREVER);
        let high_job =
            factory.transfer(2, LocationId(16), SimTime::ZERO, LocationId(17), SimTime::FOREVER);
        for job in [low_job, high_job] {
            start(dispatcher.introduce_job(job, SimTime::ZERO)).unwrap();
        }

        let planning_agent = dispatcher.planning_loop().expect("planning dispatcher");
        start(planning_agent).unwrap();
        start(dispatcher.shutdown_at(SimTime::hm(0, 30))).unwrap();

        rig.timeline.run().unwrap();

        let env = rig.env.borrow();
        assert_eq!(env.successful_jobs().len(), 2);
        assert!(env.failed_jobs().is_empty());

        // Each job went to the cart next to it.
        for job in env.successful_jobs() {
            match job.id {
                JobId(0) => assert_eq!(job.assigned_to, Some(near_low.id)),
                JobId(1) => assert_eq!(job.assigned_to, Some(near_high.id)),
                other => panic!("unexpected job {other}"),
            }
        }
    }

    #[test]
    fn drivers_park_until_the_first_plan_is_published() {
        let rig = rig(None);
        let assigner = Rc::new(JobAssigner::new(3, Rc::new(LinearCorridor)));
        let dispatcher = PlanningLoopDispatcher::new(
            rig.timeline.clone(),
            Rc::clone(&rig.env),
            assigner,
            SimTime::ZERO,
            60,
        );

        // Before any plan exists, a driver that has never seen one must park.
        assert!(dispatcher.wait_for_next_plan(SimTime::NEVER).is_some());
        assert!(!dispatcher.newer_plan_available(SimTime::NEVER));
        assert_eq!(dispatcher.current_plan_time(), SimTime::NEVER);
    }
}
