//! Unit tests for the cooperative kernel.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cartage_core::{EngineError, EngineResult, SimTime};

use crate::{Agent, AgentHandle, Condition, Directive, Step, Timeline, handle, start};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// An agent driven by a queue of closures: each resumption runs one closure
/// and yields the directive it returns (`None` finishes the agent).
struct Script {
    steps: VecDeque<Box<dyn FnOnce() -> Option<Directive>>>,
    finished: bool,
}

impl Script {
    fn new() -> Self {
        Script { steps: VecDeque::new(), finished: false }
    }

    fn then(mut self, step: impl FnOnce() -> Option<Directive> + 'static) -> Self {
        self.steps.push_back(Box::new(step));
        self
    }
}

impl Agent for Script {
    fn resume(&mut self) -> EngineResult<Step> {
        if self.finished {
            return Err(crate::resumed_after_done());
        }
        match self.steps.pop_front() {
            None => {
                self.finished = true;
                Ok(Step::Done)
            }
            Some(step) => match step() {
                Some(directive) => Ok(Step::Yield(directive)),
                None => {
                    self.finished = true;
                    Ok(Step::Done)
                }
            },
        }
    }
}

type Log<T> = Rc<RefCell<Vec<T>>>;

fn log<T>() -> Log<T> {
    Rc::new(RefCell::new(Vec::new()))
}

/// An agent that sleeps on `condition` once, then records its label.
fn sleeper(condition: &Condition, label: &'static str, woken: &Log<&'static str>) -> AgentHandle {
    let condition = condition.clone();
    let woken = woken.clone();
    handle(
        Script::new()
            .then(move || Some(condition.sleep()))
            .then(move || {
                woken.borrow_mut().push(label);
                None
            }),
    )
}

// ── Agent runtime ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent_runtime {
    use super::*;

    #[test]
    fn start_arms_the_yielded_directive() {
        let armed = log::<u32>();
        for i in 0..3 {
            let armed = armed.clone();
            let agent = handle(Script::new().then(move || {
                Some(Directive::new(move |_agent| {
                    armed.borrow_mut().push(i);
                    Ok(())
                }))
            }));
            start(agent).unwrap();
        }
        assert_eq!(*armed.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn immediate_termination_is_normal() {
        let agent = handle(Script::new());
        assert!(start(agent).is_ok());
    }

    #[test]
    fn resuming_a_finished_agent_is_bad_yield() {
        let agent = handle(Script::new());
        start(agent.clone()).unwrap();
        assert!(matches!(start(agent), Err(EngineError::BadYield)));
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod timeline {
    use super::*;

    /// Agent that records the clock when resumed, then finishes.
    fn clock_recorder(timeline: &Timeline, times: &Log<i64>) -> AgentHandle {
        let timeline = timeline.clone();
        let times = times.clone();
        handle(Script::new().then(move || {
            times.borrow_mut().push(timeline.now().0);
            None
        }))
    }

    #[test]
    fn resumes_in_time_order() {
        let timeline = Timeline::new();
        let times = log();

        // Enqueue t=2 first, then t=1: the clock must still run 1 before 2.
        timeline
            .schedule(SimTime(2), clock_recorder(&timeline, &times))
            .unwrap();
        timeline
            .until(SimTime(1))
            .arm(clock_recorder(&timeline, &times))
            .unwrap();
        assert_eq!(timeline.pending(), 2);

        timeline.run().unwrap();
        assert_eq!(*times.borrow(), vec![1, 2]);
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn equal_times_resume_in_insertion_order() {
        let timeline = Timeline::new();
        let order = log();

        for label in ["first", "second", "third"] {
            let order = order.clone();
            timeline
                .schedule(
                    SimTime(7),
                    handle(Script::new().then(move || {
                        order.borrow_mut().push(label);
                        None
                    })),
                )
                .unwrap();
        }

        timeline.run().unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn clock_is_non_decreasing_across_events() {
        let timeline = Timeline::new();
        let times = log();
        for t in [5, 1, 3, 3, 2] {
            timeline
                .schedule(SimTime(t), clock_recorder(&timeline, &times))
                .unwrap();
        }
        timeline.run().unwrap();
        let seen = times.borrow();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "clock went backwards: {seen:?}");
    }

    #[test]
    fn scheduling_at_current_time_is_allowed() {
        let timeline = Timeline::new();
        let times = log();

        // The first agent resumes at t=5, then re-schedules itself at t=5.
        let inner = timeline.clone();
        let times2 = times.clone();
        let agent = handle(
            Script::new()
                .then({
                    let inner = inner.clone();
                    move || Some(inner.until(SimTime(5)))
                })
                .then(move || {
                    times2.borrow_mut().push(inner.now().0);
                    None
                }),
        );
        timeline.schedule(SimTime(5), agent).unwrap();
        timeline.run().unwrap();
        assert_eq!(*times.borrow(), vec![5]);
    }

    #[test]
    fn scheduling_into_the_past_is_fatal() {
        let timeline = Timeline::new();

        // At t=5 the agent tries to suspend until t=3.
        let inner = timeline.clone();
        let agent = handle(Script::new().then(move || Some(inner.until(SimTime(3)))));
        timeline.schedule(SimTime(5), agent).unwrap();

        match timeline.run() {
            Err(EngineError::PastSchedule { now, requested }) => {
                assert_eq!(now, SimTime(5));
                assert_eq!(requested, SimTime(3));
            }
            other => panic!("expected PastSchedule, got {other:?}"),
        }
    }
}

// ── Condition ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod condition {
    use super::*;

    #[test]
    fn sleep_parks_the_agent() {
        let condition = Condition::new();
        let woken = log();
        start(sleeper(&condition, "a", &woken)).unwrap();

        assert_eq!(condition.waiter_count(), 1);
        assert!(woken.borrow().is_empty());
    }

    #[test]
    fn wake_one_resumes_the_most_recent_waiter() {
        let condition = Condition::new();
        let woken = log();
        start(sleeper(&condition, "a", &woken)).unwrap();
        start(sleeper(&condition, "b", &woken)).unwrap();

        condition.wake_one().unwrap();
        assert_eq!(*woken.borrow(), vec!["b"]);
        assert_eq!(condition.waiter_count(), 1);
    }

    #[test]
    fn wake_all_resumes_in_insertion_order() {
        let condition = Condition::new();
        let woken = log();
        for label in ["a", "b", "c"] {
            start(sleeper(&condition, label, &woken)).unwrap();
        }

        condition.wake_all().unwrap();
        assert_eq!(*woken.borrow(), vec!["a", "b", "c"]);
        assert_eq!(condition.waiter_count(), 0);
        assert_eq!(condition.pending_wakeups(), 0);
    }

    #[test]
    fn wake_one_without_waiters_banks_a_credit() {
        let condition = Condition::new();
        condition.wake_one().unwrap();
        assert_eq!(condition.pending_wakeups(), 1);

        // The next sleeper consumes the credit and never enqueues.
        let woken = log();
        start(sleeper(&condition, "a", &woken)).unwrap();
        assert_eq!(*woken.borrow(), vec!["a"]);
        assert_eq!(condition.waiter_count(), 0);
        assert_eq!(condition.pending_wakeups(), 0);
    }

    #[test]
    fn wake_all_clears_banked_credits() {
        let condition = Condition::new();
        condition.wake_one().unwrap();
        condition.wake_one().unwrap();
        assert_eq!(condition.pending_wakeups(), 2);

        condition.wake_all().unwrap();
        assert_eq!(condition.pending_wakeups(), 0);

        // A later sleeper must actually park.
        let woken = log();
        start(sleeper(&condition, "a", &woken)).unwrap();
        assert_eq!(condition.waiter_count(), 1);
        assert!(woken.borrow().is_empty());
    }
}
