//! `Condition` — rendezvous primitive with pending-wakeup credit.
//!
//! A wake that arrives before any sleeper is not lost: it is banked as a
//! credit and the next sleeper consumes it, resuming immediately instead of
//! enqueuing.  This is what lets a dispatcher announce "a job exists" before
//! any driver has gone back to waiting.
//!
//! # Wake order
//!
//! `wake_one` resumes the **most recently added** waiter (LIFO); `wake_all`
//! resumes every waiter in insertion order (FIFO).  The asymmetry is
//! observable — it decides which idle driver gets a freshly introduced job —
//! and is preserved deliberately.

use std::cell::RefCell;
use std::rc::Rc;

use cartage_core::EngineResult;

use crate::agent::{AgentHandle, Directive, start};

struct ConditionState {
    waiters:         Vec<AgentHandle>,
    pending_wakeups: u32,
}

/// A waiter list plus banked wakeups.  Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Condition {
    state: Rc<RefCell<ConditionState>>,
}

impl Condition {
    pub fn new() -> Self {
        Condition {
            state: Rc::new(RefCell::new(ConditionState {
                waiters:         Vec::new(),
                pending_wakeups: 0,
            })),
        }
    }

    /// A directive that parks the yielding agent on this condition — unless a
    /// banked wakeup is available, in which case the agent consumes it and
    /// resumes immediately without ever joining the waiter list.
    pub fn sleep(&self) -> Directive {
        let condition = self.clone();
        Directive::new(move |agent| {
            let consumed_credit = {
                let mut state = condition.state.borrow_mut();
                if state.pending_wakeups > 0 {
                    state.pending_wakeups -= 1;
                    true
                } else {
                    state.waiters.push(agent.clone());
                    false
                }
            };
            if consumed_credit { start(agent) } else { Ok(()) }
        })
    }

    /// Resume the most recently parked waiter, or bank a credit if none.
    pub fn wake_one(&self) -> EngineResult<()> {
        let waiter = {
            let mut state = self.state.borrow_mut();
            match state.waiters.pop() {
                Some(agent) => Some(agent),
                None => {
                    state.pending_wakeups += 1;
                    None
                }
            }
        };
        match waiter {
            Some(agent) => start(agent),
            None => Ok(()),
        }
    }

    /// Resume every waiter in insertion order and clear banked credits.
    pub fn wake_all(&self) -> EngineResult<()> {
        let waiters = {
            let mut state = self.state.borrow_mut();
            state.pending_wakeups = 0;
            std::mem::take(&mut state.waiters)
        };
        for agent in waiters {
            start(agent)?;
        }
        Ok(())
    }

    /// Number of parked waiters.
    pub fn waiter_count(&self) -> usize {
        self.state.borrow().waiters.len()
    }

    /// Number of banked wakeups.
    pub fn pending_wakeups(&self) -> u32 {
        self.state.borrow().pending_wakeups
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::new()
    }
}
