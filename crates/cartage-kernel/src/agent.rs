//! The agent runtime: resumable tasks and the single-directive yield protocol.
//!
//! # Protocol
//!
//! An **agent** is a resumable computation.  Each time it is resumed it either
//! terminates ([`Step::Done`]) or yields exactly one [`Directive`] — a one-shot
//! callable that takes the agent's handle and arranges its next resumption
//! (by enqueuing it on a [`Timeline`] or parking it on a [`Condition`]).
//! Compound waits are expressed as sequential yields.
//!
//! Agents are written as small finite state machines carrying their local
//! variables; the runtime only needs [`Agent::resume`] and the yield
//! protocol.  Nothing here commits to a host-language suspension mechanism.
//!
//! # Protocol violations
//!
//! Resuming an agent after it has reported [`Step::Done`] is a bug in the
//! scheduler's caller; state machines return [`EngineError::BadYield`] from
//! their terminal state and [`start`] propagates it.
//!
//! [`Timeline`]: crate::Timeline
//! [`Condition`]: crate::Condition

use std::cell::RefCell;
use std::rc::Rc;

use cartage_core::{EngineError, EngineResult};

/// Shared, mutable handle to an agent.  The scheduler is single-threaded and
/// cooperative, so `Rc<RefCell<…>>` is the whole ownership story: whichever
/// queue currently holds the handle will resume the agent exactly once.
pub type AgentHandle = Rc<RefCell<dyn Agent>>;

/// The outcome of one resumption.
pub enum Step {
    /// Suspend; the directive arranges the next resumption.
    Yield(Directive),
    /// The agent has finished.  It must not be resumed again.
    Done,
}

/// A one-shot scheduling callable yielded by an agent.
///
/// Arming a directive hands the agent's handle to whatever will resume it
/// next.  Directives may fail (e.g. scheduling into the past), and the
/// failure propagates out of [`start`] as a fatal error.
pub struct Directive(Box<dyn FnOnce(AgentHandle) -> EngineResult<()>>);

impl Directive {
    pub fn new(f: impl FnOnce(AgentHandle) -> EngineResult<()> + 'static) -> Self {
        Directive(Box::new(f))
    }

    /// Consume the directive, arranging `agent`'s next resumption.
    pub fn arm(self, agent: AgentHandle) -> EngineResult<()> {
        (self.0)(agent)
    }
}

/// A resumable task participating in the cooperative scheduler.
pub trait Agent {
    /// Advance the agent to its next suspension point or to completion.
    fn resume(&mut self) -> EngineResult<Step>;
}

/// Wrap a concrete agent into a shareable handle.
pub fn handle(agent: impl Agent + 'static) -> AgentHandle {
    Rc::new(RefCell::new(agent))
}

/// Resume `agent` once and route whatever it yields.
///
/// Terminating immediately is a normal outcome.  The borrow on the agent is
/// released before the directive is armed, so a directive is free to resume
/// other agents (or, via a pending wakeup, this very one) synchronously.
pub fn start(agent: AgentHandle) -> EngineResult<()> {
    let step = agent.borrow_mut().resume()?;
    match step {
        Step::Done => Ok(()),
        Step::Yield(directive) => directive.arm(agent),
    }
}

/// Shorthand for the terminal-state guard every agent state machine needs:
/// an agent resumed past completion has broken the yield protocol.
pub fn resumed_after_done() -> EngineError {
    EngineError::BadYield
}
