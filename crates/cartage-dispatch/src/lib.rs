//! `cartage-dispatch` — dispatchers and per-cart driver agents.
//!
//! # Crate layout
//!
//! | Module            | Contents                                            |
//! |-------------------|-----------------------------------------------------|
//! | [`dispatcher`]    | `Dispatcher` trait and the one-shot alarm agent     |
//! | [`simple`]        | `SimpleDispatcher` — LIFO stack, no planning        |
//! | [`planning_loop`] | `PlanningLoopDispatcher` — periodic replanning      |
//! | [`driver`]        | `Driver` — the per-cart service-loop state machine  |
//!
//! # Wiring a simulation
//!
//! ```rust,ignore
//! let timeline = Timeline::new();
//! let env = shared(Environment::new(estimator.clone(), Some(trace)));
//! let dispatcher: Rc<dyn Dispatcher> =
//!     Rc::new(SimpleDispatcher::new(timeline.clone(), Rc::clone(&env)));
//! let driver = Driver::new(timeline.clone(), dispatcher.clone(), env.clone(), planner);
//!
//! for cart in carts {
//!     env.borrow_mut().add_cart(cart.clone());
//!     start(driver.drive(cart.id))?;
//! }
//! for (job, at) in jobs {
//!     start(dispatcher.introduce_job(job, at))?;
//! }
//! if let Some(agent) = dispatcher.planning_loop() {
//!     start(agent)?;
//! }
//! start(dispatcher.shutdown_at(end))?;
//! timeline.run()?;
//! ```

pub mod dispatcher;
pub mod driver;
pub mod planning_loop;
pub mod simple;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dispatcher::Dispatcher;
pub use driver::Driver;
pub use planning_loop::PlanningLoopDispatcher;
pub use simple::SimpleDispatcher;
