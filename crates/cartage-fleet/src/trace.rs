//! Trace observers for simulation events.
//!
//! Every observable event has one method, all with default no-op bodies so
//! implementors only override what they care about.  The engine holds the
//! sink as `Option<Rc<dyn Trace>>` and tolerates its absence entirely.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use cartage_core::{JobId, LocationId, SimTime};
use cartage_kernel::Timeline;

use crate::{Cart, Job};

/// Callbacks for everything worth narrating about a simulation run.
pub trait Trace {
    /// The dispatcher handed `cart` a plan; `unfiltered` is the raw per-cart
    /// list, `filtered` what survived the liveness/ownership filter.
    fn cart_plan_is(&self, _cart: &Cart, _unfiltered: &[JobId], _filtered: &[JobId]) {}

    fn cart_departs(&self, _cart: &Cart, _destination: LocationId) {}
    fn cart_passes(&self, _cart: &Cart) {}
    fn cart_arrives(&self, _cart: &Cart) {}
    fn cart_waits(&self, _cart: &Cart, _until: SimTime) {}

    fn cart_begins_loading(&self, _cart: &Cart, _quantity: u32) {}
    fn cart_finishes_loading(&self, _cart: &Cart) {}
    fn cart_begins_unloading(&self, _cart: &Cart, _quantity: u32) {}
    fn cart_finishes_unloading(&self, _cart: &Cart) {}

    fn cart_suspends_service(&self, _cart: &Cart) {}
    fn cart_resumes_service(&self, _cart: &Cart) {}

    fn job_introduced(&self, _job: &Job) {}
    fn job_assigned(&self, _job: &Job) {}
    fn job_succeeded(&self, _job: &Job) {}
    fn job_failed(&self, _job: &Job) {}

    fn planner_started(&self) {}
    fn planner_finished(&self) {}
}

// ── TextTrace ─────────────────────────────────────────────────────────────────

/// Line-oriented trace: one `HH:MM:SS <message>` line per event.
///
/// Writes to any `io::Write` sink; tests pass a `Vec<u8>`, demos pass
/// stdout.  Write failures are swallowed — tracing must never take the
/// simulation down.
pub struct TextTrace<W: Write> {
    timeline: Timeline,
    out:      RefCell<W>,
}

impl<W: Write> TextTrace<W> {
    pub fn new(timeline: Timeline, out: W) -> Self {
        TextTrace { timeline, out: RefCell::new(out) }
    }

    /// Wrap into the shared form the environment expects.
    pub fn shared(timeline: Timeline, out: W) -> Rc<Self>
    where
        W: 'static,
    {
        Rc::new(Self::new(timeline, out))
    }

    /// Inspect the sink (e.g. read back a `Vec<u8>` buffer in tests).
    pub fn read<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.out.borrow())
    }

    fn line(&self, text: std::fmt::Arguments<'_>) {
        let now = self.timeline.now().format_hms();
        let _ = writeln!(self.out.borrow_mut(), "{now} {text}");
    }
}

impl<W: Write> Trace for TextTrace<W> {
    fn cart_plan_is(&self, cart: &Cart, unfiltered: &[JobId], filtered: &[JobId]) {
        let raw = join_ids(unfiltered);
        let kept = join_ids(filtered);
        self.line(format_args!("Cart {} plan [{raw}] merges to [{kept}]", cart.id));
    }

    fn cart_departs(&self, cart: &Cart, destination: LocationId) {
        self.line(format_args!(
            "Cart {} departs location {} for location {destination}",
            cart.id, cart.last_known_location
        ));
    }

    fn cart_passes(&self, cart: &Cart) {
        self.line(format_args!(
            "Cart {} passes location {}",
            cart.id, cart.last_known_location
        ));
    }

    fn cart_arrives(&self, cart: &Cart) {
        self.line(format_args!(
            "Cart {} arrives at location {}",
            cart.id, cart.last_known_location
        ));
    }

    fn cart_waits(&self, cart: &Cart, until: SimTime) {
        self.line(format_args!("Cart {} waits until {}", cart.id, until.format_hms()));
    }

    fn cart_begins_loading(&self, cart: &Cart, quantity: u32) {
        self.line(format_args!(
            "Cart {} begins loading {quantity} items (payload={})",
            cart.id, cart.payload
        ));
    }

    fn cart_finishes_loading(&self, cart: &Cart) {
        self.line(format_args!(
            "Cart {} finishes loading (payload={})",
            cart.id, cart.payload
        ));
    }

    fn cart_begins_unloading(&self, cart: &Cart, quantity: u32) {
        self.line(format_args!(
            "Cart {} begins unloading {quantity} items (payload={})",
            cart.id, cart.payload
        ));
    }

    fn cart_finishes_unloading(&self, cart: &Cart) {
        self.line(format_args!(
            "Cart {} finishes unloading (payload={})",
            cart.id, cart.payload
        ));
    }

    fn cart_suspends_service(&self, cart: &Cart) {
        self.line(format_args!(
            "Cart {} suspends service at location {}",
            cart.id, cart.last_known_location
        ));
    }

    fn cart_resumes_service(&self, cart: &Cart) {
        self.line(format_args!(
            "Cart {} resumes service at location {}",
            cart.id, cart.last_known_location
        ));
    }

    fn job_introduced(&self, job: &Job) {
        self.line(format_args!("Job {} introduced", job.id));
    }

    fn job_assigned(&self, job: &Job) {
        match job.assigned_to {
            Some(cart) => self.line(format_args!("Cart {cart} commits to job {}", job.id)),
            None => self.line(format_args!("Job {} assigned", job.id)),
        }
    }

    fn job_succeeded(&self, job: &Job) {
        self.line(format_args!("Job {} succeeded", job.id));
    }

    fn job_failed(&self, job: &Job) {
        self.line(format_args!("Job {} failed", job.id));
    }

    fn planner_started(&self) {
        self.line(format_args!("Planning cycle started"));
    }

    fn planner_finished(&self) {
        self.line(format_args!("Planning cycle finished, new plan published"));
    }
}

fn join_ids(ids: &[JobId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
