//! `StaffingPlan` — turn crews of shifts into carts and break jobs.
//!
//! A shift describes a working interval at a home location with scheduled
//! breaks.  The plan simulates the roster on a private [`Timeline`]: when a
//! shift starts it takes over a cart parked at its home location (minting a
//! new one only if none is parked), and when it ends it parks the cart
//! again.  Hand-offs are expressed entirely as out-of-service jobs:
//!
//! - a cart is minted suspended "since forever"; the first shift to claim it
//!   rewrites that job's resume time to its own start;
//! - each break becomes one out-of-service job at the break room;
//! - each shift end becomes an open-ended out-of-service job that the *next*
//!   shift at that home shortens, or that parks the cart for good.
//!
//! All emitted jobs carry the owning cart in `assigned_to`, so dispatchers
//! route them to the right driver without involving the assigner.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cartage_core::{Duration, LocationId, SimTime};
use cartage_fleet::{Cart, CartFactory, Job, JobFactory, JobKind};
use cartage_kernel::{Agent, Step, Timeline, handle, resumed_after_done, start};

use crate::error::GenResult;

// ── Shift model ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub start: SimTime,
    pub end:   SimTime,
}

/// `[base + offset, base + offset + length]`.
pub fn interval(base: SimTime, offset: Duration, length: Duration) -> Interval {
    Interval { start: base + offset, end: base + offset + length }
}

/// `true` when `inner` lies strictly inside `outer`.
pub fn contains(outer: &Interval, inner: &Interval) -> bool {
    outer.start < inner.start && outer.end > inner.end
}

#[derive(Clone, Debug)]
pub struct Break {
    pub location: LocationId,
    pub interval: Interval,
}

#[derive(Clone, Debug)]
pub struct Shift {
    pub name:    String,
    pub working: Interval,
    pub breaks:  Vec<Break>,
    pub home:    LocationId,
}

/// `size` identical shifts running in parallel.
#[derive(Clone, Debug)]
pub struct Crew {
    pub shift: Shift,
    pub size:  usize,
}

/// An eight-hour shift with the customary 15/30/15-minute breaks at two,
/// four, and six hours in.
pub fn standard_shift(
    name: &str,
    start: SimTime,
    home: LocationId,
    break_room: LocationId,
) -> Shift {
    use cartage_core::{HOUR, MINUTE};
    Shift {
        name:    name.to_string(),
        working: interval(start, 0, 8 * HOUR - 1),
        home,
        breaks:  vec![
            Break { location: break_room, interval: interval(start, 120 * MINUTE, 15 * MINUTE) },
            Break { location: break_room, interval: interval(start, 240 * MINUTE, 30 * MINUTE) },
            Break { location: break_room, interval: interval(start, 360 * MINUTE, 15 * MINUTE) },
        ],
    }
}

/// The same shift shifted in time (e.g. a swing shift from a day shift).
pub fn adjust_shift(name: &str, shift: &Shift, offset: Duration) -> Shift {
    Shift {
        name:    name.to_string(),
        working: Interval {
            start: shift.working.start + offset,
            end:   shift.working.end + offset,
        },
        breaks:  shift
            .breaks
            .iter()
            .map(|b| Break {
                location: b.location,
                interval: Interval {
                    start: b.interval.start + offset,
                    end:   b.interval.end + offset,
                },
            })
            .collect(),
        home: shift.home,
    }
}

// ── Roster state shared by shift agents ───────────────────────────────────────

struct Roster {
    cart_factory: CartFactory,
    job_factory: JobFactory,
    cart_capacity: u32,
    carts: Vec<Cart>,
    /// All break-period jobs, indexed by the handles the agents pass around.
    jobs: Vec<Job>,
    /// Per home location: indices (into `jobs`) of the end-of-shift jobs of
    /// parked carts.
    parked: BTreeMap<LocationId, Vec<usize>>,
}

impl Roster {
    /// Take over a parked cart at `home`, or mint one.  Returns the index of
    /// the out-of-service job currently suspending that cart.
    fn claim(&mut self, home: LocationId) -> usize {
        if let Some(job_index) = self.parked.get_mut(&home).and_then(Vec::pop) {
            return job_index;
        }
        // Nobody parked here: mint a cart suspended since forever.
        let cart = self.cart_factory.cart(self.cart_capacity, home);
        let job_index = self.suspension(&cart, home, SimTime::NEVER, SimTime::FOREVER);
        self.carts.push(cart);
        job_index
    }

    fn park(&mut self, home: LocationId, job_index: usize) {
        self.parked.entry(home).or_default().push(job_index);
    }

    /// Append an out-of-service job owned by `cart`; returns its index.
    fn suspension(
        &mut self,
        cart: &Cart,
        location: LocationId,
        suspend: SimTime,
        resume: SimTime,
    ) -> usize {
        let mut job = self.job_factory.out_of_service(location, suspend, resume);
        job.assigned_to = Some(cart.id);
        self.jobs.push(job);
        self.jobs.len() - 1
    }

    fn cart_of(&self, job_index: usize) -> Option<Cart> {
        let cart_id = self.jobs[job_index].assigned_to?;
        self.carts.iter().find(|cart| cart.id == cart_id).cloned()
    }
}

// ── Shift agent ───────────────────────────────────────────────────────────────

enum ShiftPhase {
    AwaitStart,
    Work,
    End { end_job: usize },
    Finished,
}

struct ShiftAgent {
    timeline: Timeline,
    roster:   Rc<RefCell<Roster>>,
    shift:    Shift,
    phase:    ShiftPhase,
}

impl Agent for ShiftAgent {
    fn resume(&mut self) -> cartage_core::EngineResult<Step> {
        match std::mem::replace(&mut self.phase, ShiftPhase::Finished) {
            ShiftPhase::AwaitStart => {
                self.phase = ShiftPhase::Work;
                Ok(Step::Yield(self.timeline.until(self.shift.working.start)))
            }
            ShiftPhase::Work => {
                let end_job = {
                    let mut roster = self.roster.borrow_mut();

                    // Cut the claimed cart's current suspension short: it
                    // goes back on duty when this shift starts.
                    let claimed = roster.claim(self.shift.home);
                    if let JobKind::OutOfService { resume_time, .. } =
                        &mut roster.jobs[claimed].kind
                    {
                        *resume_time = self.shift.working.start;
                    }

                    let cart = roster.cart_of(claimed);
                    match cart {
                        None => return Ok(Step::Done), // claimed job lost its cart
                        Some(cart) => {
                            for b in &self.shift.breaks {
                                roster.suspension(
                                    &cart,
                                    b.location,
                                    b.interval.start,
                                    b.interval.end,
                                );
                            }
                            roster.suspension(
                                &cart,
                                self.shift.home,
                                self.shift.working.end,
                                SimTime::FOREVER,
                            )
                        }
                    }
                };
                self.phase = ShiftPhase::End { end_job };
                Ok(Step::Yield(self.timeline.until(self.shift.working.end)))
            }
            ShiftPhase::End { end_job } => {
                self.roster.borrow_mut().park(self.shift.home, end_job);
                Ok(Step::Done)
            }
            ShiftPhase::Finished => Err(resumed_after_done()),
        }
    }
}

// ── StaffingPlan ──────────────────────────────────────────────────────────────

pub struct StaffingPlan {
    carts: Vec<Cart>,
    jobs:  Vec<Job>,
}

impl StaffingPlan {
    /// Simulate the roster and collect the fleet plus its break jobs.
    pub fn generate(crews: &[Crew], cart_capacity: u32) -> GenResult<Self> {
        let timeline = Timeline::new();
        let roster = Rc::new(RefCell::new(Roster {
            cart_factory: CartFactory::new(),
            job_factory:  JobFactory::new(),
            cart_capacity,
            carts:        Vec::new(),
            jobs:         Vec::new(),
            parked:       BTreeMap::new(),
        }));

        for crew in crews {
            for _ in 0..crew.size {
                start(handle(ShiftAgent {
                    timeline: timeline.clone(),
                    roster:   Rc::clone(&roster),
                    shift:    crew.shift.clone(),
                    phase:    ShiftPhase::AwaitStart,
                }))?;
            }
        }
        timeline.run()?;

        let roster = roster.borrow();
        Ok(StaffingPlan { carts: roster.carts.clone(), jobs: roster.jobs.clone() })
    }

    /// Every cart the roster needs, at its home location.
    pub fn carts(&self) -> &[Cart] {
        &self.carts
    }

    /// Every out-of-service job, already assigned to its cart.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }
}
