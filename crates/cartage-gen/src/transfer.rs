//! `TransferGenerator` — a random day of inbound/outbound traffic.
//!
//! # Model
//!
//! Each **arrival** lands at a random time inside the configured window and
//! departs again `turn_around_time` later from the same **berth**.  Berths
//! are a scarce resource: a small simulation of berth-holding agents (run on
//! a private [`Timeline`]) allocates a free berth at each arrival and
//! releases it at the matching departure, minting new berths only when none
//! is parked — so the berth count reflects peak concurrency, not traffic
//! volume.
//!
//! Transfer jobs then connect arrivals to later departures at *other*
//! berths.  A connection is kept with a probability shaped by a normal
//! density ratio centered at 1.5× the minimum connection time (capped at
//! 0.39), which favors realistic layovers over both sprints and all-day
//! waits.
//!
//! Everything is driven by one seeded [`SmallRng`]: a fixed seed reproduces
//! the exact schedule.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use cartage_core::{Duration, EngineResult, LocationId, SimTime};
use cartage_fleet::{Job, JobFactory};
use cartage_kernel::{Agent, Step, Timeline, handle, resumed_after_done, start};

use crate::error::{GenError, GenResult};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct TransferConfig {
    pub arrival_count:          usize,
    pub earliest_arrival:       SimTime,
    pub latest_arrival:         SimTime,
    pub turn_around_time:       Duration,
    pub min_connection_time:    Duration,
    pub max_items_per_transfer: u32,
    pub seed:                   u64,
}

// ── Schedule entities ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Arrival {
    pub id: u32,
    pub time: SimTime,
    pub location: LocationId,
    /// Index into the sorted departure list of the first departure reachable
    /// within the minimum connection time, if any.
    pub earliest_connection: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Departure {
    pub id:       u32,
    pub time:     SimTime,
    pub location: LocationId,
}

/// One berth visit: an arrival, its departure, and the transfer jobs that
/// originate from it.
#[derive(Clone, Debug)]
pub struct Turnaround {
    pub arrival:   Arrival,
    pub departure: Departure,
    pub jobs:      Vec<Job>,
}

// ── Berth allocation ──────────────────────────────────────────────────────────

/// Free-list of berths plus the per-turnaround assignments, shared by the
/// berth-holding agents.
struct BerthBoard {
    free:       Vec<LocationId>,
    next_berth: u32,
    minted:     usize,
    assigned:   Vec<Option<LocationId>>,
    rng:        SmallRng,
}

impl BerthBoard {
    fn allocate(&mut self) -> LocationId {
        if self.free.is_empty() {
            self.next_berth += 1;
            self.minted += 1;
            LocationId(self.next_berth)
        } else {
            let i = self.rng.gen_range(0..self.free.len());
            self.free.swap_remove(i)
        }
    }

    fn release(&mut self, berth: LocationId) {
        self.free.push(berth);
    }
}

enum BerthPhase {
    AwaitArrival,
    AwaitDeparture,
    Release,
    Finished,
}

/// Holds one berth from a turnaround's arrival to its departure.
struct BerthAgent {
    timeline:  Timeline,
    board:     Rc<RefCell<BerthBoard>>,
    index:     usize,
    arrival:   SimTime,
    departure: SimTime,
    phase:     BerthPhase,
}

impl Agent for BerthAgent {
    fn resume(&mut self) -> EngineResult<Step> {
        match self.phase {
            BerthPhase::AwaitArrival => {
                self.phase = BerthPhase::AwaitDeparture;
                Ok(Step::Yield(self.timeline.until(self.arrival)))
            }
            BerthPhase::AwaitDeparture => {
                {
                    let mut board = self.board.borrow_mut();
                    let berth = board.allocate();
                    board.assigned[self.index] = Some(berth);
                }
                self.phase = BerthPhase::Release;
                Ok(Step::Yield(self.timeline.until(self.departure)))
            }
            BerthPhase::Release => {
                self.phase = BerthPhase::Finished;
                let mut board = self.board.borrow_mut();
                if let Some(berth) = board.assigned[self.index] {
                    board.release(berth);
                }
                Ok(Step::Done)
            }
            BerthPhase::Finished => Err(resumed_after_done()),
        }
    }
}

// ── TransferGenerator ─────────────────────────────────────────────────────────

pub struct TransferGenerator {
    turnarounds: Vec<Turnaround>,
    transfers: Vec<Job>,
    berth_count: usize,
}

impl TransferGenerator {
    /// Generate a schedule.  Deterministic for a fixed `config.seed`.
    pub fn generate(config: &TransferConfig) -> GenResult<Self> {
        if config.latest_arrival <= config.earliest_arrival {
            return Err(GenError::Config("arrival window is empty".into()));
        }
        if config.max_items_per_transfer < 1 {
            return Err(GenError::Config("max_items_per_transfer must be >= 1".into()));
        }

        let mut rng = SmallRng::seed_from_u64(config.seed);

        // ── Random arrivals, each paired with a departure ─────────────────
        let window = config.latest_arrival - config.earliest_arrival;
        let mut arrivals: Vec<Arrival> = (0..config.arrival_count)
            .map(|i| Arrival {
                id:                  i as u32,
                time:                config.earliest_arrival + rng.gen_range(0..window),
                location:            LocationId(0), // resolved by berth allocation
                earliest_connection: None,
            })
            .collect();

        // ── Allocate berths by simulating the day ─────────────────────────
        let board = Rc::new(RefCell::new(BerthBoard {
            free:       Vec::new(),
            next_berth: 0,
            minted:     0,
            assigned:   vec![None; arrivals.len()],
            rng:        SmallRng::seed_from_u64(config.seed.wrapping_add(1)),
        }));
        let timeline = Timeline::new();
        for (index, arrival) in arrivals.iter().enumerate() {
            start(handle(BerthAgent {
                timeline:  timeline.clone(),
                board:     Rc::clone(&board),
                index,
                arrival:   arrival.time,
                departure: arrival.time + config.turn_around_time,
                phase:     BerthPhase::AwaitArrival,
            }))?;
        }
        timeline.run()?;

        for (index, arrival) in arrivals.iter_mut().enumerate() {
            if let Some(berth) = board.borrow().assigned[index] {
                arrival.location = berth;
            }
        }
        let berth_count = board.borrow().minted;

        // ── Sorted views and earliest feasible connections ────────────────
        arrivals.sort_by_key(|a| (a.time, a.id));
        let mut departures: Vec<Departure> = arrivals
            .iter()
            .map(|a| Departure {
                id:       a.id,
                time:     a.time + config.turn_around_time,
                location: a.location,
            })
            .collect();
        departures.sort_by_key(|d| (d.time, d.id));

        determine_earliest_connections(&mut arrivals, &departures, config.min_connection_time);

        // ── Emit transfer jobs ────────────────────────────────────────────
        let mut factory = JobFactory::new();
        let mut transfers: Vec<Job> = Vec::new();
        let mut turnarounds: Vec<Turnaround> = Vec::new();

        for arrival in &arrivals {
            let mut jobs = Vec::new();
            if let Some(first) = arrival.earliest_connection {
                for departure in &departures[first..] {
                    if departure.location == arrival.location {
                        continue;
                    }
                    let connection = departure.time - arrival.time;
                    let p = connection_probability(connection, config.min_connection_time);
                    if rng.r#gen::<f64>() < p {
                        let quantity = rng.gen_range(1..=config.max_items_per_transfer);
                        let job = factory.transfer(
                            quantity,
                            arrival.location,
                            arrival.time,
                            departure.location,
                            departure.time,
                        );
                        transfers.push(job.clone());
                        jobs.push(job);
                    }
                }
            }
            turnarounds.push(Turnaround {
                arrival:   arrival.clone(),
                departure: Departure {
                    id:       arrival.id,
                    time:     arrival.time + config.turn_around_time,
                    location: arrival.location,
                },
                jobs,
            });
        }

        turnarounds.sort_by_key(|t| (t.arrival.time, t.arrival.location));

        Ok(TransferGenerator { turnarounds, transfers, berth_count })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.transfers
    }

    pub fn job_count(&self) -> usize {
        self.transfers.len()
    }

    pub fn turnarounds(&self) -> &[Turnaround] {
        &self.turnarounds
    }

    pub fn berth_count(&self) -> usize {
        self.berth_count
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// For each arrival, the index of the first departure at least
/// `min_connection_time` later.  Arrivals and departures must be sorted by
/// time; the scan is a single two-pointer pass.
fn determine_earliest_connections(
    arrivals: &mut [Arrival],
    departures: &[Departure],
    min_connection_time: Duration,
) {
    if departures.is_empty() {
        return;
    }
    let mut earliest = 0;
    for arrival in arrivals.iter_mut() {
        while departures[earliest].time - arrival.time < min_connection_time {
            earliest += 1;
            if earliest == departures.len() {
                return; // no later arrival can connect either
            }
        }
        arrival.earliest_connection = Some(earliest);
    }
}

/// Keep-probability for a connection of length `connection`: the normal
/// density at `connection` relative to the density at the mean, centered at
/// 1.5× the minimum connection time, capped at 0.39.
fn connection_probability(connection: Duration, min_connection_time: Duration) -> f64 {
    let mean = 1.5 * min_connection_time as f64;
    let sigma = 25.0 * (min_connection_time as f64) * (min_connection_time as f64);
    let z = (connection as f64 - mean) / sigma;
    let ratio = (-0.5 * z * z).exp();
    ratio.min(0.39)
}
