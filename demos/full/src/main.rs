//! full — a generated day of traffic.
//!
//! Twenty random arrivals turn around across a day; transfer jobs connect
//! them.  Three carts serve the schedule under the planning-loop dispatcher
//! (pass `--simple` for the plannerless baseline).  Each job is revealed to
//! the dispatcher fifteen minutes before its pickup window opens.

use std::rc::Rc;
use std::time::Instant;

use anyhow::{Result, bail};

use cartage_core::{FleetConfig, HOUR, LinearCorridor, LocationId, MINUTE, SimTime};
use cartage_dispatch::{Dispatcher, Driver, PlanningLoopDispatcher, SimpleDispatcher};
use cartage_fleet::{CartFactory, Environment, JobKind, TextTrace, Trace, shared};
use cartage_kernel::{Timeline, start};
use cartage_plan::{JobAssigner, RoutePlanner};
use cartage_gen::{TransferConfig, TransferGenerator};

const CART_COUNT: usize = 3;
const ARRIVAL_COUNT: usize = 20;
const SEED: u64 = 13;

fn main() -> Result<()> {
    let wall_clock = Instant::now();

    let mut simple = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--simple" => simple = true,
            other => bail!("unknown argument {other:?} (expected --simple)"),
        }
    }

    let config = FleetConfig {
        planning_start_time: SimTime::hm(7, 45),
        planning_interval: 15 * MINUTE,
        ..FleetConfig::default()
    };

    let timeline = Timeline::new();
    let trace = TextTrace::shared(timeline.clone(), std::io::stdout());
    let estimator = Rc::new(LinearCorridor);
    let env = shared(Environment::new(
        estimator.clone(),
        Some(trace as Rc<dyn Trace>),
    ));

    let dispatcher: Rc<dyn Dispatcher> = if simple {
        Rc::new(SimpleDispatcher::new(timeline.clone(), Rc::clone(&env)))
    } else {
        let assigner = Rc::new(JobAssigner::new(config.max_jobs_per_cart, estimator.clone()));
        Rc::new(PlanningLoopDispatcher::new(
            timeline.clone(),
            Rc::clone(&env),
            assigner,
            config.planning_start_time,
            config.planning_interval,
        ))
    };

    let planner = Rc::new(RoutePlanner::new(config.max_jobs_per_cart, estimator));
    let driver = Driver::new(
        timeline.clone(),
        Rc::clone(&dispatcher),
        Rc::clone(&env),
        planner,
    );

    let mut cart_factory = CartFactory::new();
    for _ in 0..CART_COUNT {
        let cart = cart_factory.cart(config.cart_capacity, LocationId(0));
        env.borrow_mut().add_cart(cart.clone());
        start(driver.drive(cart.id))?;
    }

    // ── Generate and print the day's schedule ─────────────────────────────
    let transfers = TransferGenerator::generate(&TransferConfig {
        arrival_count: ARRIVAL_COUNT,
        earliest_arrival: SimTime::hm(8, 0),
        latest_arrival: SimTime::hm(22, 59),
        turn_around_time: HOUR,
        min_connection_time: 30 * MINUTE,
        max_items_per_transfer: 5,
        seed: SEED,
    })?;

    let mut last_berth = None;
    for turnaround in transfers.turnarounds() {
        let arrival = &turnaround.arrival;
        if last_berth != Some(arrival.location) {
            println!();
            println!("Berth {}", arrival.location);
            last_berth = Some(arrival.location);
        }
        println!(
            "  Inbound #{} at {} => Outbound #{} at {}",
            arrival.id,
            arrival.time.format_hms(),
            turnaround.departure.id,
            turnaround.departure.time.format_hms(),
        );
        for job in &turnaround.jobs {
            if let JobKind::Transfer {
                quantity,
                pickup_location,
                pickup_after,
                dropoff_location,
                dropoff_before,
                ..
            } = &job.kind
            {
                println!(
                    "    Job {}: move {quantity} items from {pickup_location} to \
                     {dropoff_location} between {} and {} ({})",
                    job.id,
                    pickup_after.format_hms(),
                    dropoff_before.format_hms(),
                    SimTime(*dropoff_before - *pickup_after).format_hms(),
                );
            }
        }
    }
    println!();

    // Reveal each job fifteen minutes ahead of its pickup window.
    for job in transfers.jobs() {
        let introduce_at = match &job.kind {
            JobKind::Transfer { pickup_after, .. } => {
                SimTime((pickup_after.0 - 15 * MINUTE).max(0))
            }
            _ => SimTime::ZERO,
        };
        start(dispatcher.introduce_job(job.clone(), introduce_at))?;
    }

    if let Some(planning_agent) = dispatcher.planning_loop() {
        start(planning_agent)?;
    }
    start(dispatcher.shutdown_at(SimTime::hm(23, 59)))?;

    timeline.run()?;

    // ── Outcome summary ───────────────────────────────────────────────────
    let scheduled = transfers.job_count();
    let (completed, failed, leftover) = {
        let env = env.borrow();
        (env.successful_jobs().len(), env.failed_jobs().len(), env.jobs().len())
    };
    println!("Scheduled: {scheduled} jobs");
    println!("Completed: {completed} jobs");
    println!("Failed: {failed} jobs");
    if leftover > 0 {
        println!("Unfinished at shutdown: {leftover} jobs");
    }

    println!("Simulation ended.");
    println!("{:.3} ms", wall_clock.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}
