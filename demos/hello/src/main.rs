//! hello — smallest cartage scenario.
//!
//! Three capacity-10 carts wait at location 0 on a linear corridor.  Four
//! jobs appear at time zero: two transfers from location 2, one transfer
//! from location 7, and one operator break at location 9.  The simple
//! dispatcher hands each woken driver one job at a time; everything is done
//! long before the 00:59:00 shutdown.

use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;

use cartage_core::{FleetConfig, LinearCorridor, LocationId, SimTime};
use cartage_dispatch::{Dispatcher, Driver, SimpleDispatcher};
use cartage_fleet::{CartFactory, Environment, JobFactory, TextTrace, Trace, shared};
use cartage_kernel::{Timeline, start};
use cartage_plan::RoutePlanner;

const CART_COUNT: usize = 3;

fn main() -> Result<()> {
    let wall_clock = Instant::now();
    let config = FleetConfig::default();

    let timeline = Timeline::new();
    let trace = TextTrace::shared(timeline.clone(), std::io::stdout());
    let estimator = Rc::new(LinearCorridor);
    let env = shared(Environment::new(
        estimator.clone(),
        Some(trace as Rc<dyn Trace>),
    ));

    let dispatcher: Rc<dyn Dispatcher> =
        Rc::new(SimpleDispatcher::new(timeline.clone(), Rc::clone(&env)));
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

    let mut job_factory = JobFactory::new();
    let jobs = vec![
        job_factory.transfer(
            5,
            LocationId(2),
            SimTime::hm(0, 3),
            LocationId(10),
            SimTime::hm(0, 30),
        ),
        job_factory.transfer(
            6,
            LocationId(2),
            SimTime::hm(0, 3),
            LocationId(4),
            SimTime::hm(0, 25),
        ),
        job_factory.out_of_service(
            LocationId(9),
            SimTime::hm(0, 30),
            SimTime::hm(0, 40),
        ),
        job_factory.transfer(
            9,
            LocationId(7),
            SimTime::hm(0, 13),
            LocationId(4),
            SimTime::hm(0, 27),
        ),
    ];
    for job in jobs {
        start(dispatcher.introduce_job(job, SimTime::ZERO))?;
    }

    start(dispatcher.shutdown_at(SimTime::hm(0, 59)))?;

    timeline.run()?;

    println!("Simulation ended.");
    println!("{:.3} ms", wall_clock.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}
