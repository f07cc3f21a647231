//! Unit tests for cartage-gen.

use cartage_core::{HOUR, JobId, LocationId, MINUTE, SimTime};
use cartage_fleet::JobKind;

use crate::{
    Crew, GenError, TransferConfig, TransferGenerator, StaffingPlan, adjust_shift, contains,
    interval, load_transfers_reader, standard_shift,
};

// ── TransferGenerator ─────────────────────────────────────────────────────────

#[cfg(test)]
mod transfer_generator {
    use super::*;

    fn config(seed: u64) -> TransferConfig {
        TransferConfig {
            arrival_count: 10,
            earliest_arrival: SimTime::hm(8, 0),
            latest_arrival: SimTime::hm(22, 59),
            turn_around_time: HOUR,
            min_connection_time: 30 * MINUTE,
            max_items_per_transfer: 5,
            seed,
        }
    }

    #[test]
    fn one_turnaround_per_arrival() {
        let generated = TransferGenerator::generate(&config(7)).unwrap();
        assert_eq!(generated.turnarounds().len(), 10);
        let per_turnaround: usize =
            generated.turnarounds().iter().map(|t| t.jobs.len()).sum();
        assert_eq!(per_turnaround, generated.job_count());
    }

    #[test]
    fn berths_reflect_peak_occupancy() {
        let generated = TransferGenerator::generate(&config(7)).unwrap();
        assert!(generated.berth_count() >= 1);
        assert!(generated.berth_count() <= 10);
    }

    #[test]
    fn jobs_connect_distinct_berths_within_windows() {
        let cfg = config(7);
        let generated = TransferGenerator::generate(&cfg).unwrap();
        for job in generated.jobs() {
            let JobKind::Transfer {
                quantity,
                pickup_location,
                pickup_after,
                dropoff_location,
                dropoff_before,
                ..
            } = &job.kind
            else {
                panic!("generator emitted a non-transfer job");
            };
            assert_ne!(pickup_location, dropoff_location);
            assert!(*quantity >= 1 && *quantity <= cfg.max_items_per_transfer);
            assert!(*dropoff_before - *pickup_after >= cfg.min_connection_time);
            assert!(*pickup_after >= cfg.earliest_arrival);
            assert!(*pickup_after < cfg.latest_arrival);
        }
    }

    #[test]
    fn same_seed_reproduces_the_schedule() {
        let first = TransferGenerator::generate(&config(42)).unwrap();
        let second = TransferGenerator::generate(&config(42)).unwrap();
        assert_eq!(first.jobs(), second.jobs());
        assert_eq!(first.berth_count(), second.berth_count());
    }

    #[test]
    fn empty_arrival_window_is_rejected() {
        let mut cfg = config(7);
        cfg.latest_arrival = cfg.earliest_arrival;
        assert!(matches!(
            TransferGenerator::generate(&cfg),
            Err(GenError::Config(_))
        ));
    }
}

// ── StaffingPlan ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod staffing_plan {
    use super::*;

    #[test]
    fn one_crew_mints_one_cart_per_member() {
        let shift = standard_shift("day", SimTime::hm(8, 0), LocationId(0), LocationId(9));
        let plan =
            StaffingPlan::generate(&[Crew { shift, size: 2 }], 10).unwrap();

        assert_eq!(plan.carts().len(), 2);
        // Per member: the mint suspension, three breaks, one shift end.
        assert_eq!(plan.jobs().len(), 10);
        assert!(plan.jobs().iter().all(|job| job.assigned_to.is_some()));
    }

    #[test]
    fn back_to_back_shifts_share_a_cart() {
        let day = standard_shift("day", SimTime::hm(8, 0), LocationId(0), LocationId(9));
        let swing = adjust_shift("swing", &day, 8 * HOUR);
        let crews = vec![
            Crew { shift: day, size: 1 },
            Crew { shift: swing, size: 1 },
        ];
        let plan = StaffingPlan::generate(&crews, 10).unwrap();

        // The swing shift takes over the day shift's parked cart.
        assert_eq!(plan.carts().len(), 1);

        // Day: mint + 3 breaks + end; swing: 3 breaks + end.
        assert_eq!(plan.jobs().len(), 9);

        // The mint suspension was cut short to the day shift's start.
        let mint = &plan.jobs()[0];
        let JobKind::OutOfService { suspend_time, resume_time, .. } = &mint.kind else {
            panic!("staffing emitted a transfer job");
        };
        assert_eq!(*suspend_time, SimTime::NEVER);
        assert_eq!(*resume_time, SimTime::hm(8, 0));

        // The day shift's end job now resumes when the swing shift starts.
        let day_end = &plan.jobs()[4];
        let JobKind::OutOfService { suspend_time, resume_time, .. } = &day_end.kind else {
            panic!("staffing emitted a transfer job");
        };
        assert_eq!(*suspend_time, SimTime::hm(8, 0) + (8 * HOUR - 1));
        assert_eq!(*resume_time, SimTime::hm(16, 0));

        // The swing shift's end job stays open.
        let swing_end = plan.jobs().last().unwrap();
        let JobKind::OutOfService { resume_time, .. } = &swing_end.kind else {
            panic!("staffing emitted a transfer job");
        };
        assert_eq!(*resume_time, SimTime::FOREVER);
    }

    #[test]
    fn interval_arithmetic() {
        let base = SimTime::hm(8, 0);
        let i = interval(base, 30 * MINUTE, 15 * MINUTE);
        assert_eq!(i.start, SimTime::hm(8, 30));
        assert_eq!(i.end, SimTime::hm(8, 45));

        let outer = interval(base, 0, 2 * HOUR);
        let inner = interval(base, 30 * MINUTE, 15 * MINUTE);
        assert!(contains(&outer, &inner));
        assert!(!contains(&inner, &outer));
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;
    use std::io::Cursor;

    const CSV: &[u8] = b"\
quantity,pickup_location,pickup_after,dropoff_location,dropoff_before\n\
5,2,180,10,1800\n\
6,2,180,4,1500\n\
";

    #[test]
    fn loads_rows_in_order() {
        let jobs = load_transfers_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, JobId(0));
        assert_eq!(jobs[1].id, JobId(1));

        let JobKind::Transfer { quantity, pickup_location, dropoff_before, .. } = &jobs[1].kind
        else {
            panic!("loader emitted a non-transfer job");
        };
        assert_eq!(*quantity, 6);
        assert_eq!(*pickup_location, LocationId(2));
        assert_eq!(*dropoff_before, SimTime(1500));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let bad = b"\
quantity,pickup_location,pickup_after,dropoff_location,dropoff_before\n\
0,2,180,10,1800\n\
";
        assert!(matches!(
            load_transfers_reader(Cursor::new(bad.as_slice())),
            Err(GenError::Parse(_))
        ));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let bad = b"\
quantity,pickup_location,pickup_after,dropoff_location,dropoff_before\n\
5,2,1800,10,180\n\
";
        assert!(matches!(
            load_transfers_reader(Cursor::new(bad.as_slice())),
            Err(GenError::Parse(_))
        ));
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let bad = b"\
quantity,pickup_location,pickup_after,dropoff_location,dropoff_before\n\
not,a,valid,row,at all\n\
";
        assert!(matches!(
            load_transfers_reader(Cursor::new(bad.as_slice())),
            Err(GenError::Parse(_))
        ));
    }
}
