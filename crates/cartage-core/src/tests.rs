//! Unit tests for cartage-core.

use crate::{Estimator, LinearCorridor, LocationId, MINUTE, SECOND, SimTime};

// ── SimTime ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sim_time {
    use super::*;

    #[test]
    fn clock_constructors() {
        assert_eq!(SimTime::hm(0, 30), SimTime(1800));
        assert_eq!(SimTime::hms(1, 2, 3), SimTime(3723));
        assert_eq!(SimTime::hm(24, 0), SimTime(86_400));
    }

    #[test]
    fn arithmetic() {
        let t = SimTime::hm(0, 10);
        assert_eq!(t + 5 * MINUTE, SimTime::hm(0, 15));
        assert_eq!(SimTime::hm(0, 15) - t, 5 * MINUTE);
        assert_eq!(SimTime::hm(0, 15).since(t), 300);
    }

    #[test]
    fn sentinels_bracket_everything() {
        assert!(SimTime::NEVER < SimTime::hm(0, 0));
        assert!(SimTime::FOREVER > SimTime::hm(1000, 0));
        assert!(SimTime::NEVER < SimTime::FOREVER);
    }

    #[test]
    fn hms_formatting() {
        assert_eq!(SimTime::hms(0, 59, 0).format_hms(), "00:59:00");
        assert_eq!(SimTime::hms(13, 5, 9).format_hms(), "13:05:09");
        assert_eq!(SimTime::NEVER.format_hms(), "-inf");
        assert_eq!(SimTime::FOREVER.format_hms(), "+inf");
    }
}

// ── LinearCorridor ────────────────────────────────────────────────────────────

#[cfg(test)]
mod linear_corridor {
    use super::*;

    #[test]
    fn transit_is_symmetric_minutes() {
        let est = LinearCorridor;
        let t = SimTime::ZERO;
        assert_eq!(est.transit_time(LocationId(0), LocationId(7), t), 7 * MINUTE);
        assert_eq!(est.transit_time(LocationId(7), LocationId(0), t), 7 * MINUTE);
        assert_eq!(est.transit_time(LocationId(4), LocationId(4), t), 0);
    }

    #[test]
    fn next_step_moves_one_unit_toward_destination() {
        let est = LinearCorridor;
        let t = SimTime::ZERO;
        assert_eq!(est.route_next_step(LocationId(2), LocationId(9), t), LocationId(3));
        assert_eq!(est.route_next_step(LocationId(9), LocationId(2), t), LocationId(8));
        assert_eq!(est.route_next_step(LocationId(5), LocationId(5), t), LocationId(5));
    }

    #[test]
    fn handling_times_scale_with_quantity() {
        let est = LinearCorridor;
        let t = SimTime::ZERO;
        assert_eq!(est.load_time(LocationId(1), 5, t), 150 * SECOND);
        assert_eq!(est.unload_time(LocationId(1), 5, t), 50 * SECOND);
    }
}
