//! Simulated time model.
//!
//! # Design
//!
//! Time is a monotonically non-decreasing integer number of simulated
//! seconds.  Using an integer as the canonical unit means all schedule
//! arithmetic is exact (no floating-point drift) and comparisons are O(1).
//! There is no wall-clock pacing: the timeline jumps straight from one
//! event time to the next.
//!
//! Two sentinels bracket the representable range: [`SimTime::NEVER`] marks
//! "no plan yet" (every real time is newer) and [`SimTime::FOREVER`] marks
//! "never expires" (every real time is earlier).

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A span of simulated time, in seconds.
pub type Duration = i64;

pub const SECOND: Duration = 1;
pub const MINUTE: Duration = 60 * SECOND;
pub const HOUR: Duration = 60 * MINUTE;
pub const DAY: Duration = 24 * HOUR;

/// Sentinel score for an assignment that must not be reconsidered.
pub const INFINITE_WORK: Duration = Duration::MAX;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulated time stamp, in seconds.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub i64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// "Before every representable time" — used for last-seen-plan stamps so
    /// the very first published plan always reads as newer.
    pub const NEVER: SimTime = SimTime(i64::MIN);

    /// "After every representable time" — used for open-ended suspensions.
    pub const FOREVER: SimTime = SimTime(i64::MAX);

    /// Clock time `hour:minute` on day zero.
    #[inline]
    pub const fn hm(hour: i64, minute: i64) -> SimTime {
        SimTime(hour * HOUR + minute * MINUTE)
    }

    /// Clock time `hour:minute:second` on day zero.
    #[inline]
    pub const fn hms(hour: i64, minute: i64, second: i64) -> SimTime {
        SimTime(hour * HOUR + minute * MINUTE + second * SECOND)
    }

    /// Simulated seconds from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> Duration {
        self.0 - earlier.0
    }

    /// Render as `HH:MM:SS` from the start of the simulation.
    ///
    /// The sentinels render as `-inf` / `+inf`; negative in-range times are
    /// clamped to `00:00:00` (they only arise in synthetic tests).
    pub fn format_hms(self) -> String {
        if self == SimTime::NEVER {
            return "-inf".to_string();
        }
        if self == SimTime::FOREVER {
            return "+inf".to_string();
        }
        let total = self.0.max(0);
        format!(
            "{:02}:{:02}:{:02}",
            total / HOUR,
            (total % HOUR) / MINUTE,
            total % MINUTE
        )
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: Duration) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl AddAssign<Duration> for SimTime {
    #[inline]
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

impl Sub for SimTime {
    type Output = Duration;
    #[inline]
    fn sub(self, rhs: SimTime) -> Duration {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}
