//! Instants
//!
//! All promotion time math works on exact [`jiff::Timestamp`] differences and
//! truncates to whole minutes with floor division, so results never depend on
//! time zones or float precision, and agree with direct instant comparisons.

use std::cell::Cell;

use jiff::{SignedDuration, Timestamp};

/// Nanoseconds in one minute.
pub const NANOS_PER_MINUTE: i128 = 60_000_000_000;

/// Source of the current instant.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Manually driven clock, for tests and replays.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    /// Move the clock forward (or backward) by `by`. Out of range moves are ignored.
    pub fn advance(&self, by: SignedDuration) {
        let current = self.now.get();
        let next = current.checked_add(by).unwrap_or(current);

        self.now.set(next);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Exact span from `earlier` to `later` (negative if `later` is before `earlier`).
pub fn span_between(earlier: Timestamp, later: Timestamp) -> SignedDuration {
    later.duration_since(earlier)
}

/// Whole minutes from `earlier` to `later`, floored.
pub fn whole_minutes_between(earlier: Timestamp, later: Timestamp) -> i64 {
    let minutes = span_between(earlier, later)
        .as_nanos()
        .div_euclid(NANOS_PER_MINUTE);

    // Any two timestamps are far less than i64::MAX minutes apart.
    i64::try_from(minutes).unwrap_or(i64::MAX)
}

/// Offset `instant` by a whole number of minutes, saturating at the
/// representable range.
pub fn add_minutes(instant: Timestamp, minutes: i64) -> Timestamp {
    let saturated = if minutes < 0 {
        Timestamp::MIN
    } else {
        Timestamp::MAX
    };

    minutes
        .checked_mul(60)
        .map(SignedDuration::from_secs)
        .and_then(|offset| instant.checked_add(offset).ok())
        .unwrap_or(saturated)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn at(s: &str) -> Result<Timestamp, jiff::Error> {
        s.parse()
    }

    #[test]
    fn whole_minutes_truncates_partial_minutes() -> TestResult {
        let end = at("2026-10-16T12:00:00Z")?;

        assert_eq!(whole_minutes_between(end, at("2026-10-16T12:00:59Z")?), 0);
        assert_eq!(whole_minutes_between(end, at("2026-10-16T12:01:00Z")?), 1);
        assert_eq!(whole_minutes_between(end, at("2026-10-16T12:25:30Z")?), 25);

        Ok(())
    }

    #[test]
    fn whole_minutes_floors_negative_spans() -> TestResult {
        let end = at("2026-10-16T12:00:00Z")?;

        assert_eq!(whole_minutes_between(end, at("2026-10-16T11:59:59Z")?), -1);

        Ok(())
    }

    #[test]
    fn whole_minutes_ignore_millisecond_rounding() -> TestResult {
        let end = at("2026-10-16T12:00:59.9999Z")?;
        let now = at("2026-10-16T12:01:59.9995Z")?;

        assert_eq!(whole_minutes_between(end, now), 0);
        assert_eq!(whole_minutes_between(end, at("2026-10-16T12:01:59.9999Z")?), 1);
        assert_eq!(whole_minutes_between(now, end), -1);

        Ok(())
    }

    #[test]
    fn span_between_is_signed() -> TestResult {
        let a = at("2026-10-16T12:00:00Z")?;
        let b = at("2026-10-16T12:00:01.5Z")?;

        assert_eq!(span_between(a, b), SignedDuration::from_millis(1_500));
        assert_eq!(span_between(b, a), SignedDuration::from_millis(-1_500));

        Ok(())
    }

    #[test]
    fn add_minutes_offsets_instant() -> TestResult {
        let start = at("2026-10-16T12:00:00Z")?;

        assert_eq!(add_minutes(start, 90), at("2026-10-16T13:30:00Z")?);

        Ok(())
    }

    #[test]
    fn add_minutes_saturates() {
        assert_eq!(add_minutes(Timestamp::MAX, 10), Timestamp::MAX);
        assert_eq!(add_minutes(Timestamp::MIN, -10), Timestamp::MIN);
    }

    #[test]
    fn manual_clock_advances() -> TestResult {
        let clock = ManualClock::new(at("2026-10-16T12:00:00Z")?);

        clock.advance(SignedDuration::from_secs(61));

        assert_eq!(clock.now(), at("2026-10-16T12:01:01Z")?);

        clock.set(at("2026-10-17T00:00:00Z")?);

        assert_eq!(clock.now(), at("2026-10-17T00:00:00Z")?);

        Ok(())
    }
}
