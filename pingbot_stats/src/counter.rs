use std::collections::VecDeque;

use chrono::{DateTime, Utc};

pub const SECOND_MS: i64 = 1_000;
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

/// Ping counts derived from the retained log at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateSnapshot {
    pub per_second: usize,
    pub per_minute: usize,
    pub per_hour: usize,
    /// Everything still held in the log, including entries waiting for the next prune.
    pub retained: usize,
}

/// Sliding-window ping counter backed by a single timestamp log.
///
/// All three windows are derived from the same log. Memory is bounded by
/// [`PingCounter::prune`], which the owner is expected to call at least hourly.
#[derive(Debug, Default)]
pub struct PingCounter {
    log: VecDeque<DateTime<Utc>>,
    latest: RateSnapshot,
}

impl PingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Instants that already fell out of every window are kept
    /// until the next prune but never counted.
    pub fn record(&mut self, at: DateTime<Utc>) {
        self.log.push_back(at);
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Counts entries younger than each window relative to `now`.
    pub fn snapshot(&self, now: DateTime<Utc>) -> RateSnapshot {
        let mut snapshot = RateSnapshot {
            retained: self.log.len(),
            ..Default::default()
        };

        for at in &self.log {
            let age = age_ms(now, *at);

            if age < HOUR_MS {
                snapshot.per_hour += 1;
            }
            if age < MINUTE_MS {
                snapshot.per_minute += 1;
            }
            if age < SECOND_MS {
                snapshot.per_second += 1;
            }
        }

        snapshot
    }

    /// Recomputes the snapshot and caches it for readers that only need the
    /// last published values.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> RateSnapshot {
        self.latest = self.snapshot(now);
        self.latest
    }

    pub fn latest(&self) -> RateSnapshot {
        self.latest
    }

    /// Drops every entry at least an hour old. Returns how many were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.log.len();
        self.log.retain(|at| age_ms(now, *at) < HOUR_MS);
        before - self.log.len()
    }
}

/// Entries stamped after `now` (clock jitter) are treated as brand new.
fn age_ms(now: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (now - at).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn base() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn ms(value: i64) -> TimeDelta {
        TimeDelta::milliseconds(value)
    }

    #[test]
    fn empty_counter_reports_zero() {
        let counter = PingCounter::new();
        assert_eq!(counter.snapshot(base()), RateSnapshot::default());
        assert!(counter.is_empty());
    }

    #[test]
    fn windows_are_exclusive_at_their_edge() {
        let now = base();
        let mut counter = PingCounter::new();

        counter.record(now - ms(HOUR_MS));
        counter.record(now - ms(HOUR_MS - 1));
        counter.record(now - ms(MINUTE_MS));
        counter.record(now - ms(MINUTE_MS - 1));
        counter.record(now - ms(SECOND_MS));
        counter.record(now - ms(SECOND_MS - 1));
        counter.record(now);

        let snapshot = counter.snapshot(now);
        assert_eq!(snapshot.per_second, 2);
        assert_eq!(snapshot.per_minute, 4);
        assert_eq!(snapshot.per_hour, 6);
        assert_eq!(snapshot.retained, 7);
    }

    #[test]
    fn per_hour_matches_retained_entries_younger_than_an_hour() {
        let now = base();
        let mut counter = PingCounter::new();
        let offsets = [7_200_000, 3_700_000, 3_599_999, 1_800_000, 59_000, 400, 0];

        for offset in offsets {
            counter.record(now - ms(offset));
        }

        let expected = offsets.iter().filter(|o| **o < HOUR_MS).count();
        assert_eq!(counter.snapshot(now).per_hour, expected);
    }

    #[test]
    fn prune_never_leaves_expired_entries() {
        let start = base();
        let mut counter = PingCounter::new();

        for step in 0..120 {
            counter.record(start + TimeDelta::minutes(step));
        }

        let now = start + TimeDelta::minutes(150);
        let before = counter.snapshot(now);
        let removed = counter.prune(now);
        let after = counter.snapshot(now);

        assert_eq!(removed, 91);
        assert_eq!(counter.len(), 29);
        assert_eq!(after.retained, after.per_hour);
        assert!(after.per_hour <= before.per_hour);
        assert!(after.per_minute <= after.per_hour);
        assert!(after.per_second <= after.per_minute);
    }

    #[test]
    fn per_hour_never_grows_across_successive_prunes() {
        let start = base();
        let mut counter = PingCounter::new();
        for step in 0..50 {
            counter.record(start + TimeDelta::seconds(step * 90));
        }

        let mut previous = usize::MAX;
        for hour in 1..5 {
            let now = start + TimeDelta::hours(hour);
            counter.prune(now);
            let per_hour = counter.snapshot(now).per_hour;
            assert!(per_hour <= previous);
            previous = per_hour;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn skewed_record_is_kept_but_never_counted() {
        let now = base();
        let mut counter = PingCounter::new();

        counter.record(now - TimeDelta::hours(2));

        assert_eq!(counter.len(), 1);
        let snapshot = counter.snapshot(now);
        assert_eq!(snapshot.per_hour, 0);
        assert_eq!(snapshot.retained, 1);

        assert_eq!(counter.prune(now), 1);
        assert!(counter.is_empty());
    }

    #[test]
    fn future_entries_count_as_fresh() {
        let now = base();
        let mut counter = PingCounter::new();

        counter.record(now + ms(250));

        let snapshot = counter.snapshot(now);
        assert_eq!(snapshot.per_second, 1);
        assert_eq!(snapshot.per_hour, 1);
        assert_eq!(counter.prune(now), 0);
    }

    #[test]
    fn refresh_caches_last_snapshot() {
        let now = base();
        let mut counter = PingCounter::new();
        counter.record(now);

        assert_eq!(counter.latest(), RateSnapshot::default());
        let refreshed = counter.refresh(now);
        assert_eq!(counter.latest(), refreshed);
        assert_eq!(refreshed.per_second, 1);

        counter.record(now);
        assert_eq!(counter.latest().retained, 1);
    }
}
