//! Hour-bucketed shard identifiers for the event feed.
//!
//! The feed publishes one compressed shard per UTC hour at
//! `/YYYY-MM-DD-H.json.gz` (month and day zero-padded, hour not — the
//! feed's own convention). A shard only exists once its hour has fully
//! elapsed, so cycle windows always end at least one hour in the past.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};

/// Identifies one hour-bucketed shard of the event feed.
///
/// A `ShardId` is immutable and maps deterministically to a fetch path.
/// Ordering follows bucket time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardId(DateTime<Utc>);

impl ShardId {
    /// Creates a shard id for the hour bucket containing `instant`.
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(truncate_to_hour(instant))
    }

    /// Returns the most recent fully-elapsed hour bucket as of `now`.
    ///
    /// The bucket for hour H covers [H, H+1); it is complete only once
    /// `now` has passed H+1, so this is always at least one full hour in
    /// the past.
    #[must_use]
    pub fn latest_complete(now: DateTime<Utc>) -> Self {
        Self(truncate_to_hour(now) - Duration::hours(1))
    }

    /// Returns the `count` consecutive hour buckets ending at
    /// [`Self::latest_complete`], oldest first.
    #[must_use]
    pub fn trailing(now: DateTime<Utc>, count: usize) -> Vec<Self> {
        let end = Self::latest_complete(now);
        (0..count)
            .rev()
            .map(|back| Self(end.0 - Duration::hours(back as i64)))
            .collect()
    }

    /// Returns the hour bucket this shard covers.
    #[must_use]
    pub fn bucket(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the feed path for this shard, e.g. `/2016-09-09-1.json.gz`.
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "/{:04}-{:02}-{:02}-{}.json.gz",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour()
        )
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}-{}",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour()
        )
    }
}

fn truncate_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    // Components come from a valid timestamp, so reassembly cannot be
    // ambiguous in UTC; fall back to the input rather than panic.
    Utc.with_ymd_and_hms(
        instant.year(),
        instant.month(),
        instant.day(),
        instant.hour(),
        0,
        0,
    )
    .single()
    .unwrap_or(instant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn path_pads_month_and_day_but_not_hour() {
        let shard = ShardId::new(at(2016, 9, 9, 1, 30));
        assert_eq!(shard.path(), "/2016-09-09-1.json.gz");
        assert_eq!(shard.to_string(), "2016-09-09-1");
    }

    #[test]
    fn path_with_two_digit_hour() {
        let shard = ShardId::new(at(2016, 12, 31, 23, 0));
        assert_eq!(shard.path(), "/2016-12-31-23.json.gz");
    }

    #[test]
    fn latest_complete_is_at_least_one_hour_back() {
        let now = at(2024, 3, 5, 14, 45);
        let shard = ShardId::latest_complete(now);
        assert_eq!(shard.bucket(), at(2024, 3, 5, 13, 0));
    }

    #[test]
    fn latest_complete_on_the_hour_boundary() {
        let now = at(2024, 3, 5, 14, 0);
        let shard = ShardId::latest_complete(now);
        assert_eq!(shard.bucket(), at(2024, 3, 5, 13, 0));
    }

    #[test]
    fn trailing_returns_oldest_first_and_crosses_midnight() {
        let now = at(2024, 3, 5, 1, 10);
        let shards = ShardId::trailing(now, 3);
        assert_eq!(
            shards,
            vec![
                ShardId::new(at(2024, 3, 4, 22, 0)),
                ShardId::new(at(2024, 3, 4, 23, 0)),
                ShardId::new(at(2024, 3, 5, 0, 0)),
            ]
        );
    }

    #[test]
    fn trailing_zero_is_empty() {
        assert!(ShardId::trailing(at(2024, 3, 5, 1, 0), 0).is_empty());
    }
}
