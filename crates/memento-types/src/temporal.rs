use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Second-precision instant used for all version bookkeeping.
///
/// Every conversion from a finer-grained instant truncates toward negative
/// infinity, so two instants within the same wall-clock second map to the
/// same timestamp. Sub-second deltas are not distinguishable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from whole seconds since the UNIX epoch.
    pub const fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Truncate a UTC instant to its containing second.
    pub fn from_datetime(instant: &DateTime<Utc>) -> Self {
        Self(instant.timestamp())
    }

    /// The current wall-clock second.
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now())
    }

    /// Whole seconds since the UNIX epoch.
    pub const fn epoch_seconds(&self) -> i64 {
        self.0
    }

    /// Convert back to a UTC instant, if representable.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, TypeError> {
        DateTime::from_timestamp(self.0, 0).ok_or(TypeError::TimestampOutOfRange(self.0))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_datetime(&instant)
    }
}

/// Accepts either an RFC 3339 instant or a bare epoch-seconds integer.
impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(seconds) = s.parse::<i64>() {
            return Ok(Self(seconds));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self::from_datetime(&dt.with_timezone(&Utc)))
            .map_err(|_| TypeError::InvalidTimestamp(s.to_string()))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}s)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Ok(dt) => write!(f, "{}", dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
            Err(_) => write!(f, "{}s", self.0),
        }
    }
}

/// The period `[from, until)` during which one version was current.
///
/// The last range of a timeline ends at the instant the timeline was listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRange {
    pub from: Timestamp,
    pub until: Timestamp,
}

impl VersionRange {
    pub fn new(from: Timestamp, until: Timestamp) -> Self {
        Self { from, until }
    }

    /// Returns `true` if `at` falls inside `[from, until)`.
    pub fn contains(&self, at: Timestamp) -> bool {
        self.from <= at && at < self.until
    }

    /// Length of the range in seconds.
    pub fn duration_seconds(&self) -> i64 {
        self.until.0.saturating_sub(self.from.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncates_sub_second_precision() {
        let instant = Utc.timestamp_opt(1_000, 999_000_000).unwrap();
        assert_eq!(Timestamp::from_datetime(&instant), Timestamp::from_epoch_seconds(1_000));
    }

    #[test]
    fn truncates_negative_instants_downward() {
        let instant = Utc.timestamp_opt(-5, 500_000_000).unwrap();
        assert_eq!(Timestamp::from(instant).epoch_seconds(), -5);
    }

    #[test]
    fn same_second_is_indistinguishable() {
        let a = Utc.timestamp_opt(42, 1).unwrap();
        let b = Utc.timestamp_opt(42, 999_999_999).unwrap();
        assert_eq!(Timestamp::from(a), Timestamp::from(b));
    }

    #[test]
    fn now_produces_reasonable_timestamp() {
        // After 2020-01-01.
        assert!(Timestamp::now().epoch_seconds() > 1_577_836_800);
    }

    #[test]
    fn parse_epoch_and_rfc3339() {
        assert_eq!("150".parse::<Timestamp>().unwrap(), Timestamp::from_epoch_seconds(150));
        assert_eq!(
            "1970-01-01T00:02:30.750Z".parse::<Timestamp>().unwrap(),
            Timestamp::from_epoch_seconds(150)
        );
        assert!("yesterday".parse::<Timestamp>().is_err());
    }

    #[test]
    fn display_format() {
        assert_eq!(Timestamp::from_epoch_seconds(0).to_string(), "1970-01-01T00:00:00Z");
        assert_eq!(Timestamp::from_epoch_seconds(i64::MAX).to_string(), format!("{}s", i64::MAX));
    }

    #[test]
    fn serde_is_plain_integer() {
        let json = serde_json::to_string(&Timestamp::from_epoch_seconds(1234)).unwrap();
        assert_eq!(json, "1234");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.epoch_seconds(), 1234);
    }

    #[test]
    fn range_is_half_open() {
        let range = VersionRange::new(Timestamp::from_epoch_seconds(100), Timestamp::from_epoch_seconds(200));
        assert!(range.contains(Timestamp::from_epoch_seconds(100)));
        assert!(range.contains(Timestamp::from_epoch_seconds(199)));
        assert!(!range.contains(Timestamp::from_epoch_seconds(200)));
        assert_eq!(range.duration_seconds(), 100);
    }

    #[test]
    fn duration_saturates_at_extremes() {
        let range = VersionRange::new(Timestamp::from_epoch_seconds(i64::MIN), Timestamp::from_epoch_seconds(i64::MAX));
        assert_eq!(range.duration_seconds(), i64::MAX);
        let inverted = VersionRange::new(Timestamp::from_epoch_seconds(i64::MAX), Timestamp::from_epoch_seconds(-1));
        assert_eq!(inverted.duration_seconds(), i64::MIN);
    }
}
