use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Wall-clock instant as UTC milliseconds since the Unix epoch.
///
/// Stored as an integer so that it serializes identically everywhere; block
/// hashing depends on that.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now())
    }

    /// Convert from a chrono datetime. Instants before the epoch clamp to zero.
    pub fn from_datetime(dt: &DateTime<Utc>) -> Self {
        Self(u64::try_from(dt.timestamp_millis()).unwrap_or(0))
    }

    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.0).ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(&dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        assert!(Timestamp::now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn datetime_roundtrip() {
        let ts = Timestamp::from_millis(1_700_000_000_123);
        let dt = ts.to_datetime().unwrap();
        assert_eq!(Timestamp::from(dt), ts);
    }

    #[test]
    fn display_is_iso8601() {
        let ts = Timestamp::from_millis(0);
        assert_eq!(ts.to_string(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn serializes_as_integer() {
        let json = serde_json::to_string(&Timestamp::from_millis(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn ordering_follows_millis() {
        assert!(Timestamp::from_millis(1) < Timestamp::from_millis(2));
    }
}
