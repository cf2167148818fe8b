//! Time handling for login-event records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp representing a point in time with one-second precision
///
/// Accounting records store times as whole seconds since the Unix epoch,
/// so that is the native resolution here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since Unix epoch
    secs: i64,
}

impl Timestamp {
    /// Create a timestamp from seconds since Unix epoch
    pub fn from_secs(secs: i64) -> Self {
        Self { secs }
    }

    /// Get seconds since Unix epoch
    pub fn as_secs(&self) -> i64 {
        self.secs
    }

    /// Seconds elapsed from `self` to `later`
    ///
    /// Negative when `later` is actually earlier, which a malformed log can
    /// produce.
    pub fn seconds_until(&self, later: Timestamp) -> i64 {
        later.secs - self.secs
    }

    /// Convert to chrono DateTime
    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.secs, 0).unwrap_or_default()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            secs: dt.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_creation() {
        let ts = Timestamp::from_secs(1000);
        assert_eq!(ts.as_secs(), 1000);
    }

    #[test]
    fn test_seconds_until() {
        let login = Timestamp::from_secs(100);
        let logout = Timestamp::from_secs(200);
        assert_eq!(login.seconds_until(logout), 100);
        assert_eq!(logout.seconds_until(login), -100);
    }

    #[test]
    fn test_ordering() {
        assert!(Timestamp::from_secs(50) < Timestamp::from_secs(100));
    }
}
