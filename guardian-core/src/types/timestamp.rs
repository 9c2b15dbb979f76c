//! Timestamp type for representing Unix millisecond timestamps.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use super::ValidationError;

/// Timestamp type - used for representing Unix millisecond timestamps.
///
/// Wraps an `i64` value representing milliseconds since Unix epoch.
///
/// # Examples
///
/// ```
/// use guardian_core::types::Timestamp;
///
/// let ts = Timestamp::now();
/// assert!(ts.as_millis() > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Zero timestamp constant.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Timestamp` from milliseconds since Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimestamp` if the value is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::types::Timestamp;
    ///
    /// let ts = Timestamp::new(1_704_067_200_000).unwrap();
    /// assert!(Timestamp::new(-1).is_err());
    /// ```
    pub fn new(millis: i64) -> Result<Self, ValidationError> {
        if millis < 0 {
            return Err(ValidationError::InvalidTimestamp(millis));
        }
        Ok(Self(millis))
    }

    /// Returns the current timestamp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System time before Unix epoch");
        Self(duration.as_millis() as i64)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// Converts to a `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    }

    /// Renders the timestamp as an ISO-8601 / RFC 3339 string in UTC.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::types::Timestamp;
    ///
    /// let ts = Timestamp::new(1_704_067_200_000).unwrap();
    /// assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00.000Z");
    /// ```
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(
            Timestamp::new(-5),
            Err(ValidationError::InvalidTimestamp(-5))
        );
        assert!(Timestamp::new(0).is_ok());
    }

    #[test]
    fn test_now_is_positive() {
        assert!(Timestamp::now().as_millis() > 0);
    }

    #[test]
    fn test_rfc3339_rendering() {
        let ts = Timestamp::new(1_704_067_200_000).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00.000Z");
        assert_eq!(ts.to_string(), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_datetime_roundtrip() {
        let ts = Timestamp::new(1_704_067_200_123).unwrap();
        let roundtripped = Timestamp::from_datetime(ts.to_datetime());
        assert_eq!(ts, roundtripped);
    }

    #[test]
    fn test_as_secs_truncates() {
        let ts = Timestamp::new(1_999).unwrap();
        assert_eq!(ts.as_secs(), 1);
    }
}
