//! Date/time values.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};

/// Shared, mutable handle to a UTC instant.
#[derive(Clone)]
pub struct DateValue(Rc<Cell<DateTime<Utc>>>);

impl DateValue {
    pub fn new(instant: DateTime<Utc>) -> Self {
        DateValue(Rc::new(Cell::new(instant)))
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Instant from milliseconds since the Unix epoch; `None` when out of
    /// chrono's range.
    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self::new)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0.get()
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.get().timestamp_millis()
    }

    /// Move this date to another instant. Every alias of the handle sees the
    /// change.
    pub fn set_instant(&self, instant: DateTime<Utc>) {
        self.0.set(instant);
    }

    /// ISO-8601 text with millisecond precision and a `Z` suffix. Years
    /// outside `0..=9999` use the expanded form: sign and six digits.
    pub fn to_iso_string(&self) -> String {
        let instant = self.0.get();
        let year = instant.year();
        if (0..=9999).contains(&year) {
            return instant.to_rfc3339_opts(SecondsFormat::Millis, true);
        }
        let sign = if year < 0 { '-' } else { '+' };
        format!(
            "{}{:06}-{}",
            sign,
            year.unsigned_abs(),
            instant.format("%m-%dT%H:%M:%S%.3fZ")
        )
    }

    /// New handle carrying the same instant.
    pub fn duplicate(&self) -> DateValue {
        Self::new(self.instant())
    }

    pub fn ptr_eq(&self, other: &DateValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Date").field(&self.to_iso_string()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_string_has_millis_and_z() {
        let date = DateValue::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(date.to_iso_string(), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_iso_string_expanded_years() {
        let first_after_9999 = DateValue::from_timestamp_millis(253_402_300_800_000).unwrap();
        assert_eq!(first_after_9999.to_iso_string(), "+010000-01-01T00:00:00.000Z");

        let last_of_9999 = DateValue::from_timestamp_millis(253_402_300_799_999).unwrap();
        assert_eq!(last_of_9999.to_iso_string(), "9999-12-31T23:59:59.999Z");

        let year_zero = DateValue::from_timestamp_millis(-62_167_219_200_000).unwrap();
        assert_eq!(year_zero.to_iso_string(), "0000-01-01T00:00:00.000Z");

        let year_minus_one = DateValue::from_timestamp_millis(-62_198_755_200_000).unwrap();
        assert_eq!(year_minus_one.to_iso_string(), "-000001-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_duplicate_is_detached() {
        let date = DateValue::from_timestamp_millis(0).unwrap();
        let copy = date.duplicate();
        assert!(!copy.ptr_eq(&date));

        date.set_instant(Utc.timestamp_millis_opt(5_000).unwrap());
        assert_eq!(copy.timestamp_millis(), 0);
        assert_eq!(date.timestamp_millis(), 5_000);
    }
}
