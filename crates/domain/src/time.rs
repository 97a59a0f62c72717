//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

/// UTC timestamp used for log entries, rule creation times, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current home-local wall-clock time.
///
/// Trigger schedules and daily-limit boundaries are expressed in the home's
/// local time, so the engine evaluates against this rather than UTC.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }
}
