//! Target-date selection for the two phases.
//!
//! The tracker's calendar day is AEST (UTC+10, no DST adjustment); the
//! provider aligns its daily arrays to Australia/Sydney separately via the
//! request's timezone parameter.

use chrono::{Duration, FixedOffset, NaiveDate, Offset, Utc};

fn aest() -> FixedOffset {
    FixedOffset::east_opt(10 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Forecast collection targets the day that is just starting.
pub fn today_aest() -> NaiveDate {
    Utc::now().with_timezone(&aest()).date_naive()
}

/// Comparison targets the day that has just completed.
pub fn yesterday_aest() -> NaiveDate {
    today_aest() - Duration::days(1)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn aest_is_utc_plus_ten() {
        assert_eq!(aest().local_minus_utc(), 10 * 3600);
    }

    #[test]
    fn yesterday_is_one_day_before_today() {
        let today = today_aest();
        let yesterday = yesterday_aest();
        // Tolerate a midnight rollover between the two calls.
        let gap = today - yesterday;
        assert!(gap == Duration::days(1) || gap == Duration::days(2));
    }
}
