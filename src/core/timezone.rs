use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Rista business dates are Indian Standard Time (UTC+5:30) calendar days.
/// All timestamps are stored internally as UTC and converted at the edges.
pub struct TimezoneConverter;

const IST_OFFSET_SECS: i32 = 5 * 3600 + 1800;

impl TimezoneConverter {
    /// Convert a UTC timestamp to Asia/Kolkata (UTC+5:30)
    pub fn utc_to_ist(utc_time: DateTime<Utc>) -> DateTime<FixedOffset> {
        let ist_offset = FixedOffset::east_opt(IST_OFFSET_SECS).expect("Valid offset");
        utc_time.with_timezone(&ist_offset)
    }

    /// Convert an Asia/Kolkata timestamp to UTC
    pub fn ist_to_utc(ist_time: DateTime<FixedOffset>) -> DateTime<Utc> {
        ist_time.with_timezone(&Utc)
    }

    /// The business date a UTC instant falls on for an Indian restaurant
    pub fn business_date(utc_time: DateTime<Utc>) -> NaiveDate {
        Self::utc_to_ist(utc_time).date_naive()
    }

    /// Today's business date in IST
    pub fn business_date_today() -> NaiveDate {
        Self::business_date(Utc::now())
    }

    /// Format timestamp as ISO 8601 UTC for API responses
    pub fn format_iso8601_utc(utc_time: DateTime<Utc>) -> String {
        utc_time.to_rfc3339()
    }
}
