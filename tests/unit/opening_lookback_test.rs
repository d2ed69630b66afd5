// The opening-inventory lookback rule: opening stock for a date is the
// previous day's closing valuation, except Mondays reach back to
// Saturday because branches run no Sunday day-end.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use platewise::modules::inventory::services::opening_lookback_date;

#[test]
fn test_tuesday_through_sunday_look_back_one_day() {
    // 2025-08-05 (Tue) .. 2025-08-10 (Sun)
    for day in 5..=10 {
        let date = NaiveDate::from_ymd_opt(2025, 8, day).unwrap();
        assert_ne!(date.weekday(), Weekday::Mon);
        assert_eq!(
            opening_lookback_date(date),
            date - Duration::days(1),
            "{} should look back one day",
            date
        );
    }
}

#[test]
fn test_monday_looks_back_to_saturday() {
    let monday = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
    assert_eq!(monday.weekday(), Weekday::Mon);

    let expected = NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
    assert_eq!(expected.weekday(), Weekday::Sat);
    assert_eq!(opening_lookback_date(monday), expected);
}

#[test]
fn test_monday_lookback_crosses_month_boundary() {
    // 2025-09-01 is a Monday; Saturday is 2025-08-30
    let monday = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
    assert_eq!(monday.weekday(), Weekday::Mon);

    assert_eq!(
        opening_lookback_date(monday),
        NaiveDate::from_ymd_opt(2025, 8, 30).unwrap()
    );
}

#[test]
fn test_monday_lookback_crosses_year_boundary() {
    // 2024-01-01 is a Monday; Saturday is 2023-12-30
    let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(monday.weekday(), Weekday::Mon);

    assert_eq!(
        opening_lookback_date(monday),
        NaiveDate::from_ymd_opt(2023, 12, 30).unwrap()
    );
}

#[test]
fn test_lookback_never_lands_on_a_sunday() {
    // Whatever the weekday, the expected opening day is a working day
    let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    for offset in 0..28 {
        let date = start + Duration::days(offset);
        assert_ne!(
            opening_lookback_date(date).weekday(),
            Weekday::Sun,
            "lookback for {} landed on a Sunday",
            date
        );
    }
}
