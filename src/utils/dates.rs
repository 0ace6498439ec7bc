//! Date conversions for show listings
//!
//! Show dates are stored as `d/m/yyyy` text and exchanged with clients as
//! ISO 8601 dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format a date the way it is stored in the `shows` table
pub fn date_to_db(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Parse a stored `d/m/yyyy` date
pub fn date_from_db(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y").ok()
}

/// Parse an ISO 8601 date or datetime sent by a client
///
/// Datetimes keep the calendar day as written; the offset is not applied.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local().date());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_db_format() {
        assert_eq!(date_to_db(ymd(2024, 3, 7)), "7/3/2024");
        assert_eq!(date_to_db(ymd(2024, 12, 25)), "25/12/2024");
        assert_eq!(date_from_db("7/3/2024"), Some(ymd(2024, 3, 7)));
        assert_eq!(date_from_db("07/03/2024"), Some(ymd(2024, 3, 7)));
        assert_eq!(date_from_db("2024-03-07"), None);
    }

    #[test]
    fn test_db_roundtrip_across_year() {
        let mut date = ymd(2023, 12, 25);
        while date < ymd(2024, 3, 5) {
            assert_eq!(date_from_db(&date_to_db(date)), Some(date));
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2024-05-10"), Some(ymd(2024, 5, 10)));
        assert_eq!(parse_iso_date("2024-05-10T00:00:00.000Z"), Some(ymd(2024, 5, 10)));
        assert_eq!(parse_iso_date("2024-05-10T23:30:00-05:00"), Some(ymd(2024, 5, 10)));
        assert_eq!(parse_iso_date("2024-05-10T20:00"), Some(ymd(2024, 5, 10)));
        assert_eq!(parse_iso_date("10/05/2024"), None);
        assert_eq!(parse_iso_date("tomorrow"), None);
    }
}
