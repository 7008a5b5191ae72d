use chrono::{DateTime, Duration, NaiveDate, Utc};

/// `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// True when `date` is at most `days_back` days before `now`.
/// Dates in the future count as recent.
pub fn is_recent(date: &DateTime<Utc>, days_back: u32, now: &DateTime<Utc>) -> bool {
    *now - *date <= Duration::days(i64::from(days_back))
}

/// Gmail `after:` operand for a window of `days_back` days ending `today`
pub fn gmail_after_date(today: NaiveDate, days_back: u32) -> String {
    let since = today - Duration::days(i64::from(days_back));
    since.format("%Y/%m/%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2025, 7, 1, 23, 59, 0).unwrap();
        assert_eq!(format_date(date.date_naive()), "2025-07-01");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2025, 12, 9).unwrap()), "2025-12-09");
    }

    #[test]
    fn test_is_recent() {
        let now = Utc.with_ymd_and_hms(2025, 7, 31, 12, 0, 0).unwrap();

        assert!(is_recent(&Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap(), 30, &now));
        assert!(!is_recent(&Utc.with_ymd_and_hms(2025, 7, 1, 11, 59, 0).unwrap(), 30, &now));
        assert!(is_recent(&Utc.with_ymd_and_hms(2025, 8, 2, 0, 0, 0).unwrap(), 1, &now));
    }

    #[test]
    fn test_gmail_after_date() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(gmail_after_date(today, 30), "2025/01/30");
    }
}
