use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};

// ============================================================================
// Calendar - the one timezone policy for day boundaries and bucket keys
// ============================================================================
//
// Every "today", "first of the month" and every day/week/month bucket key on
// the local path is computed in this calendar. Configure the offset to match
// whatever timezone the remote backend groups by, otherwise the two paths can
// disagree for orders placed near midnight.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

/// Closed time window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// `None` when the offset is outside +/- 24h
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// Instant at which the given calendar date starts
    pub fn start_of(&self, date: NaiveDate) -> DateTime<Utc> {
        self.local_to_utc(date.and_time(NaiveTime::MIN))
    }

    pub fn day_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of(self.local_date(ts))
    }

    pub fn month_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = self.local_date(ts);
        self.start_of(date - Duration::days(i64::from(date.day0())))
    }

    pub fn year_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = self.local_date(ts);
        self.start_of(date - Duration::days(i64::from(date.ordinal0())))
    }

    /// The whole calendar day containing `ts`
    pub fn day_window(&self, ts: DateTime<Utc>) -> DateWindow {
        let start = self.day_start(ts);
        DateWindow::new(start, start + Duration::days(1) - Duration::nanoseconds(1))
    }

    /// `YYYY-MM-DD`
    pub fn day_key(&self, ts: DateTime<Utc>) -> String {
        self.local_date(ts).format("%Y-%m-%d").to_string()
    }

    /// Day key of the Monday that starts the week containing `ts`
    pub fn week_key(&self, ts: DateTime<Utc>) -> String {
        let date = self.local_date(ts);
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        monday.format("%Y-%m-%d").to_string()
    }

    /// `YYYY-MM`
    pub fn month_key(&self, ts: DateTime<Utc>) -> String {
        self.local_date(ts).format("%Y-%m").to_string()
    }

    /// Parse a query-string date bound.
    ///
    /// Accepts RFC 3339 instants, naive `YYYY-MM-DDTHH:MM:SS` (read in this
    /// calendar) and bare dates. A bare date used as an end bound covers the
    /// whole day. Anything else is treated as absent.
    pub fn parse_bound(&self, raw: &str, is_end: bool) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(self.local_to_utc(naive));
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        if is_end {
            Some(self.start_of(date) + Duration::days(1) - Duration::nanoseconds(1))
        } else {
            Some(self.start_of(date))
        }
    }

    fn local_to_utc(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        let utc = naive - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_day_keys_in_utc() {
        let cal = Calendar::utc();
        assert_eq!(cal.day_key(at(2024, 5, 10, 23, 59)), "2024-05-10");
        assert_eq!(cal.month_key(at(2024, 5, 10, 23, 59)), "2024-05");
    }

    #[test]
    fn test_offset_moves_day_boundary() {
        // UTC+03:00: 22:30 UTC is already the next local day
        let cal = Calendar::with_offset_minutes(180).unwrap();
        assert_eq!(cal.day_key(at(2024, 5, 10, 22, 30)), "2024-05-11");
        assert_eq!(cal.day_start(at(2024, 5, 10, 22, 30)), at(2024, 5, 10, 21, 0));
    }

    #[test]
    fn test_week_key_is_monday() {
        let cal = Calendar::utc();
        // 2024-05-12 is a Sunday, 2024-05-13 a Monday
        assert_eq!(cal.week_key(at(2024, 5, 12, 10, 0)), "2024-05-06");
        assert_eq!(cal.week_key(at(2024, 5, 13, 0, 0)), "2024-05-13");
        // Week spanning a year boundary keys on the December Monday
        assert_eq!(cal.week_key(at(2025, 1, 1, 8, 0)), "2024-12-30");
    }

    #[test]
    fn test_month_and_year_start() {
        let cal = Calendar::utc();
        assert_eq!(cal.month_start(at(2024, 5, 17, 13, 0)), at(2024, 5, 1, 0, 0));
        assert_eq!(cal.year_start(at(2024, 5, 17, 13, 0)), at(2024, 1, 1, 0, 0));
    }

    #[test]
    fn test_day_window_is_closed_over_whole_day() {
        let cal = Calendar::utc();
        let window = cal.day_window(at(2024, 5, 10, 12, 0));
        assert!(window.contains(at(2024, 5, 10, 0, 0)));
        assert!(window.contains(at(2024, 5, 10, 23, 59)));
        assert!(!window.contains(at(2024, 5, 11, 0, 0)));
    }

    #[test]
    fn test_parse_bound_formats() {
        let cal = Calendar::utc();
        assert_eq!(cal.parse_bound("2024-05-10", false), Some(at(2024, 5, 10, 0, 0)));
        assert_eq!(
            cal.parse_bound("2024-05-10", true),
            Some(at(2024, 5, 11, 0, 0) - Duration::nanoseconds(1))
        );
        assert_eq!(cal.parse_bound("2024-05-10T08:15:00Z", false), Some(at(2024, 5, 10, 8, 15)));
        assert_eq!(cal.parse_bound("2024-05-10T08:15:00", false), Some(at(2024, 5, 10, 8, 15)));
        assert_eq!(cal.parse_bound("yesterday", false), None);
        assert_eq!(cal.parse_bound("", true), None);
    }

    #[test]
    fn test_invalid_offset() {
        assert!(Calendar::with_offset_minutes(25 * 60).is_none());
    }
}
