use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::calendar::{Calendar, DateWindow};

/// Default span of a sales report without explicit dates
pub const DEFAULT_SALES_SPAN_DAYS: i64 = 7;

// ============================================================================
// Grouping and Periods
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
}

impl GroupBy {
    /// Unknown values fall back to `day`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => GroupBy::Week,
            "month" => GroupBy::Month,
            _ => GroupBy::Day,
        }
    }

    pub fn bucket_key(&self, calendar: &Calendar, ts: DateTime<Utc>) -> String {
        match self {
            GroupBy::Day => calendar.day_key(ts),
            GroupBy::Week => calendar.week_key(ts),
            GroupBy::Month => calendar.month_key(ts),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Day => write!(f, "day"),
            GroupBy::Week => write!(f, "week"),
            GroupBy::Month => write!(f, "month"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "today" | "day" => Some(Period::Today),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "year" => Some(Period::Year),
            _ => None,
        }
    }

    /// `[start of period, now]`. `week` is the trailing seven days.
    pub fn window(&self, calendar: &Calendar, now: DateTime<Utc>) -> DateWindow {
        let start = match self {
            Period::Today => calendar.day_start(now),
            Period::Week => now - Duration::days(7),
            Period::Month => calendar.month_start(now),
            Period::Year => calendar.year_start(now),
        };
        DateWindow::new(start, now)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Today => write!(f, "today"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::Year => write!(f, "year"),
        }
    }
}

// ============================================================================
// Report Queries
// ============================================================================

/// `?startDate&endDate&groupBy`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub group_by: GroupBy,
}

impl SalesQuery {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = SalesQuery::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "startDate" => query.start_date = Some(value.to_string()),
                "endDate" => query.end_date = Some(value.to_string()),
                "groupBy" => query.group_by = GroupBy::parse(value),
                _ => {}
            }
        }
        query
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = date_pairs(&self.start_date, &self.end_date);
        pairs.push(("groupBy".to_string(), self.group_by.to_string()));
        pairs
    }

    /// Explicit bounds win; each missing or unparseable side defaults to the
    /// trailing seven days ending `now`.
    pub fn window(&self, calendar: &Calendar, now: DateTime<Utc>) -> DateWindow {
        let start = self
            .start_date
            .as_deref()
            .and_then(|raw| calendar.parse_bound(raw, false))
            .unwrap_or_else(|| now - Duration::days(DEFAULT_SALES_SPAN_DAYS));
        let end = self
            .end_date
            .as_deref()
            .and_then(|raw| calendar.parse_bound(raw, true))
            .unwrap_or(now);
        DateWindow::new(start, end)
    }
}

/// `?period` or `?startDate&endDate`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryQuery {
    pub period: Option<Period>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SummaryQuery {
    pub fn period(period: Period) -> Self {
        Self {
            period: Some(period),
            ..Self::default()
        }
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            period: None,
            start_date: Some(start.into()),
            end_date: Some(end.into()),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = SummaryQuery::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "period" => query.period = Period::parse(value),
                "startDate" => query.start_date = Some(value.to_string()),
                "endDate" => query.end_date = Some(value.to_string()),
                _ => {}
            }
        }
        query
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = date_pairs(&self.start_date, &self.end_date);
        if let Some(period) = self.period {
            pairs.push(("period".to_string(), period.to_string()));
        }
        pairs
    }

    /// Explicit dates take precedence over `period`. With only one date the
    /// other side is open (epoch or `now`). Neither ⇒ `period`, default month.
    pub fn window(&self, calendar: &Calendar, now: DateTime<Utc>) -> DateWindow {
        let start = self.start_date.as_deref().and_then(|raw| calendar.parse_bound(raw, false));
        let end = self.end_date.as_deref().and_then(|raw| calendar.parse_bound(raw, true));

        if start.is_none() && end.is_none() {
            return self.period.unwrap_or_default().window(calendar, now);
        }

        DateWindow::new(start.unwrap_or(DateTime::UNIX_EPOCH), end.unwrap_or(now))
    }
}

fn date_pairs(start: &Option<String>, end: &Option<String>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Some(start) = start {
        pairs.push(("startDate".to_string(), start.clone()));
    }
    if let Some(end) = end {
        pairs.push(("endDate".to_string(), end.clone()));
    }
    pairs
}
