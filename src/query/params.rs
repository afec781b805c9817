use std::fmt;

use crate::domain::lenient::{coerce_f64, coerce_i64};

// ============================================================================
// List Query Parameters - the contract shared by the remote and local paths
// ============================================================================
//
// Reserved keys: page, limit, search, sortBy, sortOrder, startDate, endDate.
// `min<Field>` / `max<Field>` become numeric range filters on `<field>`.
// Every other key is an equality filter on the named field.
//
// Malformed numbers are treated as absent, never as errors.
//
// ============================================================================

pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    Equals { field: String, value: String },
    Range { field: String, min: Option<f64>, max: Option<f64> },
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        FieldFilter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        FieldFilter::Range {
            field: field.into(),
            min,
            max,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub filters: Vec<FieldFilter>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Build from raw query-string pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = ListQuery::default();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            let json = serde_json::Value::String(value.to_string());

            match key {
                "page" => query.page = coerce_i64(&json),
                "limit" => query.limit = coerce_i64(&json),
                "search" => query.search = Some(value.to_string()),
                "sortBy" => query.sort_by = Some(value.to_string()),
                "sortOrder" => query.sort_order = SortOrder::parse(value),
                "startDate" => query.start_date = Some(value.to_string()),
                "endDate" => query.end_date = Some(value.to_string()),
                _ => {
                    if let Some((is_min, field)) = range_key(key) {
                        if let Some(bound) = coerce_f64(&json) {
                            query.add_range_bound(field, is_min, bound);
                        }
                    } else {
                        query.filters.push(FieldFilter::equals(key, value));
                    }
                }
            }
        }

        query
    }

    /// Back to query-string pairs, for forwarding to the remote backend
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy".to_string(), sort_by.clone()));
            pairs.push(("sortOrder".to_string(), self.sort_order.to_string()));
        }
        if let Some(start) = &self.start_date {
            pairs.push(("startDate".to_string(), start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("endDate".to_string(), end.clone()));
        }
        for filter in &self.filters {
            match filter {
                FieldFilter::Equals { field, value } => pairs.push((field.clone(), value.clone())),
                FieldFilter::Range { field, min, max } => {
                    if let Some(min) = min {
                        pairs.push((format!("min{}", upper_first(field)), min.to_string()));
                    }
                    if let Some(max) = max {
                        pairs.push((format!("max{}", upper_first(field)), max.to_string()));
                    }
                }
            }
        }
        pairs
    }

    fn add_range_bound(&mut self, field: String, is_min: bool, bound: f64) {
        let existing = self.filters.iter_mut().find_map(|f| match f {
            FieldFilter::Range { field: name, min, max } if *name == field => Some((min, max)),
            _ => None,
        });

        match existing {
            Some((min, _)) if is_min => *min = Some(bound),
            Some((_, max)) => *max = Some(bound),
            None if is_min => self.filters.push(FieldFilter::range(field, Some(bound), None)),
            None => self.filters.push(FieldFilter::range(field, None, Some(bound))),
        }
    }
}

/// `minPrice` -> (true, "price"), `maxTotal` -> (false, "total")
fn range_key(key: &str) -> Option<(bool, String)> {
    let (is_min, rest) = if let Some(rest) = key.strip_prefix("min") {
        (true, rest)
    } else if let Some(rest) = key.strip_prefix("max") {
        (false, rest)
    } else {
        return None;
    };

    let mut chars = rest.chars();
    let first = chars.next().filter(|c| c.is_ascii_uppercase())?;
    Some((is_min, first.to_ascii_lowercase().to_string() + chars.as_str()))
}

fn upper_first(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
