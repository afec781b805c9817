use std::cmp::Ordering;

use super::page::{Page, Pagination};
use super::params::{FieldFilter, ListQuery, SortOrder, DEFAULT_LIMIT};
use crate::calendar::Calendar;
use crate::domain::{FieldValue, Queryable};

// ============================================================================
// Query Engine - in-process filter / search / sort / paginate
// ============================================================================
//
// Order of operations matches the remote API:
// 1. Equality and range filters
// 2. createdAt window (startDate / endDate)
// 3. Case-insensitive substring search, true if any search field matches
// 4. Stable sort, missing sort field falls back to createdAt,
//    ties broken by most recent first
// 5. Pagination
//
// ============================================================================

pub fn run_query<E: Queryable + Clone>(entities: &[E], query: &ListQuery, calendar: &Calendar) -> Page<E> {
    let start = query.start_date.as_deref().and_then(|raw| calendar.parse_bound(raw, false));
    let end = query.end_date.as_deref().and_then(|raw| calendar.parse_bound(raw, true));
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut matched: Vec<E> = entities
        .iter()
        .filter(|e| matches_filters(*e, &query.filters))
        .filter(|e| start.map_or(true, |s| e.created_at() >= s))
        .filter(|e| end.map_or(true, |limit| e.created_at() <= limit))
        .filter(|e| needle.as_deref().map_or(true, |n| matches_search(*e, n)))
        .cloned()
        .collect();

    let sort_by = query.sort_by.as_deref().unwrap_or("createdAt");
    sort_entities(&mut matched, sort_by, query.sort_order);

    let (items, pagination) = paginate(matched, query.page, query.limit);
    Page { items, pagination }
}

pub fn matches_filters<E: Queryable>(entity: &E, filters: &[FieldFilter]) -> bool {
    filters.iter().all(|filter| matches_filter(entity, filter))
}

fn matches_filter<E: Queryable>(entity: &E, filter: &FieldFilter) -> bool {
    match filter {
        FieldFilter::Equals { field, value } => match entity.field(field) {
            Some(FieldValue::Text(actual)) => actual == *value,
            // An unparseable number or date in the filter is ignored
            Some(FieldValue::Number(actual)) => value.trim().parse::<f64>().map_or(true, |v| v == actual),
            Some(FieldValue::Time(actual)) => chrono::DateTime::parse_from_rfc3339(value.trim())
                .map_or(true, |v| v.with_timezone(&chrono::Utc) == actual),
            None => false,
        },
        FieldFilter::Range { field, min, max } => match entity.field(field) {
            Some(FieldValue::Number(actual)) => {
                min.map_or(true, |m| actual >= m) && max.map_or(true, |m| actual <= m)
            }
            _ => false,
        },
    }
}

/// `needle` must already be lower-cased
fn matches_search<E: Queryable>(entity: &E, needle: &str) -> bool {
    entity
        .search_text()
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(needle))
}

pub fn sort_entities<E: Queryable>(entities: &mut [E], sort_by: &str, order: SortOrder) {
    entities.sort_by(|a, b| {
        let primary = compare_values(&sort_key(a, sort_by), &sort_key(b, sort_by));
        let primary = match order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

fn sort_key<E: Queryable>(entity: &E, field: &str) -> FieldValue {
    entity
        .field(field)
        .unwrap_or_else(|| FieldValue::Time(entity.created_at()))
}

/// Numbers sort before text, text before dates
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    fn rank(v: &FieldValue) -> u8 {
        match v {
            FieldValue::Number(_) => 0,
            FieldValue::Text(_) => 1,
            FieldValue::Time(_) => 2,
        }
    }

    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (FieldValue::Time(x), FieldValue::Time(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Slice one page out of the full match list.
///
/// `limit <= 0` returns everything as a single page.
pub fn paginate<T>(items: Vec<T>, page: Option<i64>, limit: Option<i64>) -> (Vec<T>, Pagination) {
    let total = items.len() as u64;
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    if limit <= 0 {
        let pagination = Pagination {
            current: 1,
            pages: 1,
            total,
            limit,
        };
        return (items, pagination);
    }

    let per_page = limit as u64;
    let pages = total.div_ceil(per_page);
    let current = page.unwrap_or(1).max(1) as u64;
    let start = (current - 1).saturating_mul(per_page);

    let slice = items
        .into_iter()
        .skip(usize::try_from(start).unwrap_or(usize::MAX))
        .take(usize::try_from(per_page).unwrap_or(usize::MAX))
        .collect();

    let pagination = Pagination {
        current,
        pages,
        total,
        limit,
    };
    (slice, pagination)
}
