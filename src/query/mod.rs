// ============================================================================
// Query Engine
// ============================================================================
//
// - params.rs - list query contract (filters, search, sort, page, limit)
// - engine.rs - evaluation over an in-memory collection
// - page.rs   - pagination block and list response shape
//
// ============================================================================

mod engine;
mod page;
mod params;

pub use engine::{matches_filters, paginate, run_query, sort_entities};
pub use page::{Page, Pagination};
pub use params::{FieldFilter, ListQuery, SortOrder, DEFAULT_LIMIT};
