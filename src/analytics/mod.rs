// ============================================================================
// Aggregator - time-windowed analytics over orders and catalog items
// ============================================================================
//
// - window.rs    - groupBy / period parsing and window resolution
// - dashboard.rs - today vs yesterday overview
// - sales.rs     - bucketed sales report
// - summary.rs   - period summary, trends and distributions
// - model.rs     - response shapes
//
// All functions are pure: orders, catalog, calendar and "now" come in,
// a response value comes out.
//
// ============================================================================

mod dashboard;
mod model;
mod sales;
mod summary;
mod window;

pub use dashboard::{dashboard_overview, RECENT_ORDER_COUNT};
pub use model::*;
pub use sales::sales_report;
pub use summary::{analytics_summary, TOP_PRODUCT_COUNT};
pub use window::{GroupBy, Period, SalesQuery, SummaryQuery, DEFAULT_SALES_SPAN_DAYS};

/// Percentage change from `previous` to `current`, unrounded.
///
/// A zero baseline reports 100 when anything happened and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}
