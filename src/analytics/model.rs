use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::lenient::js_number;
use crate::domain::OrderStatus;

// ============================================================================
// Analytics Response Shapes
// ============================================================================
//
// Field names follow the remote aggregation API exactly; a body produced here
// must be indistinguishable from one the remote backend returns.
//
// ============================================================================

// --- GET /analytics/dashboard ------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub overview: Overview,
    pub recent_orders: Vec<RecentOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub orders: CountDelta,
    pub revenue: AmountDelta,
    pub products: ProductTotals,
}

/// Today vs yesterday for a count. `change` is an unrounded percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountDelta {
    pub current: u64,
    pub previous: u64,
    #[serde(serialize_with = "js_number")]
    pub change: f64,
}

/// Today vs yesterday for a money amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountDelta {
    #[serde(serialize_with = "js_number")]
    pub current: f64,
    #[serde(serialize_with = "js_number")]
    pub previous: f64,
    #[serde(serialize_with = "js_number")]
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTotals {
    pub total: u64,
    pub active: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub order_number: String,
    pub status: OrderStatus,
    pub pricing: RecentPricing,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPricing {
    #[serde(serialize_with = "js_number")]
    pub total: f64,
}

// --- GET /analytics/sales ----------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub sales_data: Vec<SalesBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBucket {
    pub period: String,
    #[serde(serialize_with = "js_number")]
    pub revenue: f64,
    pub orders: u64,
    #[serde(serialize_with = "js_number")]
    pub avg_order_value: f64,
}

// --- GET /analytics ----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub summary: Summary,
    pub trends: Trends,
    pub top_products: Vec<TopProduct>,
    pub payment_distribution: Vec<PaymentShare>,
    pub status_distribution: Vec<StatusCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_orders: u64,
    #[serde(serialize_with = "js_number")]
    pub total_revenue: f64,
    #[serde(serialize_with = "js_number")]
    pub avg_order_value: f64,
    pub total_products: u64,
    #[serde(serialize_with = "js_number")]
    pub avg_product_price: f64,
    pub total_stock: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trends {
    pub revenue: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(serialize_with = "js_number")]
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub total_sold: u64,
    #[serde(serialize_with = "js_number")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentShare {
    #[serde(rename = "_id")]
    pub method: String,
    pub count: u64,
    #[serde(serialize_with = "js_number")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(rename = "_id")]
    pub status: String,
    pub count: u64,
}
