use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::value_objects::{FulfillmentStatus, OrderStatus, PaymentStatus};
use crate::domain::lenient;

// ============================================================================
// Order Patches - partial input for create/update
// ============================================================================
//
// Every field is optional. Caller-supplied line subtotals are not part of the
// shape at all: they are recomputed from price and quantity on every merge.
//
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItemPatch>>,
    #[serde(default)]
    pub pricing: Option<PricingPatch>,
    #[serde(default)]
    pub payment: Option<PaymentPatch>,
    #[serde(default)]
    pub fulfillment: Option<FulfillmentPatch>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Free-text note recorded on the timeline alongside a status change
    #[serde(default)]
    pub note: Option<String>,
    /// Only honoured when the order is first created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItemPatch {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPatch {
    /// Honoured only for orders without line items
    #[serde(default, deserialize_with = "lenient::number")]
    pub subtotal: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub tax: Option<f64>,
    #[serde(default, alias = "fees", deserialize_with = "lenient::number")]
    pub shipping_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentPatch {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentPatch {
    #[serde(default)]
    pub status: Option<FulfillmentStatus>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}
