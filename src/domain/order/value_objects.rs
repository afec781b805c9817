use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::lenient::js_number;

// ============================================================================
// Order Value Objects
// ============================================================================

/// One line of an order. `subtotal` is always `price * quantity`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineItem {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub name: String,
    #[serde(serialize_with = "js_number")]
    pub price: f64,
    pub quantity: u64,
    #[serde(serialize_with = "js_number")]
    pub subtotal: f64,
}

impl LineItem {
    pub fn new(product: impl Into<String>, name: impl Into<String>, price: f64, quantity: u64) -> Self {
        Self {
            product: product.into(),
            name: name.into(),
            price,
            quantity,
            subtotal: price * quantity as f64,
        }
    }
}

/// Pricing block. `total` is the only figure revenue aggregation reads.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(serialize_with = "js_number")]
    pub subtotal: f64,
    #[serde(default, serialize_with = "js_number")]
    pub tax: f64,
    #[serde(default, serialize_with = "js_number")]
    pub shipping_fee: f64,
    #[serde(default, serialize_with = "js_number")]
    pub discount: f64,
    #[serde(serialize_with = "js_number")]
    pub total: f64,
}

impl Pricing {
    /// Total implied by the components, floored at zero
    pub fn computed_total(&self) -> f64 {
        (self.subtotal + self.tax + self.shipping_fee - self.discount).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Payment {
    pub method: String,
    #[serde(default)]
    pub status: PaymentStatus,
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            method: DEFAULT_PAYMENT_METHOD.to_string(),
            status: PaymentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    #[default]
    Unfulfilled,
    Processing,
    Shipped,
    Delivered,
    Returned,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Unfulfilled => "unfulfilled",
            FulfillmentStatus::Processing => "processing",
            FulfillmentStatus::Shipped => "shipped",
            FulfillmentStatus::Delivered => "delivered",
            FulfillmentStatus::Returned => "returned",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    #[serde(default)]
    pub status: FulfillmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Entry in the order's event timeline
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimelineEvent {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_subtotal() {
        let item = LineItem::new("p1", "Rice", 2.5, 4);
        assert_eq!(item.subtotal, 10.0);
    }

    #[test]
    fn test_computed_total_is_floored_at_zero() {
        let pricing = Pricing {
            subtotal: 10.0,
            tax: 1.0,
            shipping_fee: 2.0,
            discount: 20.0,
            total: 0.0,
        };
        assert_eq!(pricing.computed_total(), 0.0);

        let pricing = Pricing {
            discount: 3.0,
            ..pricing
        };
        assert_eq!(pricing.computed_total(), 10.0);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Refunded).unwrap(), "\"refunded\"");
        let status: FulfillmentStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, FulfillmentStatus::Shipped);
    }

    #[test]
    fn test_pricing_uses_camel_case() {
        let json = serde_json::to_value(Pricing {
            subtotal: 5.0,
            tax: 0.5,
            shipping_fee: 1.0,
            discount: 0.0,
            total: 6.5,
        })
        .unwrap();

        assert_eq!(json["shippingFee"], 1);
        assert_eq!(json["total"], 6.5);
    }
}
