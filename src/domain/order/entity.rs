use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patch::{FulfillmentPatch, LineItemPatch, OrderPatch, PricingPatch};
use super::value_objects::*;
use crate::calendar::Calendar;
use crate::domain::errors::{non_negative, non_negative_count, ValidationError};
use crate::domain::{touch, Entity, EntityKind, FieldValue, Queryable};

// ============================================================================
// Order
// ============================================================================
//
// Invariants kept by `apply_patch`:
// - every line subtotal equals price * quantity
// - pricing.subtotal equals the sum of line subtotals when lines exist
// - pricing.total is the caller's figure when given, otherwise derived
// - a status change always leaves a timeline entry
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub order_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub pricing: Pricing,
    #[serde(default)]
    pub payment: Payment,
    #[serde(default)]
    pub fulfillment: Fulfillment,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Revenue figure used by every aggregation
    pub fn revenue(&self) -> f64 {
        self.pricing.total
    }

    fn apply_patch(&mut self, patch: OrderPatch, now: DateTime<Utc>, creating: bool) -> Result<(), ValidationError> {
        // Validate first so a rejected patch leaves the order untouched
        let items = patch.items.map(build_line_items).transpose()?;
        if let Some(pricing) = &patch.pricing {
            validate_pricing(pricing)?;
        }

        if let Some(order_number) = patch.order_number {
            self.order_number = order_number;
        }
        if patch.buyer.is_some() {
            self.buyer = patch.buyer;
        }
        if patch.seller.is_some() {
            self.seller = patch.seller;
        }

        let mut pricing_touched = creating;
        if let Some(items) = items {
            self.items = items;
            pricing_touched = true;
        }

        let mut explicit_total = None;
        let mut explicit_subtotal = None;
        if let Some(pricing) = patch.pricing {
            pricing_touched = true;
            if let Some(tax) = pricing.tax {
                self.pricing.tax = tax;
            }
            if let Some(fee) = pricing.shipping_fee {
                self.pricing.shipping_fee = fee;
            }
            if let Some(discount) = pricing.discount {
                self.pricing.discount = discount;
            }
            explicit_total = pricing.total;
            explicit_subtotal = pricing.subtotal;
        }

        if !self.items.is_empty() {
            self.pricing.subtotal = self.items.iter().map(|item| item.subtotal).sum();
        } else if let Some(subtotal) = explicit_subtotal {
            self.pricing.subtotal = subtotal;
        }

        match explicit_total {
            Some(total) => self.pricing.total = total,
            None if pricing_touched => self.pricing.total = self.pricing.computed_total(),
            None => {}
        }

        if let Some(payment) = patch.payment {
            if let Some(method) = payment.method {
                self.payment.method = method;
            }
            if let Some(status) = payment.status {
                self.payment.status = status;
            }
        }

        if let Some(fulfillment) = patch.fulfillment {
            self.merge_fulfillment(fulfillment, now);
        }

        match patch.status {
            Some(status) if status != self.status => {
                self.status = status;
                self.timeline.push(TimelineEvent {
                    status: status.as_str().to_string(),
                    note: patch.note,
                    timestamp: now,
                });
            }
            _ => {
                if let Some(note) = patch.note {
                    self.timeline.push(TimelineEvent {
                        status: self.status.as_str().to_string(),
                        note: Some(note),
                        timestamp: now,
                    });
                }
            }
        }

        self.updated_at = touch(self.updated_at, now);
        Ok(())
    }

    fn merge_fulfillment(&mut self, patch: FulfillmentPatch, now: DateTime<Utc>) {
        if patch.tracking_number.is_some() {
            self.fulfillment.tracking_number = patch.tracking_number;
        }
        if patch.carrier.is_some() {
            self.fulfillment.carrier = patch.carrier;
        }
        if patch.shipped_at.is_some() {
            self.fulfillment.shipped_at = patch.shipped_at;
        }
        if patch.delivered_at.is_some() {
            self.fulfillment.delivered_at = patch.delivered_at;
        }
        if let Some(status) = patch.status {
            self.fulfillment.status = status;
            match status {
                FulfillmentStatus::Shipped if self.fulfillment.shipped_at.is_none() => {
                    self.fulfillment.shipped_at = Some(now);
                }
                FulfillmentStatus::Delivered if self.fulfillment.delivered_at.is_none() => {
                    self.fulfillment.delivered_at = Some(now);
                }
                _ => {}
            }
        }
    }
}

fn build_line_items(lines: Vec<LineItemPatch>) -> Result<Vec<LineItem>, ValidationError> {
    lines
        .into_iter()
        .map(|line| {
            let price = non_negative("items.price", line.price.unwrap_or(0.0))?;
            let quantity = non_negative_count("items.quantity", line.quantity.unwrap_or(1))?;
            Ok(LineItem::new(
                line.product.unwrap_or_default(),
                line.name.unwrap_or_default(),
                price,
                quantity,
            ))
        })
        .collect()
}

fn validate_pricing(pricing: &PricingPatch) -> Result<(), ValidationError> {
    let fields = [
        ("pricing.subtotal", pricing.subtotal),
        ("pricing.tax", pricing.tax),
        ("pricing.shippingFee", pricing.shipping_fee),
        ("pricing.discount", pricing.discount),
        ("pricing.total", pricing.total),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            non_negative(field, value)?;
        }
    }
    Ok(())
}

/// `ORD-YYYYMMDD-NNNN`, the lowest free sequence number for that calendar day
fn next_order_number(created_at: DateTime<Utc>, others: &[Order], calendar: &Calendar) -> String {
    let prefix = format!("ORD-{}-", calendar.local_date(created_at).format("%Y%m%d"));
    let taken = others.iter().filter(|o| o.order_number.starts_with(&prefix)).count();
    let mut seq = taken + 1;
    loop {
        let candidate = format!("{}{:04}", prefix, seq);
        if !others.iter().any(|o| o.order_number == candidate) {
            return candidate;
        }
        seq += 1;
    }
}

impl Entity for Order {
    type Patch = OrderPatch;

    const KIND: EntityKind = EntityKind::Order;

    fn id(&self) -> &str {
        &self.id
    }

    fn patch_id(patch: &OrderPatch) -> Option<&str> {
        patch.id.as_deref()
    }

    fn from_patch(id: String, mut patch: OrderPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }

        let created_at = patch.created_at.unwrap_or(now);
        let status = patch.status.take().unwrap_or_default();
        let mut order = Order {
            id,
            order_number: String::new(),
            buyer: None,
            seller: None,
            items: Vec::new(),
            pricing: Pricing::default(),
            payment: Payment::default(),
            fulfillment: Fulfillment::default(),
            timeline: vec![TimelineEvent {
                status: status.as_str().to_string(),
                note: Some(patch.note.take().unwrap_or_else(|| "Order created".to_string())),
                timestamp: created_at,
            }],
            status,
            created_at,
            updated_at: created_at,
        };
        order.apply_patch(patch, now, true)?;
        Ok(order)
    }

    fn merge(&mut self, patch: OrderPatch, now: DateTime<Utc>) -> Result<(), ValidationError> {
        self.apply_patch(patch, now, false)
    }

    fn check_unique(&mut self, others: &[Self], calendar: &Calendar) -> Result<(), ValidationError> {
        if self.order_number.trim().is_empty() {
            self.order_number = next_order_number(self.created_at, others, calendar);
            return Ok(());
        }
        if others.iter().any(|o| o.order_number == self.order_number) {
            return Err(ValidationError::DuplicateOrderNumber(self.order_number.clone()));
        }
        Ok(())
    }
}

impl Queryable for Order {
    fn field(&self, path: &str) -> Option<FieldValue> {
        match path {
            "_id" | "id" => Some(FieldValue::text(&self.id)),
            "orderNumber" => Some(FieldValue::text(&self.order_number)),
            "buyer" => self.buyer.as_deref().map(FieldValue::text),
            "seller" => self.seller.as_deref().map(FieldValue::text),
            "status" => Some(FieldValue::text(self.status.as_str())),
            "payment.method" | "paymentMethod" => Some(FieldValue::text(&self.payment.method)),
            "payment.status" | "paymentStatus" => Some(FieldValue::text(self.payment.status.as_str())),
            "fulfillment.status" => Some(FieldValue::text(self.fulfillment.status.as_str())),
            "pricing.total" | "total" => Some(FieldValue::Number(self.pricing.total)),
            "pricing.subtotal" | "subtotal" => Some(FieldValue::Number(self.pricing.subtotal)),
            "createdAt" => Some(FieldValue::Time(self.created_at)),
            "updatedAt" => Some(FieldValue::Time(self.updated_at)),
            _ => None,
        }
    }

    fn search_text(&self) -> Vec<&str> {
        let mut fields = vec![
            self.order_number.as_str(),
            self.status.as_str(),
            self.payment.method.as_str(),
            self.payment.status.as_str(),
        ];
        fields.extend(self.items.iter().map(|item| item.name.as_str()));
        fields
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
