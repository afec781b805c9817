use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::model::{AnalyticsResponse, PaymentShare, StatusCount, Summary, TopProduct, TrendPoint, Trends};
use super::sales::{bucket_orders, Tally};
use super::window::{GroupBy, SummaryQuery};
use crate::calendar::Calendar;
use crate::domain::{CatalogItem, Order};

pub const TOP_PRODUCT_COUNT: usize = 5;

// ============================================================================
// Analytics Summary
// ============================================================================
//
// Order figures cover the resolved window only. Catalog figures always cover
// the whole catalog.
//
// ============================================================================

pub fn analytics_summary(
    orders: &[Order],
    products: &[CatalogItem],
    query: &SummaryQuery,
    calendar: &Calendar,
    now: DateTime<Utc>,
) -> AnalyticsResponse {
    let window = query.window(calendar, now);
    let in_window: Vec<&Order> = orders.iter().filter(|o| window.contains(o.created_at)).collect();

    let mut totals = Tally::default();
    for order in &in_window {
        totals.add(order);
    }

    let total_stock: u64 = products.iter().map(|p| p.stock).sum();
    let avg_product_price = if products.is_empty() {
        0.0
    } else {
        products.iter().map(|p| p.price).sum::<f64>() / products.len() as f64
    };

    let revenue = bucket_orders(orders, &window, GroupBy::Day, calendar)
        .into_iter()
        .map(|(date, tally)| TrendPoint {
            date,
            revenue: tally.revenue,
            orders: tally.orders,
        })
        .collect();

    AnalyticsResponse {
        summary: Summary {
            total_orders: totals.orders,
            total_revenue: totals.revenue,
            avg_order_value: totals.average(),
            total_products: products.len() as u64,
            avg_product_price,
            total_stock,
        },
        trends: Trends { revenue },
        top_products: top_products(&in_window),
        payment_distribution: payment_distribution(&in_window),
        status_distribution: status_distribution(&in_window),
    }
}

/// Units sold per product. Lines without a product id are keyed by name.
fn top_products(orders: &[&Order]) -> Vec<TopProduct> {
    let mut sold: HashMap<&str, TopProduct> = HashMap::new();
    for line in orders.iter().flat_map(|o| o.items.iter()) {
        let key = if line.product.is_empty() { line.name.as_str() } else { line.product.as_str() };
        let entry = sold.entry(key).or_insert_with(|| TopProduct {
            id: key.to_string(),
            name: line.name.clone(),
            total_sold: 0,
            revenue: 0.0,
        });
        entry.total_sold += line.quantity;
        entry.revenue += line.subtotal;
    }

    let mut ranked: Vec<TopProduct> = sold.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_sold
            .cmp(&a.total_sold)
            .then_with(|| b.revenue.partial_cmp(&a.revenue).unwrap_or(Ordering::Equal))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.truncate(TOP_PRODUCT_COUNT);
    ranked
}

fn payment_distribution(orders: &[&Order]) -> Vec<PaymentShare> {
    let mut shares: HashMap<&str, PaymentShare> = HashMap::new();
    for order in orders {
        let share = shares.entry(order.payment.method.as_str()).or_insert_with(|| PaymentShare {
            method: order.payment.method.clone(),
            count: 0,
            total: 0.0,
        });
        share.count += 1;
        share.total += order.revenue();
    }

    let mut shares: Vec<PaymentShare> = shares.into_values().collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.method.cmp(&b.method)));
    shares
}

fn status_distribution(orders: &[&Order]) -> Vec<StatusCount> {
    let mut counts: HashMap<&'static str, u64> = HashMap::new();
    for order in orders {
        *counts.entry(order.status.as_str()).or_default() += 1;
    }

    let mut counts: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    counts
}
