use chrono::{DateTime, Duration, Utc};

use super::model::{AmountDelta, CountDelta, DashboardResponse, Overview, ProductTotals, RecentOrder, RecentPricing};
use super::percentage_change;
use crate::calendar::{Calendar, DateWindow};
use crate::domain::{CatalogItem, Order};

pub const RECENT_ORDER_COUNT: usize = 10;

/// Today vs yesterday, catalog totals and the latest orders
pub fn dashboard_overview(
    orders: &[Order],
    products: &[CatalogItem],
    calendar: &Calendar,
    now: DateTime<Utc>,
) -> DashboardResponse {
    let today = calendar.day_window(now);
    let yesterday = calendar.day_window(today.start - Duration::days(1));

    let (orders_today, revenue_today) = day_totals(orders, &today);
    let (orders_yesterday, revenue_yesterday) = day_totals(orders, &yesterday);

    let mut recent: Vec<&Order> = orders.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    DashboardResponse {
        overview: Overview {
            orders: CountDelta {
                current: orders_today,
                previous: orders_yesterday,
                change: percentage_change(orders_today as f64, orders_yesterday as f64),
            },
            revenue: AmountDelta {
                current: revenue_today,
                previous: revenue_yesterday,
                change: percentage_change(revenue_today, revenue_yesterday),
            },
            products: ProductTotals {
                total: products.len() as u64,
                active: products.iter().filter(|p| p.is_active()).count() as u64,
            },
        },
        recent_orders: recent
            .into_iter()
            .take(RECENT_ORDER_COUNT)
            .map(|order| RecentOrder {
                order_number: order.order_number.clone(),
                status: order.status,
                pricing: RecentPricing { total: order.revenue() },
                created_at: order.created_at,
            })
            .collect(),
    }
}

fn day_totals(orders: &[Order], window: &DateWindow) -> (u64, f64) {
    orders
        .iter()
        .filter(|order| window.contains(order.created_at))
        .fold((0, 0.0), |(count, revenue), order| (count + 1, revenue + order.revenue()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{order_at, product};
    use crate::domain::ItemStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_today_vs_yesterday() {
        let orders = vec![
            order_at("o1", now() - Duration::hours(2), 50.0),
            order_at("o2", now() - Duration::hours(1), 70.0),
            order_at("o3", now() - Duration::hours(20), 60.0),
            order_at("o4", now() - Duration::days(3), 999.0),
        ];
        let response = dashboard_overview(&orders, &[], &Calendar::utc(), now());

        assert_eq!(response.overview.orders.current, 2);
        assert_eq!(response.overview.orders.previous, 1);
        assert_eq!(response.overview.orders.change, 100.0);
        assert_eq!(response.overview.revenue.current, 120.0);
        assert_eq!(response.overview.revenue.previous, 60.0);
        assert_eq!(response.overview.revenue.change, 100.0);
    }

    #[test]
    fn test_day_boundary_follows_calendar_offset() {
        // 23:30 UTC on the 13th is already the 14th at UTC+1
        let late = Utc.with_ymd_and_hms(2024, 3, 13, 23, 30, 0).unwrap();
        let orders = vec![order_at("o1", late, 10.0)];

        let utc = dashboard_overview(&orders, &[], &Calendar::utc(), now());
        let plus_one = dashboard_overview(&orders, &[], &Calendar::with_offset_minutes(60).unwrap(), now());

        assert_eq!(utc.overview.orders.previous, 1);
        assert_eq!(plus_one.overview.orders.current, 1);
    }

    #[test]
    fn test_product_totals() {
        let mut inactive = product("p2", "Lamp", 20.0, 1);
        inactive.status = ItemStatus::Inactive;
        let products = vec![product("p1", "Mug", 5.0, 3), inactive];

        let response = dashboard_overview(&[], &products, &Calendar::utc(), now());
        assert_eq!(response.overview.products, ProductTotals { total: 2, active: 1 });
        assert_eq!(response.overview.orders.change, 0.0);
    }

    #[test]
    fn test_recent_orders_newest_first_and_capped() {
        let orders: Vec<Order> = (0..12)
            .map(|i| order_at(&format!("o{i}"), now() - Duration::minutes(i), 1.0))
            .collect();
        let response = dashboard_overview(&orders, &[], &Calendar::utc(), now());

        assert_eq!(response.recent_orders.len(), RECENT_ORDER_COUNT);
        assert_eq!(response.recent_orders[0].created_at, now());
        assert!(response
            .recent_orders
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[test]
    fn test_recent_order_shape() {
        let orders = vec![order_at("o1", now(), 42.0)];
        let value = serde_json::to_value(dashboard_overview(&orders, &[], &Calendar::utc(), now())).unwrap();
        let recent = &value["recentOrders"][0];

        assert_eq!(recent["pricing"]["total"], 42);
        assert_eq!(recent["status"], "pending");
        assert!(recent.get("orderNumber").is_some());
        assert!(recent.get("items").is_none());
    }
}
