use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::model::{SalesBucket, SalesReport};
use super::window::{GroupBy, SalesQuery};
use crate::calendar::{Calendar, DateWindow};
use crate::domain::Order;

/// Running totals for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Tally {
    pub revenue: f64,
    pub orders: u64,
}

impl Tally {
    pub fn add(&mut self, order: &Order) {
        self.revenue += order.revenue();
        self.orders += 1;
    }

    pub fn average(&self) -> f64 {
        if self.orders == 0 {
            0.0
        } else {
            self.revenue / self.orders as f64
        }
    }
}

/// Orders inside `window`, tallied by bucket key. Sparse, ascending by key.
pub(crate) fn bucket_orders(
    orders: &[Order],
    window: &DateWindow,
    group_by: GroupBy,
    calendar: &Calendar,
) -> BTreeMap<String, Tally> {
    let mut buckets: BTreeMap<String, Tally> = BTreeMap::new();
    for order in orders.iter().filter(|o| window.contains(o.created_at)) {
        buckets
            .entry(group_by.bucket_key(calendar, order.created_at))
            .or_default()
            .add(order);
    }
    buckets
}

pub fn sales_report(orders: &[Order], query: &SalesQuery, calendar: &Calendar, now: DateTime<Utc>) -> SalesReport {
    let window = query.window(calendar, now);
    let sales_data = bucket_orders(orders, &window, query.group_by, calendar)
        .into_iter()
        .map(|(period, tally)| SalesBucket {
            period,
            revenue: tally.revenue,
            orders: tally.orders,
            avg_order_value: tally.average(),
        })
        .collect();

    SalesReport { sales_data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::order_at;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn january() -> SalesQuery {
        SalesQuery::from_pairs([("startDate", "2024-01-01"), ("endDate", "2024-01-31")])
    }

    #[test]
    fn test_day_grouping() {
        let orders = vec![
            order_at("o1", at(1, 10), 100.0),
            order_at("o2", at(1, 15), 50.0),
            order_at("o3", at(2, 9), 200.0),
        ];
        let report = sales_report(&orders, &january(), &Calendar::utc(), at(31, 0));

        assert_eq!(
            report.sales_data,
            vec![
                SalesBucket {
                    period: "2024-01-01".into(),
                    revenue: 150.0,
                    orders: 2,
                    avg_order_value: 75.0,
                },
                SalesBucket {
                    period: "2024-01-02".into(),
                    revenue: 200.0,
                    orders: 1,
                    avg_order_value: 200.0,
                },
            ]
        );
    }

    #[test]
    fn test_week_and_month_keys() {
        // 2024-01-03 is a Wednesday, 2024-01-08 the next Monday
        let orders = vec![
            order_at("o1", at(3, 12), 10.0),
            order_at("o2", at(8, 12), 20.0),
            order_at("o3", at(9, 12), 30.0),
        ];

        let mut weekly = january();
        weekly.group_by = GroupBy::Week;
        let periods: Vec<String> = sales_report(&orders, &weekly, &Calendar::utc(), at(31, 0))
            .sales_data
            .into_iter()
            .map(|b| b.period)
            .collect();
        assert_eq!(periods, vec!["2024-01-01", "2024-01-08"]);

        let mut monthly = january();
        monthly.group_by = GroupBy::Month;
        let report = sales_report(&orders, &monthly, &Calendar::utc(), at(31, 0));
        assert_eq!(report.sales_data.len(), 1);
        assert_eq!(report.sales_data[0].period, "2024-01");
        assert_eq!(report.sales_data[0].orders, 3);
    }

    #[test]
    fn test_bucket_revenue_sums_to_window_revenue() {
        let orders: Vec<Order> = (0..40)
            .map(|i| order_at(&format!("o{i}"), at(1, 0) + chrono::Duration::hours(i * 19), 3.25 * i as f64))
            .collect();
        let query = january();
        let window = query.window(&Calendar::utc(), at(31, 0));

        let expected: f64 = orders
            .iter()
            .filter(|o| window.contains(o.created_at))
            .map(|o| o.revenue())
            .sum();

        for group_by in [GroupBy::Day, GroupBy::Week, GroupBy::Month] {
            let mut grouped = query.clone();
            grouped.group_by = group_by;
            let report = sales_report(&orders, &grouped, &Calendar::utc(), at(31, 0));
            let total: f64 = report.sales_data.iter().map(|b| b.revenue).sum();
            assert!((total - expected).abs() < 1e-9, "{group_by}: {total} != {expected}");
        }
    }

    #[test]
    fn test_default_window_is_last_seven_days() {
        let now = at(20, 12);
        let orders = vec![order_at("old", at(10, 12), 5.0), order_at("new", at(19, 12), 7.0)];
        let report = sales_report(&orders, &SalesQuery::default(), &Calendar::utc(), now);

        assert_eq!(report.sales_data.len(), 1);
        assert_eq!(report.sales_data[0].period, "2024-01-19");
    }

    #[test]
    fn test_empty_input() {
        let report = sales_report(&[], &january(), &Calendar::utc(), at(31, 0));
        assert!(report.sales_data.is_empty());
        assert_eq!(Tally::default().average(), 0.0);
    }
}
