//! # Dashboard Metrics
//!
//! Month-to-date figures shown on the home screen.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┐
//! │ Profit (month)       │ Sales (month)        │
//! │ Σ sale.profit        │ Σ sale.total_amount  │
//! ├──────────────────────┼──────────────────────┤
//! │ Active customers     │ Low stock            │
//! │ distinct customer_id │ StockStatus::Low     │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! "This month" compares the sale's business date, not its creation time.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::inventory::StockStatus;
use crate::money::Money;
use crate::policy::PricingPolicy;
use crate::types::{Product, Sale};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub month_profit: Money,
    pub month_sales: Money,
    pub month_sale_count: usize,
    pub active_customers: usize,
    pub low_stock_count: usize,
}

impl DashboardMetrics {
    pub fn compute(
        sales: &[Sale],
        products: &[Product],
        policy: &PricingPolicy,
        today: NaiveDate,
    ) -> DashboardMetrics {
        let month: Vec<&Sale> = sales
            .iter()
            .filter(|s| s.date.year() == today.year() && s.date.month() == today.month())
            .collect();

        let customers: HashSet<&str> = month.iter().map(|s| s.customer_id.as_str()).collect();

        DashboardMetrics {
            month_profit: month.iter().map(|s| s.profit).sum(),
            month_sales: month.iter().map(|s| s.total_amount).sum(),
            month_sale_count: month.len(),
            active_customers: customers.len(),
            low_stock_count: products
                .iter()
                .filter(|p| StockStatus::for_product(p, policy) == StockStatus::Low)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::test_product;
    use crate::types::Channel;
    use chrono::Utc;

    fn sale(customer: &str, date: NaiveDate, total: i64, profit: i64) -> Sale {
        Sale {
            id: format!("sale-{}-{}", customer, date),
            owner_id: "owner-1".to_string(),
            customer_id: customer.to_string(),
            customer_name: customer.to_string(),
            date,
            channel: Channel::Physical,
            total_amount: Money::from_cents(total),
            discount: Money::zero(),
            profit: Money::from_cents(profit),
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_month_figures() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let sales = vec![
            sale("c1", NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(), 10000, 1500),
            sale("c1", NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 5000, -200),
            sale("c2", NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 2070, 70),
            // previous month and previous year are ignored
            sale("c3", NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(), 9999, 999),
            sale("c4", NaiveDate::from_ymd_opt(2025, 10, 19).unwrap(), 9999, 999),
        ];
        let products = vec![
            test_product("1", 1000, 0),
            test_product("2", 1000, 2),
            test_product("3", 1000, 3),
        ];

        let metrics = DashboardMetrics::compute(&sales, &products, &PricingPolicy::default(), today);

        assert_eq!(metrics.month_sales, Money::from_cents(17070));
        assert_eq!(metrics.month_profit, Money::from_cents(1370));
        assert_eq!(metrics.month_sale_count, 3);
        assert_eq!(metrics.active_customers, 2);
        assert_eq!(metrics.low_stock_count, 1);
    }
}
