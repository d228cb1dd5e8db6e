//! Per-product sales rollups.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// One purchased line of a product, joined to its variant and sub-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRecord {
    pub variant_name: String,
    pub quantity: i32,
    /// Current variant price (recomputed at read time, not the order snapshot).
    pub price: i32,
    /// The owning sub-order's `actual_date`. Undated rows only count toward totals.
    pub actual_date: Option<NaiveDate>,
}

impl SaleRecord {
    fn revenue(&self) -> i64 {
        i64::from(self.quantity) * i64::from(self.price)
    }
}

/// Revenue and units for one variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkuStats {
    pub revenue: i64,
    pub quantity: i64,
}

/// Sales rollup for a single product.
///
/// Map keys are calendar strings (`YYYY-MM-DD`, `YYYY-MM`, `YYYY`) and
/// variant names. Callers must not rely on key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatistics {
    pub total_sold: i64,
    pub total_revenue: i64,
    pub daily_stats: BTreeMap<String, i64>,
    pub monthly_stats: BTreeMap<String, i64>,
    pub yearly_stats: BTreeMap<String, i64>,
    pub sku_stats: BTreeMap<String, SkuStats>,
}

fn bump(map: &mut BTreeMap<String, i64>, key: String, amount: i64) {
    let slot = map.entry(key).or_insert(0);
    *slot = slot.saturating_add(amount);
}

/// Fold sale records into a [`ProductStatistics`].
pub fn aggregate<I>(records: I) -> ProductStatistics
where
    I: IntoIterator<Item = SaleRecord>,
{
    let mut stats = ProductStatistics::default();

    for record in records {
        let revenue = record.revenue();
        let quantity = i64::from(record.quantity);

        stats.total_sold = stats.total_sold.saturating_add(quantity);
        stats.total_revenue = stats.total_revenue.saturating_add(revenue);

        if let Some(date) = record.actual_date {
            bump(
                &mut stats.daily_stats,
                date.format("%Y-%m-%d").to_string(),
                revenue,
            );
            bump(
                &mut stats.monthly_stats,
                date.format("%Y-%m").to_string(),
                revenue,
            );
            bump(
                &mut stats.yearly_stats,
                date.format("%Y").to_string(),
                revenue,
            );
        }

        let sku = stats.sku_stats.entry(record.variant_name).or_default();
        sku.revenue = sku.revenue.saturating_add(revenue);
        sku.quantity = sku.quantity.saturating_add(quantity);
    }

    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn sale(variant: &str, quantity: i32, price: i32, date: &str) -> SaleRecord {
        SaleRecord {
            variant_name: variant.to_string(),
            quantity,
            price,
            actual_date: Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
        }
    }

    #[test]
    fn test_empty_input() {
        let stats = aggregate(Vec::new());
        assert_eq!(stats, ProductStatistics::default());
    }

    #[test]
    fn test_same_month_different_days() {
        let stats = aggregate(vec![
            sale("S", 2, 100, "2024-03-04"),
            sale("S", 1, 100, "2024-03-18"),
        ]);

        assert_eq!(stats.daily_stats.len(), 2);
        assert_eq!(stats.daily_stats["2024-03-04"], 200);
        assert_eq!(stats.daily_stats["2024-03-18"], 100);
        assert_eq!(stats.monthly_stats.len(), 1);
        assert_eq!(stats.monthly_stats["2024-03"], 300);
        assert_eq!(stats.yearly_stats["2024"], 300);
    }

    #[test]
    fn test_totals_and_sku_breakdown() {
        let stats = aggregate(vec![
            sale("S", 2, 100, "2023-12-31"),
            sale("M", 3, 150, "2024-01-01"),
            sale("S", 1, 100, "2024-01-01"),
        ]);

        assert_eq!(stats.total_sold, 6);
        assert_eq!(stats.total_revenue, 200 + 450 + 100);
        assert_eq!(
            stats.sku_stats["S"],
            SkuStats {
                revenue: 300,
                quantity: 3
            }
        );
        assert_eq!(stats.sku_stats["M"].quantity, 3);
        assert_eq!(stats.yearly_stats["2023"], 200);
        assert_eq!(stats.yearly_stats["2024"], 550);
    }

    #[test]
    fn test_undated_rows_only_count_in_totals() {
        let stats = aggregate(vec![SaleRecord {
            variant_name: "S".to_string(),
            quantity: 4,
            price: 10,
            actual_date: None,
        }]);

        assert_eq!(stats.total_revenue, 40);
        assert!(stats.daily_stats.is_empty());
        assert_eq!(stats.sku_stats["S"].revenue, 40);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(aggregate(vec![sale("S", 1, 5, "2024-05-01")])).unwrap();
        assert_eq!(json["totalSold"], 1);
        assert_eq!(json["monthlyStats"]["2024-05"], 5);
        assert_eq!(json["skuStats"]["S"]["quantity"], 1);
    }
}
