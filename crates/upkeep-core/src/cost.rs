use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::types::{CostCategory, MaintenanceRecord, Receipt, WorkOrder};

pub const TREND_MONTHS: usize = 12;

#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    pub labor: f64,
    pub parts: f64,
    pub external: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendBucket {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostSummary {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total: f64,
    pub estimated_total: f64,
    pub by_category: CostBreakdown,
    pub order_count: usize,
    pub record_count: usize,
    pub receipt_count: usize,
    /// Trailing months ending at the window end, oldest first.
    pub trend: Vec<TrendBucket>,
}

fn month_label(date: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

fn months_back(date: DateTime<Utc>, back: usize) -> String {
    let total = date.year() * 12 + date.month() as i32 - 1 - back as i32;
    format!("{:04}-{:02}", total.div_euclid(12), total.rem_euclid(12) + 1)
}

fn in_window(date: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    date >= start && date <= end
}

/// When an order costs against the timeline: completion if it has one,
/// otherwise the request date.
fn order_date(order: &WorkOrder) -> DateTime<Utc> {
    order.completed_at.unwrap_or(order.requested_at)
}

/// Roll up costs for one equipment unit over a reporting window. Purely
/// read-and-fold; absent cost fields count as zero. Record labor/parts
/// costs and receipt categories feed the breakdown; work-order actuals
/// count as external spend.
pub fn cost_summary(
    orders: &[WorkOrder],
    records: &[MaintenanceRecord],
    receipts: &[Receipt],
    equipment_id: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> CostSummary {
    let mut total = 0.0;
    let mut estimated_total = 0.0;
    let mut by_category = CostBreakdown {
        labor: 0.0,
        parts: 0.0,
        external: 0.0,
    };
    let mut order_count = 0;
    let mut record_count = 0;
    let mut receipt_count = 0;

    // Bucket index: trailing TREND_MONTHS months ending at the window end.
    let mut trend: Vec<TrendBucket> = (0..TREND_MONTHS)
        .rev()
        .map(|back| TrendBucket {
            month: months_back(window_end, back),
            total: 0.0,
        })
        .collect();
    let mut add_to_trend = |date: DateTime<Utc>, amount: f64| {
        let label = month_label(date);
        if let Some(bucket) = trend.iter_mut().find(|b| b.month == label) {
            bucket.total += amount;
        }
    };

    for order in orders.iter().filter(|o| o.equipment_id == equipment_id) {
        let date = order_date(order);
        if !in_window(date, window_start, window_end) {
            continue;
        }
        order_count += 1;
        estimated_total += order.estimated_cost.unwrap_or(0.0);
        let actual = order.actual_cost.unwrap_or(0.0);
        total += actual;
        by_category.external += actual;
        add_to_trend(date, actual);
    }

    for record in records.iter().filter(|r| r.equipment_id == equipment_id) {
        if !in_window(record.performed_at, window_start, window_end) {
            continue;
        }
        record_count += 1;
        let labor = record.labor_cost.unwrap_or(0.0);
        let parts = record.parts_cost.unwrap_or(0.0);
        total += labor + parts;
        by_category.labor += labor;
        by_category.parts += parts;
        add_to_trend(record.performed_at, labor + parts);
    }

    for receipt in receipts.iter().filter(|r| r.equipment_id == equipment_id) {
        if !in_window(receipt.date, window_start, window_end) {
            continue;
        }
        receipt_count += 1;
        total += receipt.amount;
        match receipt.category {
            CostCategory::Labor => by_category.labor += receipt.amount,
            CostCategory::Parts => by_category.parts += receipt.amount,
            CostCategory::External => by_category.external += receipt.amount,
        }
        add_to_trend(receipt.date, receipt.amount);
    }

    CostSummary {
        window_start,
        window_end,
        total,
        estimated_total,
        by_category,
        order_count,
        record_count,
        receipt_count,
        trend,
    }
}
