//! Daily product metrics.
//!
//! One `DailyMetric` per product per day, owned by the warehouse layer
//! upstream of this crate. The engine only ever reads slices of them;
//! callers are responsible for supplying a consistent snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of revenue and advertising spend for a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub revenue: f64,
    pub ad_spend: f64,
}

impl DailyMetric {
    pub fn new(date: NaiveDate, revenue: f64, ad_spend: f64) -> Self {
        Self {
            date,
            revenue,
            ad_spend,
        }
    }

    /// Ad spend divided by revenue. `None` when the day had no revenue.
    pub fn spend_ratio(&self) -> Option<f64> {
        if self.revenue > 0.0 {
            Some(self.ad_spend / self.revenue)
        } else {
            None
        }
    }
}

/// Revenue and spend totals over a window of daily metrics.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct WindowTotals {
    pub revenue: f64,
    pub ad_spend: f64,
    pub days: usize,
}

impl WindowTotals {
    pub fn from_metrics(metrics: &[DailyMetric]) -> Self {
        let mut totals = WindowTotals::default();
        for day in metrics {
            totals.revenue += day.revenue;
            totals.ad_spend += day.ad_spend;
            totals.days += 1;
        }
        totals
    }

    /// Aggregate spend/revenue ratio over the window. `None` when the
    /// window had no revenue.
    pub fn spend_ratio(&self) -> Option<f64> {
        if self.revenue > 0.0 {
            Some(self.ad_spend / self.revenue)
        } else {
            None
        }
    }
}
