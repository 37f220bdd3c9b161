//! CSV daily-metric loader.
//!
//! Parses flat history files into `DailyMetric`s for fixtures and
//! offline runs. The warehouse query layer proper lives outside this
//! repository; this is only the flat-file adapter. Expected columns:
//!   product_id, date, revenue, ad_spend
//! with dates in ISO-8601 (`2026-01-15`).

use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use bidcap_core::DailyMetric;

/// A CSV record with product_id included.
/// Evaluation needs per-product grouping, but DailyMetric doesn't carry
/// the product.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryRecord {
    pub product_id: String,
    pub date: NaiveDate,
    pub revenue: f64,
    pub ad_spend: f64,
}

impl HistoryRecord {
    /// Convert to an engine-compatible DailyMetric (drops product_id).
    pub fn to_daily_metric(&self) -> DailyMetric {
        DailyMetric::new(self.date, self.revenue, self.ad_spend)
    }
}

/// Load history records from a CSV reader.
pub fn load_history<R: Read>(reader: R) -> Result<Vec<HistoryRecord>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: HistoryRecord =
            result.map_err(|e| format!("CSV parse error at line {}: {}", line_num + 2, e))?;
        records.push(record);
    }

    Ok(records)
}

/// Load history records from a CSV file path.
pub fn load_history_file(path: &str) -> Result<Vec<HistoryRecord>, String> {
    let file =
        std::fs::File::open(path).map_err(|e| format!("Failed to open '{}': {}", path, e))?;
    load_history(file)
}

/// Group records by product_id, each product's days sorted by date.
pub fn group_by_product(records: &[HistoryRecord]) -> Vec<(String, Vec<DailyMetric>)> {
    let mut groups: std::collections::HashMap<String, Vec<DailyMetric>> =
        std::collections::HashMap::new();
    for record in records {
        groups
            .entry(record.product_id.clone())
            .or_default()
            .push(record.to_daily_metric());
    }
    let mut result: Vec<_> = groups.into_iter().collect();
    for (_, metrics) in result.iter_mut() {
        metrics.sort_by_key(|m| m.date);
    }
    result.sort_by(|a, b| a.0.cmp(&b.0));
    result
}
