//! Account performance summary

use crate::client::gaql::{performance_query, DateRange};
use crate::client::{execute, ClientHandle};
use crate::core::error::QueryError;
use crate::core::traits::Row;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAYS_BACK: u32 = 7;

/// Micros per major currency unit
const MICROS_PER_UNIT: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub date_range: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    /// Major currency unit, two decimals
    pub cost: f64,
    pub conversions: i64,
    /// Percent, two decimals
    pub ctr: f64,
    pub cpc: f64,
}

/// Running totals over a row sequence
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsAccumulator {
    impressions: i64,
    clicks: i64,
    cost_micros: i64,
    conversions: f64,
}

impl MetricsAccumulator {
    /// Proto3 JSON omits zero-valued fields, so absent metrics count as 0
    pub fn add(&mut self, row: &Row) {
        self.impressions += row.get_i64("metrics.impressions").unwrap_or(0);
        self.clicks += row.get_i64("metrics.clicks").unwrap_or(0);
        self.cost_micros += row.get_i64("metrics.cost_micros").unwrap_or(0);
        self.conversions += row.get_f64("metrics.conversions").unwrap_or(0.0);
    }

    pub fn finish(self, range: &DateRange) -> MetricsSummary {
        let cost = self.cost_micros as f64 / MICROS_PER_UNIT;

        let ctr = if self.impressions > 0 {
            self.clicks as f64 / self.impressions as f64 * 100.0
        } else {
            0.0
        };
        let cpc = if self.clicks > 0 {
            cost / self.clicks as f64
        } else {
            0.0
        };

        MetricsSummary {
            date_range: range.to_string(),
            start_date: range.start(),
            end_date: range.end(),
            impressions: self.impressions,
            clicks: self.clicks,
            cost: round2(cost),
            conversions: self.conversions.round() as i64,
            ctr: round2(ctr),
            cpc: round2(cpc),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarize account metrics over an explicit date range
pub async fn try_summarize_range(
    client: &ClientHandle,
    account_id: &str,
    range: &DateRange,
) -> Result<MetricsSummary, QueryError> {
    let mut rows = execute(client, account_id, &performance_query(range)).await?;

    let mut totals = MetricsAccumulator::default();
    while let Some(row) = rows.try_next().await? {
        totals.add(&row);
    }
    Ok(totals.finish(range))
}

/// Summarize account metrics over the last `days_back` days
pub async fn try_summarize_performance(
    client: &ClientHandle,
    account_id: &str,
    days_back: u32,
) -> Result<MetricsSummary, QueryError> {
    let range = DateRange::ending_today(days_back).map_err(QueryError::InvalidQuery)?;
    try_summarize_range(client, account_id, &range).await
}

/// Like [`try_summarize_performance`], but a failure is logged and yields `None`
pub async fn summarize_performance(
    client: &ClientHandle,
    account_id: &str,
    days_back: u32,
) -> Option<MetricsSummary> {
    match try_summarize_performance(client, account_id, days_back).await {
        Ok(summary) => Some(summary),
        Err(err) => {
            tracing::warn!(account_id, days_back, error = %err, "failed to fetch performance data");
            None
        }
    }
}
