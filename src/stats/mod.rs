//! Stats module - sales metrics and summary statistics

mod calculator;
mod metrics;

pub use calculator::{ColumnSummary, StatsCalculator};
pub use metrics::{MetricSnapshot, MetricsCalculator, TransactionCount};
