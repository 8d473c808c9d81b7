//! Sales Metrics Module
//! Sums, means and payment-mode breakdowns behind the overview cards.

use crate::config::DashboardConfig;
use crate::data::text_contains;
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Number of transactions for one exact payment-mode value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionCount {
    pub payment_mode: String,
    pub count: usize,
}

/// Every scalar shown on the overview, computed in one pass per upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub total_net_cost: f64,
    pub total_sales: f64,
    pub total_profit: f64,
    pub average_profit: f64,
    pub cash_payment: f64,
    pub card_payment: f64,
    pub refund: f64,
    pub stc_pay: f64,
    pub cash_card: f64,
    pub transaction_counts: Vec<TransactionCount>,
}

impl MetricSnapshot {
    pub fn compute(df: &DataFrame, config: &DashboardConfig) -> PolarsResult<Self> {
        let sale = config.sale_column.as_str();
        let payment = config.payment_column.as_str();
        let patterns = &config.payment_patterns;
        let payment_sum =
            |pattern: &str| MetricsCalculator::filtered_sum(df, sale, payment, pattern, true);

        let snapshot = Self {
            total_net_cost: MetricsCalculator::sum(df, &config.net_cost_column)?,
            total_sales: MetricsCalculator::sum(df, sale)?,
            total_profit: MetricsCalculator::sum(df, &config.profit_column)?,
            average_profit: MetricsCalculator::mean(df, &config.profit_column)?,
            cash_payment: payment_sum(&patterns.cash)?,
            card_payment: payment_sum(&patterns.card)?,
            refund: payment_sum(&patterns.refund)?,
            stc_pay: payment_sum(&patterns.stc_pay)?,
            cash_card: payment_sum(&patterns.cash_card)?,
            transaction_counts: MetricsCalculator::value_counts(
                df,
                payment,
                &config.transaction_count_patterns,
            )?,
        };
        debug!("Computed metric snapshot over {} rows", df.height());
        Ok(snapshot)
    }
}

/// Column aggregations. Null and NaN cells count as missing.
pub struct MetricsCalculator;

impl MetricsCalculator {
    fn numeric_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<Option<f64>>> {
        let values = df.column(column)?.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    fn text_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<Option<String>>> {
        let values = df.column(column)?.cast(&DataType::String)?;
        Ok(values
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Sum of present values; 0 when every value is missing.
    pub fn sum(df: &DataFrame, column: &str) -> PolarsResult<f64> {
        Ok(Self::numeric_values(df, column)?.into_iter().flatten().sum())
    }

    /// Mean of present values; NaN when every value is missing.
    pub fn mean(df: &DataFrame, column: &str) -> PolarsResult<f64> {
        let present: Vec<f64> = Self::numeric_values(df, column)?
            .into_iter()
            .flatten()
            .collect();
        Ok(Statistics::mean(present.iter()))
    }

    /// Sum of `column` over rows whose `predicate_column` contains `substring`.
    ///
    /// The substring is literal. An empty substring matches nothing.
    pub fn filtered_sum(
        df: &DataFrame,
        column: &str,
        predicate_column: &str,
        substring: &str,
        case_insensitive: bool,
    ) -> PolarsResult<f64> {
        if substring.is_empty() {
            return Ok(0.0);
        }
        let values = Self::numeric_values(df, column)?;
        let labels = Self::text_values(df, predicate_column)?;

        Ok(values
            .into_iter()
            .zip(labels)
            .filter(|(_, label)| {
                label
                    .as_deref()
                    .is_some_and(|l| text_contains(l, substring, case_insensitive))
            })
            .filter_map(|(value, _)| value)
            .sum())
    }

    /// Row counts per exact value of `column`, limited to values containing
    /// any of `patterns` (case-insensitive). Most frequent first; ties keep
    /// first-seen order.
    pub fn value_counts(
        df: &DataFrame,
        column: &str,
        patterns: &[String],
    ) -> PolarsResult<Vec<TransactionCount>> {
        let mut counts: Vec<TransactionCount> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();

        for label in Self::text_values(df, column)?.into_iter().flatten() {
            let matched = patterns
                .iter()
                .any(|p| !p.is_empty() && text_contains(&label, p, true));
            if !matched {
                continue;
            }
            match position.get(&label) {
                Some(&idx) => counts[idx].count += 1,
                None => {
                    position.insert(label.clone(), counts.len());
                    counts.push(TransactionCount {
                        payment_mode: label,
                        count: 1,
                    });
                }
            }
        }

        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        df!(
            "Sale" => [Some(100.0), Some(50.0), None, Some(30.0), Some(-20.0), Some(10.0)],
            "Profit" => [Some(20.0), Some(-5.0), None, Some(f64::NAN), Some(-2.0), Some(1.0)],
            "Payment Mode" => [
                Some("CASH"),
                Some("Card"),
                Some("CASH"),
                Some("stcpay"),
                Some("REFUND"),
                None
            ]
        )
        .unwrap()
    }

    #[test]
    fn sum_skips_missing_values() {
        assert_eq!(MetricsCalculator::sum(&frame(), "Sale").unwrap(), 170.0);
        assert_eq!(MetricsCalculator::sum(&frame(), "Profit").unwrap(), 14.0);
    }

    #[test]
    fn all_missing_column_sums_to_zero_and_mean_is_nan() {
        let df = df!("Empty" => [None::<f64>, None]).unwrap();
        assert_eq!(MetricsCalculator::sum(&df, "Empty").unwrap(), 0.0);
        assert!(MetricsCalculator::mean(&df, "Empty").unwrap().is_nan());
    }

    #[test]
    fn mean_ignores_missing_values() {
        let mean = MetricsCalculator::mean(&frame(), "Profit").unwrap();
        assert!((mean - 3.5).abs() < 1e-12);
    }

    #[test]
    fn filtered_sum_is_case_insensitive_substring() {
        let df = frame();
        let sum = |p: &str| {
            MetricsCalculator::filtered_sum(&df, "Sale", "Payment Mode", p, true).unwrap()
        };
        assert_eq!(sum("cash"), 100.0);
        assert_eq!(sum("CARD"), 50.0);
        assert_eq!(sum("STCPAY"), 30.0);
        assert_eq!(sum("REFUND"), -20.0);
        assert_eq!(sum(""), 0.0);
        assert_eq!(sum("CASH/+CARD"), 0.0);
    }

    #[test]
    fn filtered_sum_can_be_case_sensitive() {
        let sum =
            MetricsCalculator::filtered_sum(&frame(), "Sale", "Payment Mode", "CARD", false)
                .unwrap();
        assert_eq!(sum, 0.0);
    }

    #[test]
    fn cash_card_pattern_is_matched_literally() {
        let df = df!(
            "Sale" => [10.0, 20.0, 40.0],
            "Payment Mode" => ["CASH+CARD", "cash/+card", "CASH//CARD"]
        )
        .unwrap();
        let sum =
            MetricsCalculator::filtered_sum(&df, "Sale", "Payment Mode", "CASH/+CARD", true)
                .unwrap();
        assert_eq!(sum, 20.0);
    }

    #[test]
    fn value_counts_groups_exact_values() {
        let counts = MetricsCalculator::value_counts(
            &frame(),
            "Payment Mode",
            &["CASH".to_string(), "CARD".to_string(), "REFUND".to_string()],
        )
        .unwrap();
        assert_eq!(
            counts,
            vec![
                TransactionCount { payment_mode: "CASH".into(), count: 2 },
                TransactionCount { payment_mode: "Card".into(), count: 1 },
                TransactionCount { payment_mode: "REFUND".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        assert!(MetricsCalculator::sum(&frame(), "Tax").is_err());
    }

    #[test]
    fn snapshot_uses_configured_patterns() {
        let snapshot = MetricSnapshot::compute(
            &frame().hstack(&[Column::new("Net Cost".into(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0])])
                .unwrap(),
            &DashboardConfig::default(),
        )
        .unwrap();
        assert_eq!(snapshot.total_net_cost, 21.0);
        assert_eq!(snapshot.total_sales, 170.0);
        assert_eq!(snapshot.cash_payment, 100.0);
        assert_eq!(snapshot.card_payment, 50.0);
        assert_eq!(snapshot.stc_pay, 30.0);
        assert_eq!(snapshot.refund, -20.0);
        assert_eq!(snapshot.cash_card, 0.0);
        assert_eq!(snapshot.transaction_counts.len(), 3);
    }
}
