//! Data Processor Module
//! Numeric coercion, column projection, keyword filtering and top-N ranking.

use log::debug;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Substring test shared by the row filter and the payment-mode aggregations.
pub fn text_contains(haystack: &str, needle: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    } else {
        haystack.contains(needle)
    }
}

/// Pure transformations over a loaded dataset.
pub struct DataProcessor;

impl DataProcessor {
    /// Cast each named column to Float64. Unparseable cells become null.
    ///
    /// Casting an already numeric column is a no-op, so this is idempotent.
    pub fn coerce_numeric(
        mut df: DataFrame,
        columns: &[String],
    ) -> Result<DataFrame, ProcessorError> {
        for name in columns {
            let original = df.column(name)?;
            let before = original.null_count();
            let coerced = original.cast(&DataType::Float64)?;
            let lost = coerced.null_count().saturating_sub(before);
            if lost > 0 {
                debug!("Column '{}': {} values could not be parsed as numbers", name, lost);
            }
            df.with_column(coerced)?;
        }
        Ok(df)
    }

    /// Project onto exactly `columns`, in the given order.
    pub fn select_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame, ProcessorError> {
        Ok(df.select(columns.iter().map(|s| s.as_str()))?)
    }

    /// Keep rows where any cell, rendered as text, contains `keyword`.
    ///
    /// An empty keyword keeps every row. Null cells never match.
    pub fn keyword_filter(
        df: &DataFrame,
        keyword: &str,
        case_insensitive: bool,
    ) -> Result<DataFrame, ProcessorError> {
        if keyword.is_empty() {
            return Ok(df.clone());
        }

        let mut mask = vec![false; df.height()];
        for column in df.get_columns() {
            let as_text = column.cast(&DataType::String)?;
            for (hit, cell) in mask.iter_mut().zip(as_text.str()?.into_iter()) {
                if !*hit {
                    *hit = cell.is_some_and(|s| text_contains(s, keyword, case_insensitive));
                }
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &mask);
        Ok(df.filter(&mask)?)
    }

    /// The `n` rows with the largest values in `column`, largest first.
    ///
    /// Ties keep their original row order. Null and NaN values rank last.
    pub fn top_n(df: &DataFrame, n: usize, column: &str) -> Result<DataFrame, ProcessorError> {
        let values = df.column(column)?.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let mut order: Vec<(usize, Option<f64>)> = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i, v.filter(|x| !x.is_nan())))
            .collect();
        // Option orders None below Some, so a descending sort pushes nulls last.
        order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let indices: Vec<IdxSize> = order
            .iter()
            .take(n)
            .map(|(i, _)| *i as IdxSize)
            .collect();
        let indices = IdxCa::from_vec("index".into(), indices);
        Ok(df.take(&indices)?)
    }

    /// First `n` rows, for previews.
    pub fn head(df: &DataFrame, n: usize) -> DataFrame {
        df.head(Some(n))
    }
}
