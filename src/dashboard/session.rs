//! Dashboard Session
//! One uploaded dataset, validated and coerced, plus everything derived from it.

use crate::charts::{BarChartData, ChartError};
use crate::config::{DashboardConfig, TOP_N_RANGE};
use crate::data::{CsvExporter, DataLoader, DataProcessor, ExportError, LoaderError, ProcessorError};
use crate::stats::{ColumnSummary, MetricSnapshot, StatsCalculator};
use log::info;
use polars::prelude::*;
use std::cell::OnceCell;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(
        "The uploaded CSV must include the following columns: {}. Missing: {}.",
        .required.join(", "),
        .missing.join(", ")
    )]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(
        "Number of transactions must be between {lo} and {hi}, got {0}",
        lo = TOP_N_RANGE.0,
        hi = TOP_N_RANGE.1
    )]
    TopNOutOfRange(usize),
}

/// Column subset and keyword for the data preview.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    /// `None` keeps every column.
    pub columns: Option<Vec<String>>,
    pub keyword: String,
}

/// Top transactions by sale and by profit, with their charts.
#[derive(Debug, Clone)]
pub struct TopTransactions {
    pub count: usize,
    pub by_sale: DataFrame,
    pub by_profit: DataFrame,
    pub sale_chart: BarChartData,
    pub profit_chart: BarChartData,
}

/// Filtered rows plus what the preview shows about them.
#[derive(Debug, Clone)]
pub struct DataPreview {
    pub filtered: DataFrame,
    pub head: DataFrame,
    pub summary: Vec<ColumnSummary>,
}

impl DataPreview {
    pub fn row_count(&self) -> usize {
        self.filtered.height()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, DashboardError> {
        Ok(CsvExporter::to_csv_bytes(&self.filtered)?)
    }
}

/// A validated, coerced upload. Replaced wholesale by the next upload.
pub struct Session {
    config: DashboardConfig,
    dataset: DataFrame,
    snapshot: MetricSnapshot,
    processed_csv: OnceCell<Vec<u8>>,
}

impl Session {
    pub fn from_path(path: &Path, config: DashboardConfig) -> Result<Self, DashboardError> {
        let mut loader = DataLoader::new();
        loader.load_csv(&path.to_string_lossy())?;
        Self::from_dataframe(loader.take_dataframe()?, config)
    }

    pub fn from_bytes(bytes: Vec<u8>, config: DashboardConfig) -> Result<Self, DashboardError> {
        let mut loader = DataLoader::new();
        loader.load_csv_bytes(bytes)?;
        Self::from_dataframe(loader.take_dataframe()?, config)
    }

    /// Validate, coerce and summarise. Nothing is kept unless every step succeeds.
    pub fn from_dataframe(df: DataFrame, config: DashboardConfig) -> Result<Self, DashboardError> {
        let missing = DataLoader::missing_columns(&df, &config.required_columns);
        if !missing.is_empty() {
            return Err(DashboardError::MissingColumns {
                required: config.required_columns.clone(),
                missing,
            });
        }

        let dataset = DataProcessor::coerce_numeric(df, &config.numeric_columns)?;
        let snapshot = MetricSnapshot::compute(&dataset, &config)?;
        info!(
            "Session ready: {} rows, {} columns",
            dataset.height(),
            dataset.width()
        );

        Ok(Self {
            config,
            dataset,
            snapshot,
            processed_csv: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dataset(&self) -> &DataFrame {
        &self.dataset
    }

    pub fn snapshot(&self) -> &MetricSnapshot {
        &self.snapshot
    }

    pub fn columns(&self) -> Vec<String> {
        self.dataset
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// The full coerced dataset as CSV. Encoded once per session.
    pub fn processed_csv(&self) -> Result<&[u8], DashboardError> {
        if let Some(bytes) = self.processed_csv.get() {
            return Ok(bytes);
        }
        let bytes = CsvExporter::to_csv_bytes(&self.dataset)?;
        Ok(self.processed_csv.get_or_init(|| bytes))
    }

    pub fn top_transactions(&self, count: usize) -> Result<TopTransactions, DashboardError> {
        let (lo, hi) = TOP_N_RANGE;
        if !(lo..=hi).contains(&count) {
            return Err(DashboardError::TopNOutOfRange(count));
        }

        let sale = &self.config.sale_column;
        let profit = &self.config.profit_column;
        let label = &self.config.chart_label_column;

        let by_sale = DataProcessor::top_n(&self.dataset, count, sale)?;
        let by_profit = DataProcessor::top_n(&self.dataset, count, profit)?;
        let sale_chart = BarChartData::from_frame(
            &by_sale,
            &format!("Top {} Transactions by {}", count, sale),
            label,
            sale,
        )?;
        let profit_chart = BarChartData::from_frame(
            &by_profit,
            &format!("Top {} Transactions by {}", count, profit),
            label,
            profit,
        )?;

        Ok(TopTransactions {
            count,
            by_sale,
            by_profit,
            sale_chart,
            profit_chart,
        })
    }

    pub fn data_preview(&self, options: &PreviewOptions) -> Result<DataPreview, DashboardError> {
        let projected = match &options.columns {
            Some(columns) => DataProcessor::select_columns(&self.dataset, columns)?,
            None => self.dataset.clone(),
        };
        let filtered = DataProcessor::keyword_filter(&projected, &options.keyword, true)?;

        Ok(DataPreview {
            head: DataProcessor::head(&filtered, self.config.preview_rows),
            summary: StatsCalculator::describe(&filtered),
            filtered,
        })
    }
}
