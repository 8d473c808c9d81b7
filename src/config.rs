//! Dashboard configuration
//! Column names, payment patterns and view defaults, optionally loaded from JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Smallest and largest number of rows the top transactions view accepts.
pub const TOP_N_RANGE: (usize, usize) = (1, 20);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Substring patterns used to split sales by payment mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentPatterns {
    pub cash: String,
    pub card: String,
    pub refund: String,
    pub stc_pay: String,
    /// Matched literally, so it only hits values containing "CASH/+CARD".
    pub cash_card: String,
}

impl Default for PaymentPatterns {
    fn default() -> Self {
        Self {
            cash: "CASH".to_string(),
            card: "CARD".to_string(),
            refund: "REFUND".to_string(),
            stc_pay: "STCPAY".to_string(),
            cash_card: "CASH/+CARD".to_string(),
        }
    }
}

/// Settings shared by every view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub currency: String,
    pub required_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub sale_column: String,
    pub profit_column: String,
    pub net_cost_column: String,
    pub payment_column: String,
    pub payment_patterns: PaymentPatterns,
    pub transaction_count_patterns: Vec<String>,
    /// Column used for the bar chart axis.
    pub chart_label_column: String,
    pub chart_width: u32,
    pub chart_height: u32,
    pub default_top_n: usize,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            currency: "SAR".to_string(),
            required_columns: ["Profit", "Sale", "Payment Mode", "Net Cost"]
                .map(String::from)
                .to_vec(),
            numeric_columns: ["Profit", "Sale", "Net Cost"].map(String::from).to_vec(),
            sale_column: "Sale".to_string(),
            profit_column: "Profit".to_string(),
            net_cost_column: "Net Cost".to_string(),
            payment_column: "Payment Mode".to_string(),
            payment_patterns: PaymentPatterns::default(),
            transaction_count_patterns: ["CASH", "CARD", "REFUND"].map(String::from).to_vec(),
            chart_label_column: "Date".to_string(),
            chart_width: 900,
            chart_height: 500,
            default_top_n: 5,
            preview_rows: 10,
        }
    }
}

impl DashboardConfig {
    /// Load a config file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: DashboardConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_columns.is_empty() {
            return Err(ConfigError::Invalid(
                "required_columns must not be empty".to_string(),
            ));
        }
        if let Some(col) = self
            .numeric_columns
            .iter()
            .find(|c| !self.required_columns.contains(c))
        {
            return Err(ConfigError::Invalid(format!(
                "numeric column '{}' is not a required column",
                col
            )));
        }
        let (lo, hi) = TOP_N_RANGE;
        if !(lo..=hi).contains(&self.default_top_n) {
            return Err(ConfigError::Invalid(format!(
                "default_top_n must be between {} and {}",
                lo, hi
            )));
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigError::Invalid("chart size must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.required_columns.len(), 4);
        assert_eq!(config.payment_patterns.cash_card, "CASH/+CARD");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"currency": "USD", "default_top_n": 10}}"#).unwrap();

        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.currency, "USD");
        assert_eq!(config.default_top_n, 10);
        assert_eq!(config.sale_column, "Sale");
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn out_of_range_top_n_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_top_n": 50}}"#).unwrap();

        let err = DashboardConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn numeric_column_must_be_required() {
        let config = DashboardConfig {
            numeric_columns: vec!["Tax".to_string()],
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
