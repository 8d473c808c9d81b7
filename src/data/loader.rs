//! CSV Data Loader Module
//! Handles CSV loading and required-column validation using Polars.

use log::{debug, info};
use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Holds the most recently uploaded dataset. Loading again replaces it.
///
/// Column types are inferred from every row, so a late float or late text
/// widens the column instead of being blanked. Malformed rows are errors.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(&mut self, file_path: &str) -> Result<&DataFrame, LoaderError> {
        self.clear();

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()?
            .collect()?;

        info!(
            "Loaded {} ({} rows, {} columns)",
            file_path,
            df.height(),
            df.width()
        );
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Load CSV content that is already in memory, e.g. an uploaded body.
    pub fn load_csv_bytes(&mut self, bytes: Vec<u8>) -> Result<&DataFrame, LoaderError> {
        self.clear();

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        debug!("Loaded {} rows from memory", df.height());
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Hand the loaded DataFrame over to the caller.
    pub fn take_dataframe(&mut self) -> Result<DataFrame, LoaderError> {
        self.df.take().ok_or(LoaderError::NoData)
    }

    pub fn clear(&mut self) {
        self.df = None;
    }

    /// True iff every required name is a column of `df` (exact match).
    pub fn validate_columns(df: &DataFrame, required: &[String]) -> bool {
        Self::missing_columns(df, required).is_empty()
    }

    /// Required names absent from `df`, in the order they were required.
    pub fn missing_columns(df: &DataFrame, required: &[String]) -> Vec<String> {
        let present = df.get_column_names();
        required
            .iter()
            .filter(|name| !present.iter().any(|col| col.as_str() == name.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn required() -> Vec<String> {
        ["Profit", "Sale", "Payment Mode", "Net Cost"]
            .map(String::from)
            .to_vec()
    }

    fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn validate_accepts_superset_of_required() {
        let df = df!(
            "Profit" => [1.0],
            "Sale" => [2.0],
            "Payment Mode" => ["CASH"],
            "Net Cost" => [1.0],
            "Date" => ["2024-01-01"]
        )
        .unwrap();
        assert!(DataLoader::validate_columns(&df, &required()));
    }

    #[test]
    fn missing_columns_are_reported_in_required_order() {
        let df = df!("Sale" => [2.0], "profit" => [1.0]).unwrap();
        assert!(!DataLoader::validate_columns(&df, &required()));
        assert_eq!(
            DataLoader::missing_columns(&df, &required()),
            vec!["Profit", "Payment Mode", "Net Cost"]
        );
    }

    #[test]
    fn empty_required_set_always_validates() {
        let df = df!("Anything" => [1]).unwrap();
        assert!(DataLoader::validate_columns(&df, &[]));
    }

    #[test]
    fn load_bytes_reads_header_and_rows() {
        let mut loader = DataLoader::new();
        let csv = b"Sale,Payment Mode\n100,CASH\n50,CARD\n".to_vec();
        let df = loader.load_csv_bytes(csv).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(column_names(df), vec!["Sale", "Payment Mode"]);
    }

    #[test]
    fn late_values_widen_the_column_type() {
        let mut csv = String::from("Invoice,Sale\n");
        for i in 0..10_050 {
            csv.push_str(&format!("{},10\n", i));
        }
        csv.push_str("INV-LATE,12.5\n");

        let mut loader = DataLoader::new();
        let df = loader.load_csv_bytes(csv.into_bytes()).unwrap();
        assert_eq!(df.height(), 10_051);

        let sale = df.column("Sale").unwrap();
        assert_eq!(sale.dtype(), &DataType::Float64);
        assert_eq!(sale.null_count(), 0);

        let invoice = df.column("Invoice").unwrap();
        assert_eq!(invoice.dtype(), &DataType::String);
        assert_eq!(invoice.str().unwrap().get(10_050), Some("INV-LATE"));
    }

    #[test]
    fn ragged_rows_are_an_error() {
        let mut loader = DataLoader::new();
        let csv = b"A,B\n1,2\n3,4,5,6\n".to_vec();
        assert!(loader.load_csv_bytes(csv).is_err());
    }

    #[test]
    fn load_from_path_replaces_previous_upload() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "A,B\n1,2\n3,4").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(second, "C\nx").unwrap();

        let mut loader = DataLoader::new();
        let df = loader.load_csv(first.path().to_str().unwrap()).unwrap();
        assert_eq!(df.height(), 2);

        let df = loader.load_csv(second.path().to_str().unwrap()).unwrap();
        assert_eq!(column_names(df), vec!["C"]);
        assert!(loader.take_dataframe().is_ok());
        assert!(matches!(loader.take_dataframe(), Err(LoaderError::NoData)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut loader = DataLoader::new();
        assert!(loader.load_csv("/nonexistent/sales.csv").is_err());
        assert!(matches!(loader.take_dataframe(), Err(LoaderError::NoData)));
    }
}
