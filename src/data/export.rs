//! CSV Export Module
//! Serializes datasets back to CSV bytes for downloads.

use polars::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to encode CSV: {0}")]
    Encode(#[from] PolarsError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Writes UTF-8 CSV with a header row and no index column.
pub struct CsvExporter;

impl CsvExporter {
    /// Encode `df`. Identical frames always produce identical bytes.
    pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>, ExportError> {
        let mut buf = Vec::new();
        let mut df = df.clone();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df)?;
        Ok(buf)
    }

    /// Write already encoded CSV to `path`.
    pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<(), ExportError> {
        fs::write(path, bytes).map_err(|source| ExportError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn frame() -> DataFrame {
        df!(
            "Sale" => [Some(100.0), None],
            "Payment Mode" => ["CASH", "CARD, VISA"],
            "Date" => ["2024-01-01", "2024-01-02"]
        )
        .unwrap()
    }

    #[test]
    fn header_comes_first_in_column_order() {
        let bytes = CsvExporter::to_csv_bytes(&frame()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().next(), Some("Sale,Payment Mode,Date"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn output_is_deterministic() {
        let a = CsvExporter::to_csv_bytes(&frame()).unwrap();
        let b = CsvExporter::to_csv_bytes(&frame().clone()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reparsing_reproduces_values() {
        let original = frame();
        let bytes = CsvExporter::to_csv_bytes(&original).unwrap();

        let mut loader = DataLoader::new();
        let reparsed = loader.load_csv_bytes(bytes).unwrap();
        assert!(original.equals_missing(reparsed));
    }

    #[test]
    fn write_bytes_reports_bad_path() {
        let err = CsvExporter::write_bytes(b"a\n", Path::new("/nonexistent/dir/out.csv"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/out.csv"));
    }
}
