//! Data module - CSV loading, processing and export

mod export;
mod loader;
mod processor;

pub use export::{CsvExporter, ExportError};
pub use loader::{DataLoader, LoaderError};
pub use processor::{text_contains, DataProcessor, ProcessorError};
