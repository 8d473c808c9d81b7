//! Dashboard module - per-upload session and its views

mod session;
mod views;

pub use session::{DashboardError, DataPreview, PreviewOptions, Session, TopTransactions};
pub use views::{format_amount, frame_table, overview_text, render, summary_table, RenderedView, View};
