//! SalesBoard - sales transaction CSV dashboard
//!
//! Loads a CSV of sales transactions, checks the required columns, coerces
//! the money columns to numbers and derives the overview metrics, top
//! transactions and filtered exports.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod stats;

pub use config::DashboardConfig;
pub use dashboard::{DashboardError, Session, View};
