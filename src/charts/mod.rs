//! Charts module - Chart rendering

mod renderer;

pub use renderer::{Bar, BarChartData, ChartError, StaticChartRenderer};
