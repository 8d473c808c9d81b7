//! Static Chart Renderer
//! Bar charts of top transactions, written as PNG with plotters.

use log::{debug, warn};
use plotters::prelude::{
    BitMapBackend, ChartBuilder, Color, Histogram, IntoDrawingArea, IntoSegmentedCoord, RGBColor,
    SegmentValue, WHITE,
};
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

const BAR_COLOR: RGBColor = RGBColor(46, 134, 193);
const NEGATIVE_COLOR: RGBColor = RGBColor(231, 76, 60);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Nothing to plot for '{0}'")]
    NoData(String),
    #[error("Failed to render chart: {0}")]
    Render(String),
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// One labelled bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Bars for a single chart, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartData {
    pub title: String,
    pub label_name: String,
    pub value_label: String,
    pub bars: Vec<Bar>,
}

impl BarChartData {
    /// One bar per row of `df`, labelled by `label_column` and sized by `value_column`.
    ///
    /// Missing values plot as zero-height bars. When the label column does
    /// not exist, bars are labelled by rank instead.
    pub fn from_frame(
        df: &DataFrame,
        title: &str,
        label_column: &str,
        value_column: &str,
    ) -> Result<Self, ChartError> {
        let values = df.column(value_column)?.cast(&DataType::Float64)?;
        let values: Vec<f64> = values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()).unwrap_or(0.0))
            .collect();

        let labels: Vec<String> = match df.column(label_column) {
            Ok(col) => col
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect(),
            Err(_) => {
                warn!(
                    "Column '{}' not found, labelling bars by rank",
                    label_column
                );
                (1..=values.len()).map(|i| format!("#{}", i)).collect()
            }
        };

        Ok(Self {
            title: title.to_string(),
            label_name: label_column.to_string(),
            value_label: value_column.to_string(),
            bars: labels
                .into_iter()
                .zip(values)
                .map(|(label, value)| Bar { label, value })
                .collect(),
        })
    }

    /// Y-axis range that always includes zero, padded by 10%.
    pub fn value_range(&self) -> (f64, f64) {
        let lo = self.bars.iter().map(|b| b.value).fold(0.0, f64::min);
        let hi = self.bars.iter().map(|b| b.value).fold(0.0, f64::max);
        if lo == hi {
            return (0.0, 1.0);
        }
        let pad = (hi - lo) * 0.1;
        (if lo < 0.0 { lo - pad } else { 0.0 }, if hi > 0.0 { hi + pad } else { 0.0 })
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a vertical bar chart to a PNG file.
    pub fn render_bar_chart(
        data: &BarChartData,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), ChartError> {
        if data.bars.is_empty() {
            return Err(ChartError::NoData(data.title.clone()));
        }

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let n = data.bars.len();
        let (y_min, y_max) = data.value_range();
        let labels: Vec<String> = data.bars.iter().map(|b| b.label.clone()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption(&data.title, ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0usize..n).into_segmented(), y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &SegmentValue<usize>| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc(&data.label_name)
            .y_desc(&data.value_label)
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style_func(|_, value: &f64| {
                        if *value < 0.0 {
                            NEGATIVE_COLOR.filled()
                        } else {
                            BAR_COLOR.filled()
                        }
                    })
                    .margin(8)
                    .data(data.bars.iter().enumerate().map(|(i, bar)| (i, bar.value))),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        debug!("Wrote chart '{}' to {}", data.title, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_rows() -> DataFrame {
        df!(
            "Date" => [Some("2024-01-01"), None],
            "Sale" => [Some(100.0), None]
        )
        .unwrap()
    }

    #[test]
    fn bars_follow_row_order() {
        let data = BarChartData::from_frame(&top_rows(), "Sales", "Date", "Sale").unwrap();
        assert_eq!(
            data.bars,
            vec![
                Bar { label: "2024-01-01".into(), value: 100.0 },
                Bar { label: String::new(), value: 0.0 },
            ]
        );
        assert_eq!(data.value_label, "Sale");
    }

    #[test]
    fn missing_label_column_falls_back_to_rank() {
        let data = BarChartData::from_frame(&top_rows(), "Sales", "Invoice", "Sale").unwrap();
        let labels: Vec<&str> = data.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["#1", "#2"]);
    }

    #[test]
    fn missing_value_column_is_an_error() {
        assert!(BarChartData::from_frame(&top_rows(), "Sales", "Date", "Profit").is_err());
    }

    #[test]
    fn value_range_includes_zero() {
        let data = BarChartData {
            title: "t".into(),
            label_name: "l".into(),
            value_label: "v".into(),
            bars: vec![
                Bar { label: "a".into(), value: 50.0 },
                Bar { label: "b".into(), value: -10.0 },
            ],
        };
        let (lo, hi) = data.value_range();
        assert!(lo < -10.0 && hi > 50.0);

        let flat = BarChartData { bars: vec![], ..data };
        assert_eq!(flat.value_range(), (0.0, 1.0));
    }

    #[test]
    fn empty_chart_is_rejected_before_drawing() {
        let data = BarChartData {
            title: "Empty".into(),
            label_name: "Date".into(),
            value_label: "Sale".into(),
            bars: vec![],
        };
        let dir = tempfile::tempdir().unwrap();
        let err = StaticChartRenderer::render_bar_chart(&data, &dir.path().join("x.png"), 100, 100)
            .unwrap_err();
        assert!(matches!(err, ChartError::NoData(_)));
    }
}
