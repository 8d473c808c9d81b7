//! Dashboard Views
//! Overview cards, top transactions and the data preview, rendered as text.

use crate::charts::BarChartData;
use crate::dashboard::session::{DashboardError, PreviewOptions, Session};
use crate::stats::{ColumnSummary, MetricSnapshot};
use polars::prelude::*;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Which section of the dashboard to show.
#[derive(Debug, Clone)]
pub enum View {
    Overview,
    TopTransactions { count: usize },
    DataPreview(PreviewOptions),
}

/// Text for the terminal plus whatever the view offers for download.
#[derive(Debug, Clone, Default)]
pub struct RenderedView {
    pub text: String,
    pub charts: Vec<BarChartData>,
    pub filtered_csv: Option<Vec<u8>>,
}

pub fn render(session: &Session, view: &View) -> Result<RenderedView, DashboardError> {
    match view {
        View::Overview => Ok(RenderedView {
            text: overview_text(session.snapshot(), &session.config().currency),
            ..RenderedView::default()
        }),
        View::TopTransactions { count } => {
            let top = session.top_transactions(*count)?;
            let text = format!(
                "Top Transactions\n\n\
                 Top {n} Transactions by {sale}\n{sale_table}\n\n\
                 Top {n} Transactions by {profit}\n{profit_table}\n",
                n = top.count,
                sale = top.sale_chart.value_label,
                sale_table = frame_table(&top.by_sale)?,
                profit = top.profit_chart.value_label,
                profit_table = frame_table(&top.by_profit)?,
            );
            Ok(RenderedView {
                text,
                charts: vec![top.sale_chart, top.profit_chart],
                filtered_csv: None,
            })
        }
        View::DataPreview(options) => {
            let preview = session.data_preview(options)?;
            let text = format!(
                "Data Explorer\n\n\
                 Found {rows} rows matching the criteria.\n\n\
                 Filtered Dataframe\n{head}\n\n\
                 Data Summary\n{summary}\n",
                rows = preview.row_count(),
                head = frame_table(&preview.head)?,
                summary = summary_table(&preview.summary),
            );
            Ok(RenderedView {
                text,
                charts: Vec::new(),
                filtered_csv: Some(preview.to_csv()?),
            })
        }
    }
}

/// `1234.5` -> `"SAR 1,234.50"`.
pub fn format_amount(currency: &str, value: f64) -> String {
    if !value.is_finite() {
        return format!("{} {}", currency, value);
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{} {}{}.{}", currency, sign, grouped, frac_part)
}

/// The eight overview cards and the transaction counts.
pub fn overview_text(snapshot: &MetricSnapshot, currency: &str) -> String {
    let amount = |v: f64| format_amount(currency, v);

    let mut cards = Builder::default();
    cards.push_record(["Key Metrics Overview", ""]);
    cards.push_record(["Total Net Cost".to_string(), amount(snapshot.total_net_cost)]);
    cards.push_record(["Total Sales".to_string(), amount(snapshot.total_sales)]);
    cards.push_record(["Total Profit".to_string(), amount(snapshot.total_profit)]);
    cards.push_record(["Average Profit".to_string(), amount(snapshot.average_profit)]);
    cards.push_record(["Payment Breakdown".to_string(), String::new()]);
    cards.push_record(["Cash Payments".to_string(), amount(snapshot.cash_payment)]);
    cards.push_record([
        "Card Payments & STCPAY".to_string(),
        format!("{} & {}", amount(snapshot.card_payment), amount(snapshot.stc_pay)),
    ]);
    cards.push_record(["Refunds".to_string(), amount(snapshot.refund)]);
    cards.push_record(["Cash + Card Payments".to_string(), amount(snapshot.cash_card)]);

    let mut counts = Builder::default();
    counts.push_record(["Payment Mode", "Transactions"]);
    for tc in &snapshot.transaction_counts {
        counts.push_record([tc.payment_mode.clone(), tc.count.to_string()]);
    }

    format!(
        "{}\n\n{}",
        cards.build().with(Style::rounded()),
        counts.build().with(Style::rounded())
    )
}

/// Render every row of `df` as a table. Missing cells are left blank.
pub fn frame_table(df: &DataFrame) -> PolarsResult<String> {
    let mut columns: Vec<Vec<String>> = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let text = col.cast(&DataType::String)?;
        columns.push(
            text.str()?
                .into_iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect(),
        );
    }

    let mut builder = Builder::default();
    builder.push_record(df.get_column_names().iter().map(|s| s.to_string()));
    for row in 0..df.height() {
        builder.push_record(columns.iter().map(|cells| cells[row].clone()));
    }
    Ok(builder.build().with(Style::rounded()).to_string())
}

pub fn summary_table(summary: &[ColumnSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]);
    for s in summary {
        builder.push_record([
            s.column.clone(),
            s.count.to_string(),
            format!("{:.6}", s.mean),
            format!("{:.6}", s.std),
            format!("{:.6}", s.min),
            format!("{:.6}", s.p25),
            format!("{:.6}", s.median),
            format!("{:.6}", s.p75),
            format!("{:.6}", s.max),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}
