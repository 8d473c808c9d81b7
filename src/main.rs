//! SalesBoard - Sales Transaction Dashboard
//!
//! Command line front end: each subcommand is one dashboard section.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info};
use salesboard::charts::StaticChartRenderer;
use salesboard::config::{DashboardConfig, TOP_N_RANGE};
use salesboard::dashboard::{render, PreviewOptions, RenderedView, Session, View};
use salesboard::data::CsvExporter;
use salesboard::DashboardError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "salesboard")]
#[command(about = "Business analytics dashboard for sales transaction CSV files", long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// JSON file overriding column names, payment patterns and defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write the full processed dataset as CSV
    #[arg(long, global = true, value_name = "FILE")]
    processed_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Key metrics and payment breakdown
    Overview {
        file: Option<PathBuf>,
        /// Print the metric snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Largest transactions by sale and by profit
    Top {
        file: Option<PathBuf>,
        /// Number of transactions to show (1-20)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(TOP_N_RANGE.0 as i64..=TOP_N_RANGE.1 as i64))]
        count: Option<u8>,
        /// Directory to write bar chart PNGs into
        #[arg(long, value_name = "DIR")]
        chart_dir: Option<PathBuf>,
    },
    /// Filter rows by column subset and keyword
    Preview {
        file: Option<PathBuf>,
        /// Comma separated columns to keep (default: all)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Case-insensitive keyword searched in every kept column
        #[arg(short, long, default_value = "")]
        keyword: String,
        /// Write the filtered rows as CSV
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Write the processed dataset as CSV
    Export {
        file: Option<PathBuf>,
        #[arg(short, long, default_value = "processed_data.csv")]
        output: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_session(file: &Path, config: DashboardConfig) -> Result<Session> {
    info!("Processing {}", file.display());
    Ok(Session::from_path(file, config)?)
}

fn write_charts(rendered: &RenderedView, dir: &Path, config: &DashboardConfig) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory {}", dir.display()))?;
    for chart in &rendered.charts {
        let name = format!(
            "top_{}.png",
            chart.value_label.to_lowercase().replace(' ', "_")
        );
        let path = dir.join(name);
        StaticChartRenderer::render_bar_chart(chart, &path, config.chart_width, config.chart_height)?;
        println!("Chart written to {}", path.display());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    let file = match &cli.command {
        Commands::Overview { file, .. }
        | Commands::Top { file, .. }
        | Commands::Preview { file, .. }
        | Commands::Export { file, .. } => file.clone(),
    };
    let Some(file) = file else {
        println!("Please upload a CSV file to proceed.");
        return Ok(());
    };

    let session = load_session(&file, config)?;

    match cli.command {
        Commands::Overview { json, .. } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.snapshot())?);
            } else {
                println!("{}", render(&session, &View::Overview)?.text);
            }
        }
        Commands::Top {
            count, chart_dir, ..
        } => {
            let count = count
                .map(usize::from)
                .unwrap_or(session.config().default_top_n);
            let rendered = render(&session, &View::TopTransactions { count })?;
            println!("{}", rendered.text);
            if let Some(dir) = chart_dir {
                write_charts(&rendered, &dir, session.config())?;
            }
        }
        Commands::Preview {
            columns,
            keyword,
            output,
            ..
        } => {
            let options = PreviewOptions {
                columns: (!columns.is_empty()).then_some(columns),
                keyword,
            };
            let rendered = render(&session, &View::DataPreview(options))?;
            println!("{}", rendered.text);
            if let (Some(path), Some(bytes)) = (output, rendered.filtered_csv.as_deref()) {
                CsvExporter::write_bytes(bytes, &path)?;
                println!("Filtered data written to {}", path.display());
            }
        }
        Commands::Export { output, .. } => {
            CsvExporter::write_bytes(session.processed_csv()?, &output)?;
            println!("Processed data written to {}", output.display());
        }
    }

    if let Some(path) = cli.processed_out {
        CsvExporter::write_bytes(session.processed_csv()?, &path)?;
        println!("Processed data written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{:?}", err);
            match err.downcast_ref::<DashboardError>() {
                Some(missing @ DashboardError::MissingColumns { .. }) => eprintln!("{}", missing),
                _ => eprintln!("An error occurred while processing the file: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
