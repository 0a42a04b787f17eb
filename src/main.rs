//! Indonesia Export-Import Dashboard - command line front end
//!
//! Prints headline metrics, exports the derived tables and renders charts.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use exim_dashboard::charts::ChartRenderer;
use exim_dashboard::report::format::{format_number, format_percent};
use exim_dashboard::report::TableExporter;
use exim_dashboard::{DashboardView, DataLoader, Measure, StatsError};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exim-dashboard")]
#[command(about = "Yearly export-import statistics for Indonesia (BPS data)")]
struct Args {
    /// Path to the BPS export-import CSV
    #[arg(short, long, default_value = "Data_Ekspor_Impor_Indonesia_BPS.csv")]
    data: PathBuf,

    /// First year of the range (clamped to the dataset)
    #[arg(long)]
    from: Option<i32>,

    /// Last year of the range (clamped to the dataset)
    #[arg(long)]
    to: Option<i32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Directory for CSV tables
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Render PNG charts into this directory
    #[arg(long)]
    charts: Option<PathBuf>,

    /// Rows scanned to infer column types (0 scans the whole file)
    #[arg(long, default_value_t = 10000)]
    infer_schema_rows: usize,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
    Csv,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let infer_rows = (args.infer_schema_rows > 0).then_some(args.infer_schema_rows);
    let dataset = DataLoader::new()
        .with_infer_schema_length(infer_rows)
        .load_csv(&args.data)
        .with_context(|| format!("loading {}", args.data.display()))?;
    if let Some(path) = dataset.file_path() {
        info!("Source: {} ({} records)", path.display(), dataset.len());
    }

    let view = DashboardView::compute(&dataset, args.from, args.to)?;
    info!("Computed dashboard for {}", view.range);

    match args.format {
        OutputFormat::Summary => print_summary(&view)?,
        OutputFormat::Json => println!("{}", TableExporter::to_json(&view)?),
        OutputFormat::Csv => {
            let written = TableExporter::export_csv(&view, &args.output_dir)?;
            for path in written {
                println!("{}", path.display());
            }
        }
    }

    if let Some(dir) = &args.charts {
        let renderer = ChartRenderer::new(dir)?;
        for path in renderer.render_all(&view)? {
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn print_summary(view: &DashboardView) -> Result<()> {
    println!("Data Ekspor-Impor Indonesia ({})", view.range);
    println!("{}", "=".repeat(60));

    let metrics = match view.headline() {
        Ok(metrics) => metrics,
        Err(StatsError::EmptyInput) => {
            println!("No records in the selected range.");
            return Ok(());
        }
    };

    println!("\nTotals");
    for measure in Measure::ALL {
        println!(
            "  {:<24} {:>28}",
            measure.column(),
            format_number(*metrics.totals.get(measure))
        );
    }

    println!("\nAverage growth");
    for measure in Measure::ALL {
        println!(
            "  {:<24} {:>28}",
            measure.growth_column(),
            format_percent(*metrics.average_growth.get(measure))
        );
    }

    println!("\nTrade balance");
    println!(
        "  {:<24} {:>28}",
        "Total (US $)",
        format_number(metrics.total_balance)
    );
    println!(
        "  {:<24} {:>28}",
        "Average (US $)",
        format_number(metrics.average_balance)
    );

    println!(
        "\n{:<6} {:>24} {:>12} {:>12}",
        "Tahun", "Neraca (US $)", "Ekspor %", "Keterangan"
    );
    for (balance, growth) in view.balance.iter().zip(&view.growth) {
        println!(
            "{:<6} {:>24} {:>12} {:>12}",
            balance.year,
            format_number(balance.balance),
            format_percent(growth.change.export_value),
            balance.classification
        );
    }

    Ok(())
}
