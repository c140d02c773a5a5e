//! Bump chart CLI
//!
//! Reads a CSV table, computes the bump chart and writes the recorded scene
//! (axes frame and drawing primitives) as JSON.

use anyhow::{bail, Context};
use bumpchart::{render_bump_chart, ChartConfig, ColumnKeys};
use clap::Parser;
use polars::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Render a bump chart scene from a CSV file
#[derive(Parser, Debug)]
#[command(name = "bumpchart")]
#[command(version)]
#[command(about = "Compute a bump chart from a CSV table and write the scene as JSON")]
struct Cli {
    /// Input CSV file (with header row)
    #[arg(short, long)]
    input: PathBuf,

    /// Time column
    #[arg(long)]
    time: String,

    /// Entity column
    #[arg(long)]
    entity: String,

    /// Column of explicit ranks
    #[arg(long, conflicts_with = "value")]
    rank: Option<String>,

    /// Column of values to rank per time step
    #[arg(long)]
    value: Option<String>,

    /// JSON file of chart properties (e.g. chart_config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;

    let keys = match (&cli.rank, &cli.value) {
        (Some(rank), None) => ColumnKeys::with_rank(&cli.time, &cli.entity, rank),
        (None, Some(value)) => ColumnKeys::with_value(&cli.time, &cli.entity, value),
        _ => bail!("exactly one of --rank and --value must be given"),
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(cli.input.clone()))
        .and_then(|reader| reader.finish())
        .with_context(|| format!("Failed to read CSV {}", cli.input.display()))?;
    info!("Loaded {} rows x {} columns", df.height(), df.width());

    let chart = render_bump_chart(&df, &keys, &config).context("Failed to build bump chart")?;
    info!(
        "Rendered {} entities, {} primitives",
        chart.layout.trajectories.len(),
        chart.surface.primitives.len()
    );

    let json = chart
        .surface
        .to_json()
        .context("Failed to serialize scene")?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Scene written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write scene to stdout")?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ChartConfig> {
    let Some(path) = path else {
        return Ok(ChartConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = ChartConfig::from_json(&text)
        .with_context(|| format!("Invalid chart config {}", path.display()))?;
    Ok(config)
}
