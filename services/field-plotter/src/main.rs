//! Field plotter CLI.
//!
//! Plots one forecast field of one or more (ensemble) models as a grid of
//! map panels, optionally with ensemble mean and reference panels.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use field_plotter::PlotConfig;

#[derive(Parser, Debug)]
#[command(name = "field-plotter")]
#[command(about = "Plot forecast fields as multi-panel figures")]
struct Args {
    /// Plot configuration file
    #[arg(short, long, default_value = "plot.yaml", env = "PLOT_CONFIG")]
    config: PathBuf,

    /// Field to plot (overrides the config file)
    #[arg(short, long)]
    field: Option<String>,

    /// Comma-separated lead time steps, e.g. 0,4,8
    #[arg(long, value_delimiter = ',')]
    lead_times: Option<Vec<usize>>,

    /// Forecast initialisation time, e.g. 2024-05-01T06
    #[arg(long)]
    time: Option<String>,

    /// Add an ensemble mean panel per model and lead time
    #[arg(long)]
    ensemble_mean: bool,

    /// Overlay sea-level pressure contours
    #[arg(long)]
    pressure_contour: bool,

    /// Transpose the panel grid
    #[arg(long)]
    swap_axes: bool,

    /// Output PNG path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TrueType font for labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// Command-line values take precedence over the config file.
    fn apply(&self, config: &mut PlotConfig) {
        if let Some(field) = &self.field {
            config.field = field.clone();
        }
        if let Some(lead_times) = &self.lead_times {
            config.plot.lead_times = lead_times.clone();
        }
        if let Some(time) = &self.time {
            config.time = time.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(font) = &self.font {
            config.font = Some(font.clone());
        }
        config.plot.plot_ensemble_mean |= self.ensemble_mean;
        config.plot.pressure_contour |= self.pressure_contour;
        config.plot.swap_axes |= self.swap_axes;
    }
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    info!(config = %args.config.display(), "Starting field plotter");

    let mut config = PlotConfig::load(&args.config)?;
    args.apply(&mut config);

    let outcome = field_plotter::run(&config)?;

    let plan = &outcome.summary.plan;
    info!(
        rows = plan.panel_shape.rows,
        cols = plan.panel_shape.cols,
        panels = outcome.summary.rendered,
        empty = outcome.summary.empty,
        image = %outcome.image.display(),
        manifest = %outcome.manifest.display(),
        "Done"
    );
    Ok(())
}
