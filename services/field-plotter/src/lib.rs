//! Field plotter service library.
//!
//! Loads the forecasts named in a [`PlotConfig`], plots one field and saves
//! the figure with its manifest.

pub mod config;
pub mod loader;

use std::path::PathBuf;

use anyhow::{Context, Result};
use renderer::{FigureRenderer, LabelFont, PlotSummary};
use tracing::info;

pub use config::{ModelSource, PlotConfig, ReferenceConfig};

/// Result of one plot run.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: PlotSummary,
    pub image: PathBuf,
    pub manifest: PathBuf,
}

/// Plot the configured field and save it to `config.output`.
pub fn run(config: &PlotConfig) -> Result<RunOutcome> {
    config.validate()?;
    let plotter = loader::build_plotter(config)?;

    let ramp = config.style.ramp_for(&config.field)?;
    let font = LabelFont::discover(config.font.as_deref());
    let mut figure = FigureRenderer::new(config.style.clone(), ramp)
        .with_font(font)
        .with_resample(config.grid.resample);

    let summary = plotter
        .plot(&config.field, &config.plot, &mut figure)
        .with_context(|| format!("Failed to plot {}", config.field))?;
    let manifest = figure.save(&config.output)?;

    info!(
        field = %config.field,
        output = %config.output.display(),
        panels = summary.rendered,
        "Plot written"
    );

    Ok(RunOutcome {
        summary,
        image: config.output.clone(),
        manifest,
    })
}
