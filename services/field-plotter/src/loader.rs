//! Dataset loading for a plot run.

use anyhow::{Context, Result};
use field_common::{ForecastSource, ForecastTime, ReferenceSource};
use grid_processor::{discover_member_files, EnsembleDataset, ReferenceDataset};
use renderer::FieldPlotter;
use tracing::info;

use crate::config::{ModelSource, PlotConfig, ReferenceConfig};

/// Discover, load and crop one model.
pub fn load_model(
    config: &PlotConfig,
    source: &ModelSource,
    time: &ForecastTime,
) -> Result<EnsembleDataset> {
    let prefix = source.prefix.as_deref().unwrap_or(&config.file_prefix);
    let files = discover_member_files(&source.path, time, config.members.as_deref(), prefix)
        .with_context(|| format!("Failed to find forecast files under {:?}", source.path))?;

    let mut dataset = EnsembleDataset::load_members(&files, config.units)
        .with_context(|| format!("Failed to load forecast from {:?}", source.path))?;
    if let Some(window) = &config.window {
        dataset = dataset
            .crop(window)
            .with_context(|| format!("Failed to crop forecast from {:?}", source.path))?;
    }

    info!(
        path = %source.path.display(),
        members = dataset.num_members(),
        lead_times = dataset.num_lead_times(),
        points = dataset.coordinates().len(),
        "Loaded model"
    );
    Ok(dataset)
}

pub fn load_reference(config: &PlotConfig, reference: &ReferenceConfig) -> Result<ReferenceDataset> {
    let mut dataset = ReferenceDataset::load(&reference.path, reference.units)
        .with_context(|| format!("Failed to load reference from {:?}", reference.path))?;
    if let Some(window) = &config.window {
        dataset = dataset
            .crop(window)
            .with_context(|| format!("Failed to crop reference from {:?}", reference.path))?;
    }

    info!(
        path = %reference.path.display(),
        lead_times = dataset.num_lead_times(),
        points = dataset.coordinates().len(),
        "Loaded reference"
    );
    Ok(dataset)
}

/// Load every configured dataset into a plotter.
pub fn build_plotter(config: &PlotConfig) -> Result<FieldPlotter<EnsembleDataset>> {
    let time = config.forecast_time()?;

    let models = config
        .models
        .iter()
        .map(|source| load_model(config, source, &time))
        .collect::<Result<Vec<_>>>()?;

    let mut plotter = FieldPlotter::new(models, time)
        .with_step(config.step()?)
        .with_grid_config(config.grid.clone());

    if let Some(members) = &config.members {
        plotter = plotter.with_members(members.clone());
    }
    if let Some(labels) = config.model_labels() {
        plotter = plotter.with_model_labels(labels);
    }
    if let Some(reference) = &config.reference {
        plotter = plotter.with_reference(load_reference(config, reference)?);
        if let Some(label) = &reference.label {
            plotter = plotter.with_reference_label(label.clone());
        }
    }
    Ok(plotter)
}
