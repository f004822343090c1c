//! Plot driver: from datasets to a rendered figure.
//!
//! ```text
//! resolve ──► bind (row-major requests) ──► color scale
//!                                               │
//!               rayon: fetch + regrid each non-empty panel
//!                                               │
//!               PanelRenderer, row-major, empty cells skipped
//! ```

use std::time::Instant;

use field_common::{
    ColorScale, Coordinates, Dimension, Extent, FieldKind, ForecastSource, ForecastTime,
    LeadTimeStep, PlotError, ReferenceSource, Result, DEFAULT_BOUNDARIES, PRESSURE_CONTOUR_FIELD,
};
use grid_processor::{interpolate_onto, mesh, CoordinateGrids, Grid2D, GridConfig, Mesh};
use panel_layout::{bind, LayoutPlan, LayoutRequest, PanelContext, PanelRequest, PanelRole};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::figure::{FigureHeader, PanelData, PanelRenderer};

/// What to draw for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Dataset lead time steps, one panel slot each.
    pub lead_times: Vec<usize>,
    pub plot_ensemble_mean: bool,
    pub include_reference: bool,
    pub swap_axes: bool,
    /// Use a discrete color scale instead of the data range.
    pub norm: bool,
    /// Boundaries of the discrete scale; [`DEFAULT_BOUNDARIES`] when unset.
    pub boundaries: Option<Vec<f32>>,
    /// Overlay sea-level pressure contours.
    pub pressure_contour: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            lead_times: vec![0],
            plot_ensemble_mean: false,
            include_reference: false,
            swap_axes: false,
            norm: false,
            boundaries: None,
            pressure_contour: false,
        }
    }
}

/// Outcome of a plot call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSummary {
    pub plan: LayoutPlan,
    pub scale: ColorScale,
    pub rendered: usize,
    pub empty: usize,
}

/// Mesh and coordinate grids of one data source, shared by all its panels.
struct Geometry {
    mesh: Option<Mesh>,
    coords: CoordinateGrids,
}

impl Geometry {
    fn new(coords: &Coordinates, grid: &GridConfig) -> Result<Self> {
        if coords.regular() {
            return Ok(Self {
                mesh: None,
                coords: CoordinateGrids::from_regular(coords)?,
            });
        }
        let mesh = mesh(coords.lat(), coords.lon(), grid.resolution)?;
        Ok(Self {
            coords: CoordinateGrids::from_mesh(&mesh),
            mesh: Some(mesh),
        })
    }

    fn grid(&self, values: Vec<f32>, source: &Coordinates, radius: usize) -> Result<Grid2D> {
        match &self.mesh {
            None => Grid2D::from_regular(values, source),
            Some(mesh) => interpolate_onto(&values, source.lat(), source.lon(), mesh, radius),
        }
    }
}

struct PreparedPanel<'a> {
    grid: Grid2D,
    contour: Option<Grid2D>,
    geometry: &'a Geometry,
}

/// Plots one field of one or more models, optionally next to a reference.
pub struct FieldPlotter<M: ForecastSource> {
    models: Vec<M>,
    reference: Option<Box<dyn ReferenceSource>>,
    time: ForecastTime,
    members: Option<Vec<usize>>,
    model_labels: Option<Vec<String>>,
    reference_label: Option<String>,
    step: LeadTimeStep,
    grid: GridConfig,
}

impl<M: ForecastSource> FieldPlotter<M> {
    pub fn new(models: Vec<M>, time: ForecastTime) -> Self {
        Self {
            models,
            reference: None,
            time,
            members: None,
            model_labels: None,
            reference_label: None,
            step: LeadTimeStep::default(),
            grid: GridConfig::default(),
        }
    }

    pub fn with_reference(mut self, reference: impl ReferenceSource + 'static) -> Self {
        self.reference = Some(Box::new(reference));
        self
    }

    /// Ensemble member ids, in the order they are stacked in every model.
    /// Without members the models are deterministic.
    pub fn with_members(mut self, members: Vec<usize>) -> Self {
        self.members = Some(members);
        self
    }

    pub fn with_model_labels(mut self, labels: Vec<String>) -> Self {
        self.model_labels = Some(labels);
        self
    }

    pub fn with_reference_label(mut self, label: impl Into<String>) -> Self {
        self.reference_label = Some(label.into());
        self
    }

    pub fn with_step(mut self, step: LeadTimeStep) -> Self {
        self.step = step;
        self
    }

    pub fn with_grid_config(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn models(&self) -> &[M] {
        &self.models
    }

    fn layout_request(&self, options: &PlotOptions) -> LayoutRequest {
        LayoutRequest {
            num_models: self.models.len(),
            num_lead_times: options.lead_times.len(),
            ensemble_size: self.members.as_ref().map(Vec::len),
            plot_ensemble_mean: options.plot_ensemble_mean,
            include_reference: options.include_reference,
            swap_axes: options.swap_axes,
        }
    }

    fn context(&self, options: &PlotOptions) -> PanelContext {
        let lead_times = options.lead_times.clone();
        let mut context = match &self.members {
            Some(members) => PanelContext::new(lead_times, members.clone()),
            None => PanelContext::deterministic(lead_times),
        }
        .with_step(self.step);
        if let Some(labels) = &self.model_labels {
            context = context.with_model_labels(labels.clone());
        }
        if let Some(label) = &self.reference_label {
            context = context.with_reference_label(label.clone());
        }
        context
    }

    /// Draw `field` into `renderer`.
    pub fn plot<R: PanelRenderer>(
        &self,
        field: &str,
        options: &PlotOptions,
        renderer: &mut R,
    ) -> Result<PlotSummary> {
        let start = Instant::now();

        let plan = self.layout_request(options).resolve()?;
        let context = self.context(options);
        let requests = bind(&plan, &self.models, self.reference.as_deref(), &context)
            .collect::<Result<Vec<PanelRequest>>>()?;

        self.check_field(field, options)?;
        if options.pressure_contour {
            self.check_field(PRESSURE_CONTOUR_FIELD, options)?;
        }

        let scale = self.color_scale(field, options)?;
        debug!(field, scale = ?scale, "Computed color scale");

        let geometries = self
            .models
            .iter()
            .map(|m| Geometry::new(m.coordinates(), &self.grid))
            .collect::<Result<Vec<_>>>()?;
        let reference_geometry = match (&self.reference, options.include_reference) {
            (Some(reference), true) => Some(Geometry::new(reference.coordinates(), &self.grid)?),
            _ => None,
        };

        let prepared = requests
            .par_iter()
            .map(|request| {
                if request.is_empty() {
                    return Ok(None);
                }
                self.prepare(field, request, options, &geometries, reference_geometry.as_ref())
                    .map(Some)
            })
            .collect::<Result<Vec<_>>>()?;

        let figure = FigureHeader {
            shape: plan.panel_shape,
            title: self.time.stamp(),
            colorbar_label: colorbar_label(field),
            scale: scale.clone(),
        };
        renderer.begin_figure(&figure)?;

        let mut rendered = 0;
        let mut empty = 0;
        for (request, panel) in requests.iter().zip(&prepared) {
            match panel {
                None => {
                    renderer.skip_panel(request.row, request.col)?;
                    empty += 1;
                }
                Some(panel) => {
                    renderer.render_panel(&PanelData {
                        request,
                        grid: &panel.grid,
                        coords: &panel.geometry.coords,
                        contour: panel.contour.as_ref(),
                        scale: &scale,
                    })?;
                    rendered += 1;
                }
            }
        }
        renderer.finish_figure()?;

        info!(
            field,
            time = %self.time,
            rows = plan.panel_shape.rows,
            cols = plan.panel_shape.cols,
            panels = rendered,
            empty,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Plotted field"
        );

        Ok(PlotSummary {
            plan,
            scale,
            rendered,
            empty,
        })
    }

    fn check_field(&self, field: &str, options: &PlotOptions) -> Result<()> {
        if let Some(index) = self.models.iter().position(|m| !m.has_field(field)) {
            return Err(PlotError::UnknownField(format!("{} in model {}", field, index)));
        }
        if let (Some(reference), true) = (&self.reference, options.include_reference) {
            if !reference.has_field(field) {
                return Err(PlotError::UnknownField(format!("{} in reference", field)));
            }
        }
        Ok(())
    }

    /// One scale for the whole figure, over all members of every model and
    /// the reference at the plotted lead times.
    fn color_scale(&self, field: &str, options: &PlotOptions) -> Result<ColorScale> {
        if options.norm {
            let boundaries = options
                .boundaries
                .clone()
                .unwrap_or_else(|| DEFAULT_BOUNDARIES.to_vec());
            return ColorScale::discrete(boundaries);
        }

        let mut extent = Extent::default();
        for model in &self.models {
            for &lead_time in &options.lead_times {
                if lead_time >= model.num_lead_times() {
                    return Err(PlotError::out_of_range(
                        Dimension::LeadTime,
                        lead_time,
                        model.num_lead_times(),
                    ));
                }
                for member in 0..model.num_members() {
                    extent.observe(&model.select(field, member, lead_time)?);
                }
            }
        }
        if let (Some(reference), true) = (&self.reference, options.include_reference) {
            for &lead_time in &options.lead_times {
                extent.observe(&reference.select(field, lead_time)?);
            }
        }
        ColorScale::from_extent(&extent)
    }

    fn prepare<'g>(
        &self,
        field: &str,
        request: &PanelRequest,
        options: &PlotOptions,
        geometries: &'g [Geometry],
        reference_geometry: Option<&'g Geometry>,
    ) -> Result<PreparedPanel<'g>> {
        let contour = options.pressure_contour;
        let (coords, geometry, values, pressure) = match request.role {
            PanelRole::Ordinary(selection) => {
                let model = self.model(selection.model)?;
                let select = |name: &str| model.select(name, selection.member, selection.lead_time);
                (
                    model.coordinates(),
                    &geometries[selection.model],
                    select(field)?,
                    contour.then(|| select(PRESSURE_CONTOUR_FIELD)).transpose()?,
                )
            }
            PanelRole::EnsembleMean { model: index, lead_time } => {
                let model = self.model(index)?;
                let mean = |name: &str| model.ensemble_mean(name, lead_time);
                (
                    model.coordinates(),
                    &geometries[index],
                    mean(field)?,
                    contour.then(|| mean(PRESSURE_CONTOUR_FIELD)).transpose()?,
                )
            }
            PanelRole::Reference { lead_time } => {
                let missing = || PlotError::MissingReference {
                    row: request.row,
                    col: request.col,
                };
                let reference = self.reference.as_deref().ok_or_else(missing)?;
                let geometry = reference_geometry.ok_or_else(missing)?;
                let select = |name: &str| reference.select(name, lead_time);
                (
                    reference.coordinates(),
                    geometry,
                    select(field)?,
                    contour.then(|| select(PRESSURE_CONTOUR_FIELD)).transpose()?,
                )
            }
            PanelRole::Empty => {
                return Err(PlotError::render("empty cells carry no data"));
            }
        };

        let radius = self.grid.search_radius;
        let grid = geometry.grid(values, coords, radius)?;
        let contour = pressure
            .map(|p| geometry.grid(p, coords, radius))
            .transpose()?;

        debug!(
            row = request.row,
            col = request.col,
            width = grid.width,
            height = grid.height,
            missing = grid.missing(),
            "Prepared panel"
        );
        Ok(PreparedPanel {
            grid,
            contour,
            geometry,
        })
    }

    fn model(&self, index: usize) -> Result<&M> {
        self.models
            .get(index)
            .ok_or_else(|| PlotError::out_of_range(Dimension::Model, index, self.models.len()))
    }
}

/// `"{field} ({units})"` for catalogued fields, the bare name otherwise.
pub fn colorbar_label(field: &str) -> String {
    match field.parse::<FieldKind>() {
        Ok(kind) => format!("{} ({})", field, kind.units()),
        Err(_) => field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorbar_label() {
        assert_eq!(colorbar_label("air_temperature_2m"), "air_temperature_2m (°C)");
        assert_eq!(colorbar_label("cloud_cover"), "cloud_cover");
    }

    #[test]
    fn test_default_options() {
        let options = PlotOptions::default();
        assert_eq!(options.lead_times, vec![0]);
        assert!(!options.norm && !options.pressure_contour);
    }
}
