//! Figure rendering for forecast panel plots.
//!
//! - Colour ramps mapped through a shared [`ColorScale`](field_common::ColorScale)
//! - Pressure contour overlay (marching squares)
//! - Panel composition with titles, row labels and a colorbar
//! - The plot driver, [`FieldPlotter`], which runs layout, binding,
//!   regridding and rendering for one field
//!
//! # Example
//!
//! ```no_run
//! use field_common::{ForecastTime, LatLonUnits};
//! use grid_processor::EnsembleDataset;
//! use renderer::{FieldPlotter, FigureRenderer, FigureStyle, PlotOptions};
//!
//! let model = EnsembleDataset::load("forecast.json".as_ref(), LatLonUnits::Deg)?;
//! let time = ForecastTime::parse("2024-05-01T06")?;
//! let plotter = FieldPlotter::new(vec![model], time);
//!
//! let style = FigureStyle::default();
//! let ramp = style.ramp_for("air_temperature_2m")?;
//! let mut figure = FigureRenderer::new(style, ramp);
//! let options = PlotOptions { lead_times: vec![0, 4, 8], ..PlotOptions::default() };
//! plotter.plot("air_temperature_2m", &options, &mut figure)?;
//! figure.save("t2m.png".as_ref())?;
//! # Ok::<(), field_common::PlotError>(())
//! ```

pub mod contour;
pub mod figure;
pub mod gradient;
pub mod plot;
pub mod style;
pub mod text;

pub use contour::{draw_contours, generate_contour_levels, march_squares, ContourConfig};
pub use figure::{
    FigureHeader, FigureManifest, FigureRenderer, PanelData, PanelEntry, PanelRenderer,
};
pub use gradient::{render_grid, Color, ColorRamp};
pub use plot::{FieldPlotter, PlotOptions, PlotSummary};
pub use style::FigureStyle;
pub use text::LabelFont;
