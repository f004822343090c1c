//! Composition of panels into a single figure image.
//!
//! The plot driver hands a [`PanelRenderer`] one call per figure and one
//! call per cell, always in row-major order. [`FigureRenderer`] draws those
//! calls onto an RGBA canvas and records what went where in a
//! [`FigureManifest`] that is saved next to the PNG.

use std::fs;
use std::path::{Path, PathBuf};

use field_common::{ColorScale, PlotError, Result};
use grid_processor::{resample_grid, CoordinateGrids, Grid2D, InterpolationMethod};
use image::{imageops, ImageBuffer, ImageFormat, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use panel_layout::{PanelRequest, PanelRole, PanelShape};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contour::{draw_contours, ContourConfig};
use crate::gradient::{colorbar_strip, colorbar_ticks, render_grid, Color, ColorRamp};
use crate::style::FigureStyle;
use crate::text::LabelFont;

/// Figure-wide information known before the first panel is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureHeader {
    pub shape: PanelShape,
    pub title: String,
    pub colorbar_label: String,
    /// Shared by every panel of the figure.
    pub scale: ColorScale,
}

/// Everything needed to draw one non-empty cell.
#[derive(Debug, Clone, Copy)]
pub struct PanelData<'a> {
    pub request: &'a PanelRequest,
    /// Field values, top row north.
    pub grid: &'a Grid2D,
    pub coords: &'a CoordinateGrids,
    /// Sea-level pressure to draw as isobars over the field.
    pub contour: Option<&'a Grid2D>,
    pub scale: &'a ColorScale,
}

/// Sink for the panels of a figure.
pub trait PanelRenderer {
    fn begin_figure(&mut self, figure: &FigureHeader) -> Result<()>;

    fn render_panel(&mut self, panel: &PanelData<'_>) -> Result<()>;

    /// Called for cells past the last data-bearing panel.
    fn skip_panel(&mut self, _row: usize, _col: usize) -> Result<()> {
        Ok(())
    }

    fn finish_figure(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Where and what each panel of a saved figure is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub row: usize,
    pub col: usize,
    pub role: PanelRole,
    pub top_label: Option<String>,
    pub left_label: Option<String>,
    /// Pixel rectangle of the panel in the figure image.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// `[min_lat, max_lat, min_lon, max_lon]` of the panel grid.
    pub bounds: Option<[f64; 4]>,
    /// Grid cells without data.
    pub missing: usize,
}

/// Sidecar description of a figure image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureManifest {
    pub title: String,
    pub colorbar_label: String,
    pub scale: ColorScale,
    pub rows: usize,
    pub cols: usize,
    pub width: u32,
    pub height: u32,
    pub panels: Vec<PanelEntry>,
}

/// Pixel geometry of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FigureLayout {
    left: u32,
    top: u32,
    cell_width: u32,
    cell_height: u32,
    colorbar_x: u32,
    width: u32,
    height: u32,
}

impl FigureLayout {
    fn new(style: &FigureStyle, shape: PanelShape) -> Self {
        let left = style.spacing + style.label_width;
        let top = style.title_height;
        let cell_width = style.panel_width + style.spacing;
        let cell_height = style.label_height + style.panel_height + style.spacing;
        let colorbar_x = left + shape.cols as u32 * cell_width;
        Self {
            left,
            top,
            cell_width,
            cell_height,
            colorbar_x,
            width: colorbar_x + style.colorbar_width + style.colorbar_margin,
            height: top + shape.rows as u32 * cell_height + style.spacing,
        }
    }

    /// Top-left pixel of the panel at `(row, col)`.
    fn panel_origin(&self, style: &FigureStyle, row: usize, col: usize) -> (u32, u32) {
        (
            self.left + col as u32 * self.cell_width,
            self.top + row as u32 * self.cell_height + style.label_height,
        )
    }
}

struct Figure {
    layout: FigureLayout,
    canvas: RgbaImage,
    manifest: FigureManifest,
}

/// Draws panels onto one RGBA image with a title and a vertical colorbar.
pub struct FigureRenderer {
    style: FigureStyle,
    ramp: ColorRamp,
    contour: ContourConfig,
    resample: InterpolationMethod,
    font: Option<LabelFont>,
    figure: Option<Figure>,
}

impl FigureRenderer {
    pub fn new(style: FigureStyle, ramp: ColorRamp) -> Self {
        let contour = style.contour_config();
        Self {
            style,
            ramp,
            contour,
            resample: InterpolationMethod::default(),
            font: None,
            figure: None,
        }
    }

    /// Font for titles and labels; without one the figure has no text.
    pub fn with_font(mut self, font: Option<LabelFont>) -> Self {
        self.font = font;
        self
    }

    pub fn with_resample(mut self, method: InterpolationMethod) -> Self {
        self.resample = method;
        self
    }

    /// The figure drawn so far.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.figure.as_ref().map(|f| &f.canvas)
    }

    pub fn manifest(&self) -> Option<&FigureManifest> {
        self.figure.as_ref().map(|f| &f.manifest)
    }

    /// Save the figure as PNG and its manifest as JSON with the same stem.
    /// Returns the manifest path.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        let figure = self
            .figure
            .as_ref()
            .ok_or_else(|| PlotError::render("no figure has been drawn"))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PlotError::render(format!("{}: {}", parent.display(), e)))?;
        }
        figure
            .canvas
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| PlotError::render(format!("failed to write {}: {}", path.display(), e)))?;

        let manifest_path = path.with_extension("json");
        let json = serde_json::to_string_pretty(&figure.manifest)
            .map_err(|e| PlotError::render(e.to_string()))?;
        fs::write(&manifest_path, json).map_err(|e| {
            PlotError::render(format!("failed to write {}: {}", manifest_path.display(), e))
        })?;

        info!(
            image = %path.display(),
            manifest = %manifest_path.display(),
            "Saved figure"
        );
        Ok(manifest_path)
    }

    fn draw_title(&self, canvas: &mut RgbaImage, title: &str) {
        if let Some(font) = &self.font {
            let size = self.style.title_font_size;
            let (_, h) = font.measure(title, size);
            let y = (self.style.title_height.saturating_sub(h) / 2) as i32;
            let cx = canvas.width() as i32 / 2;
            font.draw_centered(canvas, title, cx, y, size, Color::BLACK);
        }
    }

    fn draw_colorbar(&self, canvas: &mut RgbaImage, layout: &FigureLayout, figure: &FigureHeader) {
        let style = &self.style;
        let bar_top = layout.top + style.label_height;
        let bar_height = (figure.shape.rows as u32 * layout.cell_height)
            .saturating_sub(style.label_height + style.spacing)
            .max(2);
        let bar_x = layout.colorbar_x;

        let strip = colorbar_strip(&figure.scale, &self.ramp, style.colorbar_width, bar_height);
        imageops::overlay(canvas, &strip, bar_x as i64, bar_top as i64);
        draw_hollow_rect_mut(
            canvas,
            Rect::at(bar_x as i32, bar_top as i32).of_size(style.colorbar_width, bar_height),
            Color::BLACK.to_rgba(),
        );

        let bar_right = (bar_x + style.colorbar_width) as f32;
        for (value, pos) in colorbar_ticks(&figure.scale, style.colorbar_ticks) {
            let y = bar_top as f32 + (1.0 - pos) * (bar_height - 1) as f32;
            draw_line_segment_mut(
                canvas,
                (bar_right, y),
                (bar_right + 4.0, y),
                Color::BLACK.to_rgba(),
            );
            if let Some(font) = &self.font {
                let text = format_tick(value);
                let (_, h) = font.measure(&text, style.font_size);
                font.draw(
                    canvas,
                    &text,
                    bar_right as i32 + 6,
                    y as i32 - h as i32 / 2,
                    style.font_size,
                    Color::BLACK,
                );
            }
        }

        if let Some(font) = &self.font {
            let (_, h) = font.measure(&figure.colorbar_label, style.font_size);
            let x = layout.width.saturating_sub(h + style.spacing) as i32;
            let cy = (bar_top + bar_height / 2) as i32;
            font.draw_vertical(canvas, &figure.colorbar_label, x, cy, style.font_size, Color::BLACK);
        }
    }
}

impl PanelRenderer for FigureRenderer {
    fn begin_figure(&mut self, figure: &FigureHeader) -> Result<()> {
        let layout = FigureLayout::new(&self.style, figure.shape);
        let background = self.style.background_color()?;
        let mut canvas = ImageBuffer::from_pixel(layout.width, layout.height, background.to_rgba());

        self.draw_title(&mut canvas, &figure.title);
        self.draw_colorbar(&mut canvas, &layout, figure);

        debug!(
            rows = figure.shape.rows,
            cols = figure.shape.cols,
            width = layout.width,
            height = layout.height,
            "Started figure"
        );

        self.figure = Some(Figure {
            layout,
            canvas,
            manifest: FigureManifest {
                title: figure.title.clone(),
                colorbar_label: figure.colorbar_label.clone(),
                scale: figure.scale.clone(),
                rows: figure.shape.rows,
                cols: figure.shape.cols,
                width: layout.width,
                height: layout.height,
                panels: Vec::new(),
            },
        });
        Ok(())
    }

    fn render_panel(&mut self, panel: &PanelData<'_>) -> Result<()> {
        let style = &self.style;
        let figure = self
            .figure
            .as_mut()
            .ok_or_else(|| PlotError::render("panel rendered before the figure was started"))?;

        let request = panel.request;
        let (x, y) = figure.layout.panel_origin(style, request.row, request.col);
        let (w, h) = (style.panel_width, style.panel_height);

        let scaled = resample_grid(panel.grid, w as usize, h as usize, self.resample);
        let mut tile = render_grid(&scaled, panel.scale, &self.ramp);
        if let Some(contour) = panel.contour {
            draw_contours(&mut tile, contour, &self.contour);
        }

        let canvas = &mut figure.canvas;
        imageops::overlay(canvas, &tile, x as i64, y as i64);
        draw_hollow_rect_mut(
            canvas,
            Rect::at(x as i32 - 1, y as i32 - 1).of_size(w + 2, h + 2),
            Color::BLACK.to_rgba(),
        );

        if let Some(font) = &self.font {
            if let Some(label) = &request.top_label {
                let (_, th) = font.measure(label, style.font_size);
                let ty = y as i32 - th as i32 - 4;
                font.draw_centered(canvas, label, (x + w / 2) as i32, ty, style.font_size, Color::BLACK);
            }
            if let Some(label) = &request.left_label {
                let lx = x as i32 - style.label_width as i32;
                font.draw_vertical(canvas, label, lx, (y + h / 2) as i32, style.font_size, Color::BLACK);
            }
        }

        figure.manifest.panels.push(PanelEntry {
            row: request.row,
            col: request.col,
            role: request.role,
            top_label: request.top_label.clone(),
            left_label: request.left_label.clone(),
            x,
            y,
            width: w,
            height: h,
            bounds: panel.coords.bounds().map(|(a, b, c, d)| [a, b, c, d]),
            missing: panel.grid.missing(),
        });

        debug!(
            row = request.row,
            col = request.col,
            role = ?request.role,
            missing = panel.grid.missing(),
            "Rendered panel"
        );
        Ok(())
    }

    fn skip_panel(&mut self, row: usize, col: usize) -> Result<()> {
        debug!(row, col, "Skipped empty panel");
        Ok(())
    }

    fn finish_figure(&mut self) -> Result<()> {
        let figure = self
            .figure
            .as_ref()
            .ok_or_else(|| PlotError::render("figure finished before it was started"))?;
        info!(
            title = %figure.manifest.title,
            panels = figure.manifest.panels.len(),
            width = figure.layout.width,
            height = figure.layout.height,
            "Figure complete"
        );
        Ok(())
    }
}

/// Colorbar tick text: fewer decimals for larger values.
pub fn format_tick(value: f32) -> String {
    let magnitude = value.abs();
    if magnitude >= 100.0 || value.fract() == 0.0 {
        format!("{:.0}", value)
    } else if magnitude >= 1.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}
