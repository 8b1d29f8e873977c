//! SVG output through plotters
//!
//! Each panel is drawn as its own cartesian chart in a sub-area of the
//! figure. SVG output is static, so pickable points are drawn but never
//! report selections.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::backend::RenderBackend;
use super::colormap::colormap_for;
use super::figure::{Figure, Panel, PlotItem, Rgb};
use crate::error::{ChipseqError, Result};
use crate::stats::{finite_range, padded_range};

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const COLORBAR_STEPS: usize = 64;

fn render_err<E: Display>(e: E) -> ChipseqError {
    ChipseqError::Render {
        reason: e.to_string(),
    }
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Writes every presented figure to `{prefix}_{NNN}.svg` in a directory
#[derive(Debug)]
pub struct SvgBackend {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl SvgBackend {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            written: Vec::new(),
        })
    }

    /// Paths written so far, in presentation order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl RenderBackend for SvgBackend {
    fn present(&mut self, figure: &Figure) -> Result<()> {
        let path = self
            .dir
            .join(format!("{}_{:03}.svg", self.prefix, self.written.len()));
        render_svg(figure, &path)?;
        log::info!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Draw a figure to an SVG file
pub fn render_svg(figure: &Figure, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, figure.size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let root = match &figure.title {
        Some(title) => root.titled(title, ("sans-serif", 20)).map_err(render_err)?,
        None => root,
    };

    for panel in &figure.panels {
        let area = panel_area(&root, panel);
        draw_panel(&area, panel)?;
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// Sub-area for a panel; rect fractions are measured from the bottom left
fn panel_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panel: &Panel,
) -> DrawingArea<DB, Shift> {
    let (w, h) = root.dim_in_pixel();
    let (w, h) = (w as f64, h as f64);
    let r = panel.rect;
    let left = (r.left * w).round() as i32;
    let top = ((1.0 - r.bottom - r.height) * h).round() as i32;
    let width = (r.width * w).round().max(1.0) as i32;
    let height = (r.height * h).round().max(1.0) as i32;
    root.clone().shrink((left, top), (width, height))
}

/// Data ranges covering every item in the panel
fn item_ranges(panel: &Panel) -> ((f64, f64), (f64, f64)) {
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    for item in &panel.items {
        match item {
            PlotItem::Image { extent, .. } => {
                xs.extend([extent.x_min, extent.x_max]);
                ys.extend([extent.y_min, extent.y_max]);
            }
            PlotItem::Colorbar { min, max, .. } => {
                xs.extend([0.0, 1.0]);
                ys.extend([*min, *max]);
            }
            PlotItem::Line { x, y, .. } | PlotItem::Points { x, y, .. } => {
                xs.extend(x);
                ys.extend(y);
            }
            PlotItem::GeneModels { genes } => {
                xs.extend(genes.iter().flat_map(|g| [g.start as f64, g.end as f64]));
                ys.extend([0.0, genes.len().max(1) as f64]);
            }
        }
    }
    let x = panel.x_range.unwrap_or_else(|| padded_range(finite_range(&xs)));
    let y = panel.y_range.unwrap_or_else(|| padded_range(finite_range(&ys)));
    (x, y)
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<()> {
    let ((x0, x1), (y0, y1)) = item_ranges(panel);

    let x_area = if panel.x_ticks || panel.x_label.is_some() { 35 } else { 5 };
    let y_area = if panel.y_ticks || panel.y_label.is_some() { 50 } else { 5 };

    let mut chart = ChartBuilder::on(area)
        .margin(4)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    let integer_ticks = |v: &f64| format!("{:.0}", v);
    let plain_ticks = |v: &f64| format!("{}", v);

    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh();
        if panel.x_ticks {
            if panel.integer_x_ticks {
                mesh.x_label_formatter(&integer_ticks);
            } else {
                mesh.x_label_formatter(&plain_ticks);
            }
        } else {
            mesh.x_labels(0);
        }
        if !panel.y_ticks {
            mesh.y_labels(0);
        }
        if let Some(label) = &panel.x_label {
            mesh.x_desc(label.as_str());
        }
        if let Some(label) = &panel.y_label {
            mesh.y_desc(label.as_str());
        }
        mesh.draw().map_err(render_err)?;
    }

    let mut labeled = false;
    for item in &panel.items {
        labeled |= draw_item(&mut chart, item)?;
    }

    if panel.legend && labeled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

/// Draw one item; returns true if it added a legend entry
fn draw_item<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, item: &PlotItem) -> Result<bool> {
    match item {
        PlotItem::Image {
            data,
            extent,
            options,
        } => {
            let (n_rows, n_cols) = data.dim();
            if n_rows == 0 || n_cols == 0 {
                return Ok(false);
            }
            let (v_min, v_max) = padded_range(finite_range(data.iter()));
            let cmap = colormap_for(options, v_min, v_max);
            let dx = (extent.x_max - extent.x_min) / n_cols as f64;
            let dy = (extent.y_max - extent.y_min) / n_rows as f64;

            // Row 0 at the top
            let cells = data.indexed_iter().map(|((r, c), &v)| {
                let x = extent.x_min + c as f64 * dx;
                let y = extent.y_max - r as f64 * dy;
                Rectangle::new([(x, y - dy), (x + dx, y)], rgb(cmap.rgb(v)).filled())
            });
            chart.draw_series(cells).map_err(render_err)?;
            Ok(false)
        }
        PlotItem::Colorbar { min, max, options } => {
            let cmap = colormap_for(options, *min, *max);
            let step = (max - min) / COLORBAR_STEPS as f64;
            let stripes = (0..COLORBAR_STEPS).map(|i| {
                let lo = min + step * i as f64;
                Rectangle::new(
                    [(0.0, lo), (1.0, lo + step)],
                    rgb(cmap.rgb(lo + step / 2.0)).filled(),
                )
            });
            chart.draw_series(stripes).map_err(render_err)?;
            Ok(false)
        }
        PlotItem::Line { x, y, style } => {
            let color = rgb(style.color);
            let points: Vec<(f64, f64)> = x
                .iter()
                .zip(y)
                .filter(|(a, b)| a.is_finite() && b.is_finite())
                .map(|(&a, &b)| (a, b))
                .collect();
            let series = chart
                .draw_series(LineSeries::new(points, color.stroke_width(style.width)))
                .map_err(render_err)?;
            match &style.label {
                Some(label) => {
                    series
                        .label(label.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        PlotItem::Points { x, y, style, .. } => {
            let color = rgb(style.color);
            let size = style.size as i32;
            chart
                .draw_series(
                    x.iter()
                        .zip(y)
                        .map(|(&a, &b)| Circle::new((a, b), size, color.filled())),
                )
                .map_err(render_err)?;
            Ok(false)
        }
        PlotItem::GeneModels { genes } => {
            for (lane, gene) in genes.iter().enumerate() {
                let y = lane as f64 + 0.5;
                let (start, end) = (gene.start as f64, gene.end as f64);
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        vec![(start, y), (end, y)],
                        BLACK.stroke_width(1),
                    )))
                    .map_err(render_err)?;
                chart
                    .draw_series(gene.exons.iter().map(|&(s, e)| {
                        Rectangle::new([(s as f64, y - 0.25), (e as f64, y + 0.25)], BLACK.filled())
                    }))
                    .map_err(render_err)?;
                chart
                    .draw_series(std::iter::once(Text::new(
                        format!("{} ({})", gene.label(), gene.strand.symbol()),
                        (start, y + 0.45),
                        ("sans-serif", 12).into_font(),
                    )))
                    .map_err(render_err)?;
            }
            Ok(false)
        }
    }
}
