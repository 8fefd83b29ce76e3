//! Chart backend: draws a [`RenderPlan`] to a PNG via plotters.
//!
//! Everything upstream of this module is pure data; this is the only place
//! that touches pixels. Any conforming 2-D chart backend could replace it,
//! since the plan carries colors, kinds, and point sequences, nothing
//! plotters-specific.

use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::axis::{legend_labels, LegendLayout, Tick};
use crate::error::{VizError, VizResult};
use crate::stack::{Geometry, RenderPlan};

/// Figure-level options for one rendered balance chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    /// Figure size in pixels
    pub size: (u32, u32),
    pub line_width: u32,
    pub legend: LegendLayout,
    /// Emit legend entries top-down in stack order (bottom band last)
    pub reverse_legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            title: String::new(),
            x_desc: "Date".to_string(),
            y_desc: "Power in MW".to_string(),
            size: (1000, 500),
            line_width: 2,
            legend: LegendLayout::default(),
            reverse_legend: false,
        }
    }
}

fn backend_color(color: crate::style::Color) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

fn render_err<E: std::fmt::Display>(err: E) -> VizError {
    VizError::Render(err.to_string())
}

/// Draws the plan to `path`: stacked inflow bands, outflow lines, the tick
/// row, and the external legend box in the reserved right-hand share.
pub fn render_png(
    plan: &RenderPlan,
    ticks: &[Tick],
    options: &RenderOptions,
    path: &Path,
) -> VizResult<()> {
    let (width, height) = options.size;
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (plot_width, _) = options.legend.split_width(width);
    let (plot_area, legend_area) = root.split_horizontally(plot_width);

    let x_max = plan.position_ceiling().max(1.0);
    let y_max = plan.value_ceiling().max(f64::MIN_POSITIVE) * 1.05;

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(options.title.as_str(), ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(36)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .x_desc(options.x_desc.as_str())
        .y_desc(options.y_desc.as_str())
        .draw()
        .map_err(render_err)?;

    for series in &plan.series {
        let color = backend_color(series.color);
        match &series.geometry {
            Geometry::Band(points) => {
                let mut polygon: Vec<(f64, f64)> =
                    points.iter().map(|p| (p.position, p.top)).collect();
                polygon.extend(points.iter().rev().map(|p| (p.position, p.base)));
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        polygon,
                        color.mix(0.85).filled(),
                    )))
                    .map_err(render_err)?;
            }
            Geometry::Path(points) => {
                chart
                    .draw_series(LineSeries::new(
                        points.iter().map(|p| (p.position, p.value)),
                        color.stroke_width(options.line_width),
                    ))
                    .map_err(render_err)?;
            }
        }
    }

    draw_tick_row(&chart, &plot_area, ticks)?;
    draw_legend(plan, options, &legend_area)?;

    root.present().map_err(render_err)?;
    Ok(())
}

/// Tick marks and labels at the plan's index positions. The mesh's own x
/// labels are disabled because they would not align with the requested
/// positions.
fn draw_tick_row<DB: DrawingBackend>(
    chart: &ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    plot_area: &DrawingArea<DB, Shift>,
    ticks: &[Tick],
) -> VizResult<()> {
    for tick in ticks {
        let (px, py) = chart.backend_coord(&(tick.position as f64, 0.0));
        plot_area
            .draw(&PathElement::new(
                vec![(px, py), (px, py + 5)],
                BLACK.stroke_width(1),
            ))
            .map_err(render_err)?;
        plot_area
            .draw(&Text::new(
                tick.label.clone(),
                (px - 12, py + 8),
                ("sans-serif", 14).into_font(),
            ))
            .map_err(render_err)?;
    }
    Ok(())
}

/// External legend box in the reserved width share: one colored swatch and
/// rewritten label per series.
fn draw_legend<DB: DrawingBackend>(
    plan: &RenderPlan,
    options: &RenderOptions,
    legend_area: &DrawingArea<DB, Shift>,
) -> VizResult<()> {
    let tuple_labels: Vec<String> = plan.series.iter().map(|s| s.key.to_string()).collect();
    let labels = legend_labels(&tuple_labels, &plan.bus, options.reverse_legend);
    let mut colors: Vec<crate::style::Color> = plan.series.iter().map(|s| s.color).collect();
    if options.reverse_legend {
        colors.reverse();
    }

    let row_height = 22i32;
    let top = 40i32;
    for (row, (label, color)) in labels.iter().zip(colors).enumerate() {
        let y = top + row as i32 * row_height;
        legend_area
            .draw(&Rectangle::new(
                [(4, y), (18, y + 12)],
                backend_color(color).filled(),
            ))
            .map_err(render_err)?;
        legend_area
            .draw(&Text::new(label.clone(), (24, y), ("sans-serif", 15).into_font()))
            .map_err(render_err)?;
    }
    Ok(())
}
