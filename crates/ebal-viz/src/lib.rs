//! # ebal-viz: Bus-Balance Chart Composition
//!
//! Turns a partitioned bus balance into a rendered stacked chart:
//!
//! 1. [`resolve`] fixes draw order and colors (explicit overrides first,
//!    deterministic palette fallback after)
//! 2. [`compose`] stacks the inflows into cumulative area bands and leaves
//!    the outflows as independent lines, under a [`SmoothingPolicy`]
//! 3. [`ticks`] / [`legend_labels`] lay out the datetime axis and legend
//! 4. [`render_png`] hands the finished [`RenderPlan`] to plotters
//!
//! Steps 1–3 are pure: same inputs, same outputs, no drawing. Only the
//! render module touches a backend, and [`io_plot`] wires the whole chain
//! for the common one-bus case.

pub mod axis;
pub mod error;
pub mod plot;
pub mod render;
pub mod resolve;
pub mod stack;
pub mod style;

pub use axis::{legend_labels, ticks, ticks_opt, LegendLayout, Tick, TickSpec};
pub use error::{VizError, VizResult};
pub use plot::{io_plot, PlotSpec};
pub use render::{render_png, RenderOptions};
pub use resolve::{resolve, ResolvedBalance};
pub use stack::{compose, Geometry, RenderKind, RenderPlan, RenderSeries, SmoothingPolicy};
pub use style::{Color, OrderSpec, StyleSpec, DEFAULT_PALETTE};
