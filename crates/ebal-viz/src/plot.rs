//! One-call balance plot: slice, partition, resolve, compose, render.

use std::path::Path;

use ebal_core::{partition, slice, FlowTable, NodeLabel, TimeWindow};
use serde::{Deserialize, Serialize};

use crate::axis::{ticks, TickSpec};
use crate::error::VizResult;
use crate::render::{render_png, RenderOptions};
use crate::resolve::resolve;
use crate::stack::{compose, RenderPlan, SmoothingPolicy};
use crate::style::{OrderSpec, StyleSpec};

/// Everything configurable about one bus-balance figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    /// Optional sub-window of the table's horizon
    pub window: Option<TimeWindow>,
    pub order: OrderSpec,
    pub style: StyleSpec,
    pub policy: SmoothingPolicy,
    pub tick_spec: TickSpec,
    pub tick_format: String,
    pub tick_offset: usize,
    pub options: RenderOptions,
}

impl Default for PlotSpec {
    fn default() -> Self {
        PlotSpec {
            window: None,
            order: OrderSpec::default(),
            style: StyleSpec::default(),
            policy: SmoothingPolicy::Step,
            tick_spec: TickSpec::Count(6),
            tick_format: "%d-%m-%H".to_string(),
            tick_offset: 0,
            options: RenderOptions::default(),
        }
    }
}

/// Renders the balance of `bus` to a PNG at `out` and returns the plan.
///
/// Either the complete figure is written or an error is returned before
/// anything is drawn; a failed call leaves no partial output behind the
/// caller's back.
pub fn io_plot(
    table: &FlowTable,
    bus: &NodeLabel,
    spec: &PlotSpec,
    out: &Path,
) -> VizResult<RenderPlan> {
    let sliced;
    let table = match &spec.window {
        Some(window) => {
            sliced = slice(table, window)?;
            &sliced
        }
        None => table,
    };

    let view = partition(table, bus)?;
    let resolved = resolve(&view, &spec.order, &spec.style);
    let plan = compose(table, &resolved, spec.policy)?;
    let marks = ticks(table.index(), spec.tick_spec, &spec.tick_format, spec.tick_offset)?;
    render_png(&plan, &marks, &spec.options, out)?;
    Ok(plan)
}
