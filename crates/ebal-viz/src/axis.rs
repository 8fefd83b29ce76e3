//! Datetime axis ticks and legend layout.

use ebal_core::{NodeLabel, TimeIndex};
use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};

/// Tick placement: either a fixed step between ticks or a desired total
/// count with evenly computed spacing. Exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickSpec {
    /// Fixed step between ticks, in index positions
    Distance(usize),
    /// Desired number of ticks; spacing becomes `len / count`
    Count(usize),
}

/// One axis tick: index position plus formatted timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub position: usize,
    pub label: String,
}

/// Computes tick positions and labels over `index`.
///
/// `offset` shifts the first tick by that many positions, e.g. offset 12
/// with distance 24 centers a daily tick under an hourly series. Positions
/// are strictly increasing and stay within `[0, len - 1]`.
pub fn ticks(index: &TimeIndex, spec: TickSpec, format: &str, offset: usize) -> VizResult<Vec<Tick>> {
    if index.is_empty() {
        return Err(VizError::EmptyIndex);
    }
    let distance = match spec {
        TickSpec::Distance(0) | TickSpec::Count(0) => return Err(VizError::ZeroTickDistance),
        TickSpec::Distance(distance) => distance,
        TickSpec::Count(count) => (index.len() / count).max(1),
    };

    let mut marks = Vec::new();
    let mut position = offset;
    while position < index.len() {
        let stamp = index.get(position).ok_or(VizError::EmptyIndex)?;
        marks.push(Tick {
            position,
            label: stamp.format(format).to_string(),
        });
        position += distance;
    }
    Ok(marks)
}

/// Optional-pair entry point for callers arriving from configuration:
/// both-or-neither of `distance`/`count` is a programming error and
/// surfaces immediately as [`VizError::AmbiguousTickSpec`].
pub fn ticks_opt(
    index: &TimeIndex,
    distance: Option<usize>,
    count: Option<usize>,
    format: &str,
    offset: usize,
) -> VizResult<Vec<Tick>> {
    let spec = match (distance, count) {
        (Some(distance), None) => TickSpec::Distance(distance),
        (None, Some(count)) => TickSpec::Count(count),
        _ => return Err(VizError::AmbiguousTickSpec),
    };
    ticks(index, spec, format, offset)
}

/// Rewrites flow tuple labels into compact endpoint names.
///
/// `(('electricity', 'demand'), flow)` with bus `electricity` becomes
/// `demand`: parentheses, quotes, the trailing flow marker, the bus text,
/// commas, and spaces are all stripped. With `reverse` the sequence is
/// emitted back-to-front so a bottom-up stack matches a top-down legend.
pub fn legend_labels(labels: &[String], bus: &NodeLabel, reverse: bool) -> Vec<String> {
    let mut rewritten: Vec<String> = labels
        .iter()
        .map(|label| {
            label
                .replace('(', "")
                .replace('\'', "")
                .replace("), flow)", "")
                .replace(bus.as_str(), "")
                .replace(',', "")
                .replace(' ', "")
        })
        .collect();
    if reverse {
        rewritten.reverse();
    }
    rewritten
}

/// Layout directive reserving horizontal space for an external legend box.
///
/// This is data, not a side effect: the caller applies the split to its
/// own drawing area, exactly once. Applying it twice compounds the
/// shrink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendLayout {
    /// Fraction of the total width kept for the plotting area
    pub plotshare: f64,
}

impl Default for LegendLayout {
    fn default() -> Self {
        LegendLayout { plotshare: 0.9 }
    }
}

impl LegendLayout {
    pub fn new(plotshare: f64) -> Self {
        LegendLayout { plotshare }
    }

    /// Splits a total pixel width into (plot, legend) widths.
    pub fn split_width(&self, width: u32) -> (u32, u32) {
        let plot = (f64::from(width) * self.plotshare).round() as u32;
        let plot = plot.min(width);
        (plot, width - plot)
    }
}
