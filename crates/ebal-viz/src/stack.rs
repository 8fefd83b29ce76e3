//! Composing ordered, colored flows into a renderable plan.
//!
//! Inflows become a cumulative stack of area bands; outflows stay
//! independent lines so their magnitudes remain readable against the
//! stack. The plan carries geometry only; pixel drawing lives in
//! [`crate::render`].

use chrono::{DateTime, Utc};
use ebal_core::{FlowKey, FlowTable, NodeLabel};
use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};
use crate::resolve::ResolvedBalance;
use crate::style::Color;

/// How samples are projected into drawable points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmoothingPolicy {
    /// Hold each sample until the next timestamp. Quantity-exact: the
    /// drawn stack height equals the summed inflows at every point.
    #[default]
    Step,
    /// Straight lines between sample points. Exact at the samples only;
    /// a rendering nicety, never a data correction.
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderKind {
    Area,
    Line,
}

/// One projected point of a stacked band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSample {
    pub stamp: DateTime<Utc>,
    /// Index-position coordinate on the x axis
    pub position: f64,
    pub base: f64,
    pub top: f64,
}

/// One projected point of an outflow line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    pub stamp: DateTime<Utc>,
    pub position: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Band(Vec<BandSample>),
    Path(Vec<PathSample>),
}

/// A single series of the plan: color, kind, and points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSeries {
    pub key: FlowKey,
    pub color: Color,
    pub geometry: Geometry,
}

impl RenderSeries {
    pub fn kind(&self) -> RenderKind {
        match self.geometry {
            Geometry::Band(_) => RenderKind::Area,
            Geometry::Path(_) => RenderKind::Line,
        }
    }
}

/// Complete, internally consistent drawing instructions for one bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub bus: NodeLabel,
    pub policy: SmoothingPolicy,
    /// Stacked inflow bands (bottom first), then outflow lines
    pub series: Vec<RenderSeries>,
    /// The sample timestamps the geometry was projected from
    pub stamps: Vec<DateTime<Utc>>,
}

impl RenderPlan {
    /// Largest drawn y value, for axis scaling.
    pub fn value_ceiling(&self) -> f64 {
        let mut ceiling = 0.0f64;
        for series in &self.series {
            match &series.geometry {
                Geometry::Band(points) => {
                    for p in points {
                        ceiling = ceiling.max(p.top);
                    }
                }
                Geometry::Path(points) => {
                    for p in points {
                        ceiling = ceiling.max(p.value);
                    }
                }
            }
        }
        ceiling
    }

    /// Rightmost x position (index coordinate).
    pub fn position_ceiling(&self) -> f64 {
        self.stamps.len().saturating_sub(1) as f64
    }
}

/// Builds the render plan for one resolved bus balance.
///
/// The k-th inflow band sits on the running sum of bands `0..k`, so bands
/// never overlap and the stack top equals the inflow sum: exactly under
/// [`SmoothingPolicy::Step`], and at sample timestamps under
/// [`SmoothingPolicy::Smooth`]. Any missing series or color aborts before a
/// plan is produced.
pub fn compose(
    table: &FlowTable,
    resolved: &ResolvedBalance,
    policy: SmoothingPolicy,
) -> VizResult<RenderPlan> {
    let stamps = table.index().as_slice();
    let n = stamps.len();

    let mut series = Vec::with_capacity(resolved.ordered_in.len() + resolved.ordered_out.len());
    let mut running = vec![0.0f64; n];

    for key in &resolved.ordered_in {
        let values = fetch(table, key)?;
        let color = color_of(resolved, key)?;
        let base = running.clone();
        for (sum, value) in running.iter_mut().zip(values) {
            *sum += value;
        }
        let band = match policy {
            SmoothingPolicy::Step => step_band(stamps, &base, &running),
            SmoothingPolicy::Smooth => smooth_band(stamps, &base, &running),
        };
        series.push(RenderSeries {
            key: key.clone(),
            color,
            geometry: Geometry::Band(band),
        });
    }

    for key in &resolved.ordered_out {
        let values = fetch(table, key)?;
        let color = color_of(resolved, key)?;
        let path = match policy {
            SmoothingPolicy::Step => step_path(stamps, values),
            SmoothingPolicy::Smooth => smooth_path(stamps, values),
        };
        series.push(RenderSeries {
            key: key.clone(),
            color,
            geometry: Geometry::Path(path),
        });
    }

    Ok(RenderPlan {
        bus: resolved.bus.clone(),
        policy,
        series,
        stamps: stamps.to_vec(),
    })
}

fn fetch<'t>(table: &'t FlowTable, key: &FlowKey) -> VizResult<&'t [f64]> {
    table
        .get(key)
        .ok_or_else(|| VizError::MissingSeries(key.clone()))
}

fn color_of(resolved: &ResolvedBalance, key: &FlowKey) -> VizResult<Color> {
    resolved
        .colors
        .get(key)
        .copied()
        .ok_or_else(|| VizError::MissingColor(key.clone()))
}

/// Each sample held flat until the next timestamp.
fn step_band(stamps: &[DateTime<Utc>], base: &[f64], top: &[f64]) -> Vec<BandSample> {
    let mut points = Vec::with_capacity(stamps.len().saturating_mul(2));
    for i in 0..stamps.len() {
        points.push(BandSample {
            stamp: stamps[i],
            position: i as f64,
            base: base[i],
            top: top[i],
        });
        if i + 1 < stamps.len() {
            points.push(BandSample {
                stamp: stamps[i + 1],
                position: (i + 1) as f64,
                base: base[i],
                top: top[i],
            });
        }
    }
    points
}

fn smooth_band(stamps: &[DateTime<Utc>], base: &[f64], top: &[f64]) -> Vec<BandSample> {
    stamps
        .iter()
        .enumerate()
        .map(|(i, stamp)| BandSample {
            stamp: *stamp,
            position: i as f64,
            base: base[i],
            top: top[i],
        })
        .collect()
}

fn step_path(stamps: &[DateTime<Utc>], values: &[f64]) -> Vec<PathSample> {
    let mut points = Vec::with_capacity(stamps.len().saturating_mul(2));
    for i in 0..stamps.len() {
        points.push(PathSample {
            stamp: stamps[i],
            position: i as f64,
            value: values[i],
        });
        if i + 1 < stamps.len() {
            points.push(PathSample {
                stamp: stamps[i + 1],
                position: (i + 1) as f64,
                value: values[i],
            });
        }
    }
    points
}

fn smooth_path(stamps: &[DateTime<Utc>], values: &[f64]) -> Vec<PathSample> {
    stamps
        .iter()
        .enumerate()
        .map(|(i, stamp)| PathSample {
            stamp: *stamp,
            position: i as f64,
            value: values[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;
    use crate::style::{OrderSpec, StyleSpec};
    use chrono::TimeZone;
    use ebal_core::{partition, FlowSeries, TimeIndex};

    const TOLERANCE: f64 = 1e-9;

    fn scenario_table() -> FlowTable {
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let mut table = FlowTable::new(TimeIndex::hourly(start, 3));
        table
            .insert(FlowSeries::new(FlowKey::new("a", "bus"), vec![1.0, 2.0, 3.0]))
            .unwrap();
        table
            .insert(FlowSeries::new(FlowKey::new("b", "bus"), vec![4.0, 5.0, 6.0]))
            .unwrap();
        table
            .insert(FlowSeries::new(FlowKey::new("bus", "c"), vec![2.0, 2.0, 2.0]))
            .unwrap();
        table
    }

    fn plan_for(policy: SmoothingPolicy) -> RenderPlan {
        let table = scenario_table();
        let view = partition(&table, &"bus".into()).unwrap();
        let resolved = resolve(&view, &OrderSpec::default(), &StyleSpec::default());
        compose(&table, &resolved, policy).unwrap()
    }

    fn band(series: &RenderSeries) -> &[BandSample] {
        match &series.geometry {
            Geometry::Band(points) => points,
            Geometry::Path(_) => panic!("expected a band"),
        }
    }

    #[test]
    fn step_stack_top_equals_inflow_sum_everywhere() {
        let plan = plan_for(SmoothingPolicy::Step);
        let last_band = band(&plan.series[1]);
        // Sums per sample: 1+4, 2+5, 3+6; every projected point of the top
        // boundary carries the sum of the sample it was held from.
        assert_eq!(last_band.len(), 5);
        let tops: Vec<f64> = last_band.iter().map(|p| p.top).collect();
        for (expected, got) in [5.0, 5.0, 7.0, 7.0, 9.0].iter().zip(&tops) {
            assert!((expected - got).abs() < TOLERANCE);
        }
    }

    #[test]
    fn step_stack_top_at_t1_is_seven() {
        let plan = plan_for(SmoothingPolicy::Step);
        let last_band = band(&plan.series[1]);
        let at_t1 = last_band
            .iter()
            .find(|p| p.position == 1.0 && p.top != 5.0)
            .unwrap();
        assert!((at_t1.top - 7.0).abs() < TOLERANCE);
    }

    #[test]
    fn bands_do_not_overlap() {
        let plan = plan_for(SmoothingPolicy::Step);
        let first = band(&plan.series[0]);
        let second = band(&plan.series[1]);
        for (lower, upper) in first.iter().zip(second.iter()) {
            assert!(lower.top <= upper.base + TOLERANCE);
            assert!(upper.base <= upper.top + TOLERANCE);
        }
    }

    #[test]
    fn smooth_is_exact_at_sample_points() {
        let plan = plan_for(SmoothingPolicy::Smooth);
        let last_band = band(&plan.series[1]);
        assert_eq!(last_band.len(), 3);
        let sums = [5.0, 7.0, 9.0];
        for (point, sum) in last_band.iter().zip(sums) {
            assert!((point.top - sum).abs() < TOLERANCE);
        }
    }

    #[test]
    fn outflows_are_lines_not_bands() {
        let plan = plan_for(SmoothingPolicy::Step);
        let outflow = &plan.series[2];
        assert_eq!(outflow.kind(), RenderKind::Line);
        assert_eq!(outflow.key, FlowKey::new("bus", "c"));
    }

    #[test]
    fn missing_series_aborts_composition() {
        let table = scenario_table();
        let view = partition(&table, &"bus".into()).unwrap();
        let mut resolved = resolve(&view, &OrderSpec::default(), &StyleSpec::default());
        resolved.ordered_in.push(FlowKey::new("ghost", "bus"));
        let err = compose(&table, &resolved, SmoothingPolicy::Step).unwrap_err();
        assert!(matches!(err, VizError::MissingSeries(_)));
    }

    #[test]
    fn value_ceiling_covers_stack_and_lines() {
        let plan = plan_for(SmoothingPolicy::Step);
        assert!((plan.value_ceiling() - 9.0).abs() < TOLERANCE);
    }
}
