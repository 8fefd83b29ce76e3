//! Restricting a results table to a time window.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BalanceError, CoreResult};
use crate::table::FlowTable;

/// Inclusive `[start, end]` selection over a table's time index.
///
/// A missing bound extends to the respective edge of the index; bounds
/// outside the index are clipped, not rejected, because callers commonly
/// know only one bound ("everything from mid-February on").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeWindow {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Everything from `start` to the last sample.
    pub fn since(start: DateTime<Utc>) -> Self {
        TimeWindow {
            start: Some(start),
            end: None,
        }
    }

    /// Everything up to `end`.
    pub fn until(end: DateTime<Utc>) -> Self {
        TimeWindow {
            start: None,
            end: Some(end),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fmt_bound = |bound: &Option<DateTime<Utc>>| match bound {
            Some(stamp) => stamp.format("%Y-%m-%d %H:%M").to_string(),
            None => "open".to_string(),
        };
        write!(f, "[{}, {}]", fmt_bound(&self.start), fmt_bound(&self.end))
    }
}

/// Returns a copy of `table` restricted to `window`.
///
/// Fails with [`BalanceError::EmptyWindow`] when no sample survives the
/// clipping. Series order and scalars are preserved.
pub fn slice(table: &FlowTable, window: &TimeWindow) -> CoreResult<FlowTable> {
    let stamps = table.index().as_slice();
    let empty = || BalanceError::EmptyWindow { window: *window };

    if stamps.is_empty() {
        return Err(empty());
    }

    let from = match window.start {
        Some(start) => stamps.partition_point(|stamp| *stamp < start),
        None => 0,
    };
    let to_exclusive = match window.end {
        Some(end) => stamps.partition_point(|stamp| *stamp <= end),
        None => stamps.len(),
    };

    if from >= to_exclusive {
        return Err(empty());
    }

    Ok(table.slice_rows(from, to_exclusive - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{FlowKey, FlowSeries, TimeIndex};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap()
    }

    fn table(periods: usize) -> FlowTable {
        let mut table = FlowTable::new(TimeIndex::hourly(t0(), periods));
        let values: Vec<f64> = (0..periods).map(|i| i as f64).collect();
        table
            .insert(FlowSeries::new(FlowKey::new("wind", "bel"), values))
            .unwrap();
        table
    }

    #[test]
    fn inclusive_bounds() {
        let table = table(24);
        let window = TimeWindow::between(t0() + Duration::hours(3), t0() + Duration::hours(5));
        let sliced = slice(&table, &window).unwrap();
        assert_eq!(sliced.index().len(), 3);
        assert_eq!(
            sliced.get(&FlowKey::new("wind", "bel")),
            Some(&[3.0, 4.0, 5.0][..])
        );
    }

    #[test]
    fn open_end_extends_to_last_sample() {
        let table = table(24);
        let sliced = slice(&table, &TimeWindow::since(t0() + Duration::hours(20))).unwrap();
        assert_eq!(sliced.index().len(), 4);
        assert_eq!(sliced.index().last(), table.index().last());
    }

    #[test]
    fn out_of_range_bounds_are_clipped() {
        let table = table(24);
        let window = TimeWindow::between(t0() - Duration::days(1), t0() + Duration::days(7));
        let sliced = slice(&table, &window).unwrap();
        assert_eq!(sliced.index().len(), 24);
    }

    #[test]
    fn start_after_last_sample_is_empty_window() {
        let table = table(720);
        let window = TimeWindow::since(t0() + Duration::hours(720));
        let err = slice(&table, &window).unwrap_err();
        assert!(matches!(err, BalanceError::EmptyWindow { .. }));
    }

    #[test]
    fn sliced_index_stays_strictly_increasing() {
        let table = table(24);
        let window = TimeWindow::until(t0() + Duration::hours(10));
        let sliced = slice(&table, &window).unwrap();
        let stamps = sliced.index().as_slice();
        assert!(stamps.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn scalars_survive_slicing() {
        let mut table = table(24);
        let key = crate::table::ScalarKey::Node("storage".into());
        table.set_scalar(key.clone(), 42.0);
        let sliced = slice(&table, &TimeWindow::until(t0() + Duration::hours(1))).unwrap();
        assert_eq!(sliced.scalar(&key), Some(42.0));
    }
}
