//! Partitioning a results table into the in- and outflows of one bus.

use serde::{Deserialize, Serialize};

use crate::error::{BalanceError, CoreResult};
use crate::table::{FlowKey, FlowTable, NodeLabel};

/// The flows touching one bus, split by direction.
///
/// `inflows` and `outflows` are disjoint, and together they contain every
/// key of the source table that references the bus. Both lists keep the
/// table's first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    pub bus: NodeLabel,
    /// Flows ending at the bus (target == bus)
    pub inflows: Vec<FlowKey>,
    /// Flows leaving the bus (source == bus)
    pub outflows: Vec<FlowKey>,
}

impl BalanceView {
    /// All keys of the view, inflows first.
    pub fn keys(&self) -> impl Iterator<Item = &FlowKey> {
        self.inflows.iter().chain(self.outflows.iter())
    }

    pub fn len(&self) -> usize {
        self.inflows.len() + self.outflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflows.is_empty() && self.outflows.is_empty()
    }
}

/// Splits `table` into the balance view of `bus`.
///
/// Fails with [`BalanceError::EmptyBus`] when no flow references the bus and
/// with [`BalanceError::SelfLoop`] when a flow starts and ends at the bus.
pub fn partition(table: &FlowTable, bus: &NodeLabel) -> CoreResult<BalanceView> {
    let mut inflows = Vec::new();
    let mut outflows = Vec::new();

    for key in table.keys() {
        match (key.source == *bus, key.target == *bus) {
            (true, true) => {
                return Err(BalanceError::SelfLoop { key: key.clone() });
            }
            (false, true) => inflows.push(key.clone()),
            (true, false) => outflows.push(key.clone()),
            (false, false) => {}
        }
    }

    if inflows.is_empty() && outflows.is_empty() {
        return Err(BalanceError::EmptyBus { bus: bus.clone() });
    }

    Ok(BalanceView {
        bus: bus.clone(),
        inflows,
        outflows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{FlowSeries, TimeIndex};
    use chrono::{TimeZone, Utc};

    fn table_with(keys: &[(&str, &str)]) -> FlowTable {
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let mut table = FlowTable::new(TimeIndex::hourly(start, 2));
        for (source, target) in keys {
            table
                .insert(FlowSeries::new(FlowKey::new(*source, *target), vec![0.0, 0.0]))
                .unwrap();
        }
        table
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let table = table_with(&[
            ("wind", "bel"),
            ("pv", "bel"),
            ("bel", "demand"),
            ("gas", "pp_gas"),
        ]);
        let bus = NodeLabel::from("bel");
        let view = partition(&table, &bus).unwrap();

        assert_eq!(view.inflows.len(), 2);
        assert_eq!(view.outflows.len(), 1);
        for key in view.inflows.iter() {
            assert!(!view.outflows.contains(key));
        }
        let referencing: Vec<_> = table.keys().filter(|k| k.references(&bus)).collect();
        assert_eq!(view.len(), referencing.len());
    }

    #[test]
    fn partition_keeps_encounter_order() {
        let table = table_with(&[("pv", "bel"), ("storage", "bel"), ("wind", "bel")]);
        let view = partition(&table, &NodeLabel::from("bel")).unwrap();
        let order: Vec<_> = view.inflows.iter().map(|k| k.source.as_str()).collect();
        assert_eq!(order, ["pv", "storage", "wind"]);
    }

    #[test]
    fn unknown_bus_is_empty_bus_error() {
        let table = table_with(&[("wind", "bel")]);
        let err = partition(&table, &NodeLabel::from("heat")).unwrap_err();
        assert!(matches!(err, BalanceError::EmptyBus { .. }));
    }

    #[test]
    fn self_loop_is_rejected() {
        let table = table_with(&[("bel", "bel"), ("wind", "bel")]);
        let err = partition(&table, &NodeLabel::from("bel")).unwrap_err();
        assert!(matches!(err, BalanceError::SelfLoop { .. }));
    }
}
