//! The normalized results table: flow keys, time index, and series.
//!
//! A [`FlowTable`] is the in-memory form of the results an optimization run
//! hands back: one time-indexed sequence per directed flow, plus optional
//! scalar summaries (e.g. invested capacity). The table is read-only once
//! built; partitioning and slicing return fresh values.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BalanceError, CoreResult};

/// Label of a node in the energy-system graph (bus, source, sink, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeLabel(String);

impl NodeLabel {
    pub fn new(label: impl Into<String>) -> Self {
        NodeLabel(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeLabel {
    fn from(label: &str) -> Self {
        NodeLabel(label.to_string())
    }
}

impl From<String> for NodeLabel {
    fn from(label: String) -> Self {
        NodeLabel(label)
    }
}

/// Directed flow identifier: commodity moving from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowKey {
    pub source: NodeLabel,
    pub target: NodeLabel,
}

impl FlowKey {
    pub fn new(source: impl Into<NodeLabel>, target: impl Into<NodeLabel>) -> Self {
        FlowKey {
            source: source.into(),
            target: target.into(),
        }
    }

    /// True if either endpoint is `node`.
    pub fn references(&self, node: &NodeLabel) -> bool {
        self.source == *node || self.target == *node
    }
}

impl fmt::Display for FlowKey {
    /// Renders the tuple label the legend rewriting operates on,
    /// e.g. `(('wind', 'electricity'), flow)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(('{}', '{}'), flow)", self.source, self.target)
    }
}

/// Key for scalar summary values attached to a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKey {
    /// A per-node scalar, e.g. invested storage capacity
    Node(NodeLabel),
    /// A per-flow scalar, e.g. invested transmission capacity
    Flow(FlowKey),
}

/// Shared, strictly increasing sequence of timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeIndex(Vec<DateTime<Utc>>);

impl TimeIndex {
    /// Validates strict monotonicity.
    pub fn new(stamps: Vec<DateTime<Utc>>) -> CoreResult<Self> {
        for (position, pair) in stamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(BalanceError::UnsortedIndex {
                    position: position + 1,
                });
            }
        }
        Ok(TimeIndex(stamps))
    }

    /// `periods` hourly timestamps starting at `start`.
    pub fn hourly(start: DateTime<Utc>, periods: usize) -> Self {
        let stamps = (0..periods)
            .map(|h| start + Duration::hours(h as i64))
            .collect();
        TimeIndex(stamps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<DateTime<Utc>> {
        self.0.get(position).copied()
    }

    pub fn first(&self) -> Option<DateTime<Utc>> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        self.0.last().copied()
    }

    pub fn as_slice(&self) -> &[DateTime<Utc>] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.0.iter().copied()
    }

    pub(crate) fn sliced(&self, from: usize, to_inclusive: usize) -> TimeIndex {
        TimeIndex(self.0[from..=to_inclusive].to_vec())
    }
}

/// One flow's samples, aligned with the owning table's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSeries {
    pub key: FlowKey,
    pub values: Vec<f64>,
}

impl FlowSeries {
    pub fn new(key: FlowKey, values: Vec<f64>) -> Self {
        FlowSeries { key, values }
    }
}

/// Insertion-ordered mapping from [`FlowKey`] to samples over one [`TimeIndex`].
///
/// Encounter order is load-bearing: partitioning and fallback ordering are
/// defined in terms of first-seen order, so the table keeps an explicit key
/// list next to the value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTable {
    index: TimeIndex,
    order: Vec<FlowKey>,
    values: HashMap<FlowKey, Vec<f64>>,
    scalars: Vec<(ScalarKey, f64)>,
}

impl FlowTable {
    pub fn new(index: TimeIndex) -> Self {
        FlowTable {
            index,
            order: Vec::new(),
            values: HashMap::new(),
            scalars: Vec::new(),
        }
    }

    /// Adds a series; the sample count must match the index. Inserting a key
    /// twice replaces its values but keeps the original position.
    pub fn insert(&mut self, series: FlowSeries) -> CoreResult<()> {
        if series.values.len() != self.index.len() {
            return Err(BalanceError::LengthMismatch {
                key: series.key,
                expected: self.index.len(),
                got: series.values.len(),
            });
        }
        if !self.values.contains_key(&series.key) {
            self.order.push(series.key.clone());
        }
        self.values.insert(series.key, series.values);
        Ok(())
    }

    pub fn set_scalar(&mut self, key: ScalarKey, value: f64) {
        if let Some(slot) = self.scalars.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.scalars.push((key, value));
        }
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Flow keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &FlowKey> {
        self.order.iter()
    }

    pub fn get(&self, key: &FlowKey) -> Option<&[f64]> {
        self.values.get(key).map(Vec::as_slice)
    }

    pub fn scalar(&self, key: &ScalarKey) -> Option<f64> {
        self.scalars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn scalars(&self) -> impl Iterator<Item = (&ScalarKey, f64)> {
        self.scalars.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Per-flow sum over the whole horizon, in table order.
    pub fn sums(&self) -> Vec<(FlowKey, f64)> {
        self.order
            .iter()
            .map(|key| (key.clone(), self.values[key].iter().sum()))
            .collect()
    }

    pub(crate) fn slice_rows(&self, from: usize, to_inclusive: usize) -> FlowTable {
        let index = self.index.sliced(from, to_inclusive);
        let mut values = HashMap::with_capacity(self.values.len());
        for (key, samples) in &self.values {
            values.insert(key.clone(), samples[from..=to_inclusive].to_vec());
        }
        FlowTable {
            index,
            order: self.order.clone(),
            values,
            scalars: self.scalars.clone(),
        }
    }
}
