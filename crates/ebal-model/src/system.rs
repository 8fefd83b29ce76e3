//! The energy-system graph: typed nodes connected by directed flows.
//!
//! Nodes are buses, sources, sinks, transformers, and storages; edges are
//! the flows the dispatch optimizes. The graph is the model input only;
//! results come back as an [`ebal_core::FlowTable`] and never point back
//! into the graph.

use std::collections::HashMap;

use ebal_core::{FlowKey, NodeLabel};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Storage capacity: fixed, or sized by the optimizer against equivalent
/// periodical costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Capacity {
    Fixed(f64),
    Invest { ep_costs: f64 },
}

/// Parameters of a storage node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSpec {
    pub capacity: Capacity,
    /// Fill level at the first period, in capacity units
    pub initial_fill: f64,
    pub inflow_efficiency: f64,
    pub outflow_efficiency: f64,
    /// Relative fill lost per period
    pub loss_rate: f64,
}

impl Default for StorageSpec {
    fn default() -> Self {
        StorageSpec {
            capacity: Capacity::Fixed(0.0),
            initial_fill: 0.0,
            inflow_efficiency: 1.0,
            outflow_efficiency: 1.0,
            loss_rate: 0.0,
        }
    }
}

/// A node of the energy system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Commodity balance point; inflows must equal outflows every period
    Bus(NodeLabel),
    Source(NodeLabel),
    Sink(NodeLabel),
    /// Converts its single input into one or more outputs
    Transformer(NodeLabel),
    Storage(NodeLabel, StorageSpec),
}

impl Node {
    pub fn label(&self) -> &NodeLabel {
        match self {
            Node::Bus(label)
            | Node::Source(label)
            | Node::Sink(label)
            | Node::Transformer(label) => label,
            Node::Storage(label, _) => label,
        }
    }
}

/// One directed flow and its dispatch parameters.
///
/// `profile` values are per-unit of `nominal_value`, matching the usual
/// normalized feed-in and demand time series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowSpec {
    /// Upper bound on the flow (installed capacity)
    pub nominal_value: Option<f64>,
    /// Cost per flow unit and period in the objective
    pub variable_costs: f64,
    /// Fixed per-unit profile; pins the flow to `nominal_value * profile[t]`
    pub profile: Option<Vec<f64>>,
    /// Output share per unit of transformer input
    pub conversion_factor: Option<f64>,
}

impl FlowSpec {
    pub fn new() -> Self {
        FlowSpec::default()
    }

    pub fn with_nominal_value(mut self, nominal_value: f64) -> Self {
        self.nominal_value = Some(nominal_value);
        self
    }

    pub fn with_variable_costs(mut self, variable_costs: f64) -> Self {
        self.variable_costs = variable_costs;
        self
    }

    pub fn with_profile(mut self, profile: Vec<f64>) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_conversion_factor(mut self, factor: f64) -> Self {
        self.conversion_factor = Some(factor);
        self
    }
}

/// The model: a directed graph of nodes and flows, labels unique.
#[derive(Debug, Clone, Default)]
pub struct EnergySystem {
    graph: DiGraph<Node, FlowSpec>,
    labels: HashMap<NodeLabel, NodeIndex>,
}

impl EnergySystem {
    pub fn new() -> Self {
        EnergySystem::default()
    }

    pub fn add_bus(&mut self, label: impl Into<NodeLabel>) -> Result<NodeIndex, ModelError> {
        self.add_node(Node::Bus(label.into()))
    }

    pub fn add_source(&mut self, label: impl Into<NodeLabel>) -> Result<NodeIndex, ModelError> {
        self.add_node(Node::Source(label.into()))
    }

    pub fn add_sink(&mut self, label: impl Into<NodeLabel>) -> Result<NodeIndex, ModelError> {
        self.add_node(Node::Sink(label.into()))
    }

    pub fn add_transformer(
        &mut self,
        label: impl Into<NodeLabel>,
    ) -> Result<NodeIndex, ModelError> {
        self.add_node(Node::Transformer(label.into()))
    }

    pub fn add_storage(
        &mut self,
        label: impl Into<NodeLabel>,
        spec: StorageSpec,
    ) -> Result<NodeIndex, ModelError> {
        self.add_node(Node::Storage(label.into(), spec))
    }

    fn add_node(&mut self, node: Node) -> Result<NodeIndex, ModelError> {
        let label = node.label().clone();
        if self.labels.contains_key(&label) {
            return Err(ModelError::DuplicateLabel(label));
        }
        let index = self.graph.add_node(node);
        self.labels.insert(label, index);
        Ok(index)
    }

    /// Connects two existing nodes with a flow.
    pub fn add_flow(
        &mut self,
        source: impl Into<NodeLabel>,
        target: impl Into<NodeLabel>,
        spec: FlowSpec,
    ) -> Result<EdgeIndex, ModelError> {
        let source = source.into();
        let target = target.into();
        let from = self.node_index(&source)?;
        let to = self.node_index(&target)?;
        if self.graph.find_edge(from, to).is_some() {
            return Err(ModelError::DuplicateFlow(FlowKey::new(source, target)));
        }
        Ok(self.graph.add_edge(from, to, spec))
    }

    fn node_index(&self, label: &NodeLabel) -> Result<NodeIndex, ModelError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| ModelError::UnknownNode(label.clone()))
    }

    pub fn node(&self, label: &NodeLabel) -> Option<&Node> {
        self.labels.get(label).map(|index| &self.graph[*index])
    }

    pub(crate) fn graph(&self) -> &DiGraph<Node, FlowSpec> {
        &self.graph
    }

    /// Flow key of an edge, built from its endpoint labels.
    pub(crate) fn flow_key(&self, edge: EdgeIndex) -> FlowKey {
        let (from, to) = self
            .graph
            .edge_endpoints(edge)
            .expect("edge belongs to this graph");
        FlowKey::new(
            self.graph[from].label().clone(),
            self.graph[to].label().clone(),
        )
    }

    pub(crate) fn edges_into(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| edge.id())
            .collect()
    }

    pub(crate) fn edges_out_of(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| edge.id())
            .collect()
    }

    /// Checks the structural rules the dispatch formulation relies on.
    pub fn validate(&self, periods: usize) -> Result<(), ModelError> {
        for edge in self.graph.edge_references() {
            let key = || self.flow_key(edge.id());
            let spec = edge.weight();

            if let Some(profile) = &spec.profile {
                if spec.nominal_value.is_none() {
                    return Err(ModelError::ProfileWithoutNominal(key()));
                }
                if profile.len() != periods {
                    return Err(ModelError::ProfileLength {
                        key: key(),
                        expected: periods,
                        got: profile.len(),
                    });
                }
            }

            let from_transformer = matches!(self.graph[edge.source()], Node::Transformer(_));
            if spec.conversion_factor.is_some() && !from_transformer {
                return Err(ModelError::ConversionOutsideTransformer(key()));
            }
            if from_transformer && spec.conversion_factor.is_none() {
                return Err(ModelError::MissingConversionFactor(key()));
            }
        }

        for index in self.graph.node_indices() {
            match &self.graph[index] {
                Node::Transformer(label) => {
                    if self.edges_into(index).len() != 1 {
                        return Err(ModelError::TransformerInputs(label.clone()));
                    }
                }
                Node::Storage(label, _) => {
                    if self.edges_into(index).len() != 1 || self.edges_out_of(index).len() != 1 {
                        return Err(ModelError::StorageConnections(label.clone()));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}
