//! LP dispatch: least-cost flows over the horizon.
//!
//! The formulation is delegated entirely to good_lp:
//! - one non-negative variable per flow and period, capped by the nominal
//!   value where one is given
//! - fixed-profile flows pinned to `nominal_value * profile[t]`
//! - strict balance at every bus and period
//! - transformer outputs proportional to the single input
//! - storage fill dynamics with efficiencies, losses, and optionally an
//!   invested capacity priced at its equivalent periodical costs
//!
//! The solution comes back as a plain [`FlowTable`]; nothing downstream
//! knows an LP was involved.

use std::collections::HashMap;

use ebal_core::{FlowSeries, FlowTable, ScalarKey, TimeIndex};
use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::DispatchError;
use crate::system::{Capacity, EnergySystem, Node};

/// A solved dispatch: the results table plus the objective value.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub table: FlowTable,
    pub objective: f64,
}

/// Storage bookkeeping while the LP is assembled.
struct StorageVars {
    node: NodeIndex,
    inflow: EdgeIndex,
    outflow: EdgeIndex,
    fill: Vec<Variable>,
    invested: Option<Variable>,
}

/// Solves the least-cost dispatch of `system` over `index`.
pub fn solve_dispatch(
    system: &EnergySystem,
    index: &TimeIndex,
) -> Result<DispatchOutcome, DispatchError> {
    let periods = index.len();
    if periods == 0 {
        return Err(DispatchError::EmptyHorizon);
    }
    system.validate(periods)?;

    let graph = system.graph();
    let mut vars = variables!();

    // One variable per flow and period
    let mut flow_vars: HashMap<EdgeIndex, Vec<Variable>> = HashMap::new();
    for edge in graph.edge_references() {
        let spec = edge.weight();
        let template = match spec.nominal_value {
            Some(nominal) => variable().min(0.0).max(nominal),
            None => variable().min(0.0),
        };
        flow_vars.insert(edge.id(), vars.add_vector(template, periods));
    }

    // Fill level per storage and period boundary, plus invest variables
    let mut storages: Vec<StorageVars> = Vec::new();
    for node in graph.node_indices() {
        if let Node::Storage(_, spec) = &graph[node] {
            let fill = match spec.capacity {
                Capacity::Fixed(capacity) => {
                    vars.add_vector(variable().min(0.0).max(capacity), periods + 1)
                }
                Capacity::Invest { .. } => vars.add_vector(variable().min(0.0), periods + 1),
            };
            let invested = match spec.capacity {
                Capacity::Invest { .. } => Some(vars.add(variable().min(0.0))),
                Capacity::Fixed(_) => None,
            };
            let inflow = system.edges_into(node)[0];
            let outflow = system.edges_out_of(node)[0];
            storages.push(StorageVars {
                node,
                inflow,
                outflow,
                fill,
                invested,
            });
        }
    }

    // Objective: variable costs of every flow, plus invested capacity costs
    let mut objective = Expression::from(0.0);
    for edge in graph.edge_references() {
        let costs = edge.weight().variable_costs;
        if costs != 0.0 {
            for var in &flow_vars[&edge.id()] {
                objective += costs * *var;
            }
        }
    }
    for storage in &storages {
        if let (Some(invested), Node::Storage(_, spec)) =
            (storage.invested, &graph[storage.node])
        {
            if let Capacity::Invest { ep_costs } = spec.capacity {
                objective += ep_costs * invested;
            }
        }
    }

    let mut problem = vars.minimise(objective).using(clarabel);

    // Pin fixed profiles
    for edge in graph.edge_references() {
        let spec = edge.weight();
        if let (Some(profile), Some(nominal)) = (&spec.profile, spec.nominal_value) {
            let flow = &flow_vars[&edge.id()];
            for t in 0..periods {
                problem = problem.with(constraint!(flow[t] == nominal * profile[t]));
            }
        }
    }

    // Strict balance at every bus
    for node in graph.node_indices() {
        if !matches!(graph[node], Node::Bus(_)) {
            continue;
        }
        let incoming = system.edges_into(node);
        let outgoing = system.edges_out_of(node);
        for t in 0..periods {
            let mut balance = Expression::from(0.0);
            for edge in &incoming {
                balance += flow_vars[edge][t];
            }
            for edge in &outgoing {
                balance -= flow_vars[edge][t];
            }
            problem = problem.with(constraint!(balance == 0.0));
        }
    }

    // Transformer outputs proportional to the single input
    for node in graph.node_indices() {
        if !matches!(graph[node], Node::Transformer(_)) {
            continue;
        }
        let input = &flow_vars[&system.edges_into(node)[0]];
        for output in system.edges_out_of(node) {
            let factor = graph[output]
                .conversion_factor
                .unwrap_or(1.0); // validate() guarantees presence
            let output = &flow_vars[&output];
            for t in 0..periods {
                problem = problem.with(constraint!(output[t] == factor * input[t]));
            }
        }
    }

    // Storage fill dynamics and capacity coupling
    for storage in &storages {
        let Node::Storage(_, spec) = &graph[storage.node] else {
            continue;
        };
        let charge = &flow_vars[&storage.inflow];
        let discharge = &flow_vars[&storage.outflow];
        let fill = &storage.fill;

        problem = problem.with(constraint!(fill[0] == spec.initial_fill));
        for t in 0..periods {
            let kept = (1.0 - spec.loss_rate) * fill[t];
            let charged = spec.inflow_efficiency * charge[t];
            let discharged = (1.0 / spec.outflow_efficiency) * discharge[t];
            problem = problem.with(constraint!(fill[t + 1] == kept + charged - discharged));
        }

        if let Some(invested) = storage.invested {
            for level in fill.iter().copied() {
                problem = problem.with(constraint!(level <= invested));
            }
        }
    }

    let solution = problem
        .solve()
        .map_err(|e| DispatchError::Solver(format!("{e:?}")))?;

    // Results table in edge insertion order
    let mut table = FlowTable::new(index.clone());
    for edge in graph.edge_references() {
        let values: Vec<f64> = flow_vars[&edge.id()]
            .iter()
            .map(|var| solution.value(*var))
            .collect();
        table.insert(FlowSeries::new(system.flow_key(edge.id()), values))?;
    }
    for storage in &storages {
        if let Some(invested) = storage.invested {
            table.set_scalar(
                ScalarKey::Node(graph[storage.node].label().clone()),
                solution.value(invested),
            );
        }
    }

    let objective_value = objective_of(&solution, graph, &flow_vars, &storages);

    Ok(DispatchOutcome {
        table,
        objective: objective_value,
    })
}

/// Objective value recomputed from the solution values.
fn objective_of(
    solution: &impl Solution,
    graph: &petgraph::graph::DiGraph<Node, crate::system::FlowSpec>,
    flow_vars: &HashMap<EdgeIndex, Vec<Variable>>,
    storages: &[StorageVars],
) -> f64 {
    let mut total = 0.0;
    for edge in graph.edge_references() {
        let costs = edge.weight().variable_costs;
        if costs != 0.0 {
            for var in &flow_vars[&edge.id()] {
                total += costs * solution.value(*var);
            }
        }
    }
    for storage in storages {
        if let (Some(invested), Node::Storage(_, spec)) = (storage.invested, &graph[storage.node])
        {
            if let Capacity::Invest { ep_costs } = spec.capacity {
                total += ep_costs * solution.value(invested);
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{FlowSpec, StorageSpec};
    use chrono::{TimeZone, Utc};
    use ebal_core::{partition, FlowKey, NodeLabel};

    const TOLERANCE: f64 = 1e-6;

    fn hourly(periods: usize) -> TimeIndex {
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        TimeIndex::hourly(start, periods)
    }

    /// Wind covers what it can, the gas plant fills the rest.
    fn dispatch_system(periods: usize) -> EnergySystem {
        let mut system = EnergySystem::new();
        system.add_bus("bel").unwrap();
        system.add_bus("bgas").unwrap();
        system.add_source("wind").unwrap();
        system.add_source("rgas").unwrap();
        system.add_sink("demand").unwrap();
        system.add_transformer("pp_gas").unwrap();

        system
            .add_flow(
                "wind",
                "bel",
                FlowSpec::new()
                    .with_nominal_value(10.0)
                    .with_profile(vec![0.5; periods]),
            )
            .unwrap();
        system.add_flow("rgas", "bgas", FlowSpec::new()).unwrap();
        system
            .add_flow("bgas", "pp_gas", FlowSpec::new())
            .unwrap();
        system
            .add_flow(
                "pp_gas",
                "bel",
                FlowSpec::new()
                    .with_nominal_value(50.0)
                    .with_variable_costs(40.0)
                    .with_conversion_factor(0.58),
            )
            .unwrap();
        system
            .add_flow(
                "bel",
                "demand",
                FlowSpec::new()
                    .with_nominal_value(8.0)
                    .with_profile(vec![1.0; periods]),
            )
            .unwrap();
        system
    }

    #[test]
    fn bus_balance_holds_in_the_solution() {
        let index = hourly(4);
        let outcome = solve_dispatch(&dispatch_system(4), &index).unwrap();
        let view = partition(&outcome.table, &NodeLabel::from("bel")).unwrap();

        for t in 0..4 {
            let inflow: f64 = view
                .inflows
                .iter()
                .map(|key| outcome.table.get(key).unwrap()[t])
                .sum();
            let outflow: f64 = view
                .outflows
                .iter()
                .map(|key| outcome.table.get(key).unwrap()[t])
                .sum();
            assert!((inflow - outflow).abs() < TOLERANCE);
        }
    }

    #[test]
    fn fixed_profiles_are_pinned() {
        let index = hourly(4);
        let outcome = solve_dispatch(&dispatch_system(4), &index).unwrap();
        let wind = outcome.table.get(&FlowKey::new("wind", "bel")).unwrap();
        for value in wind {
            assert!((value - 5.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn transformer_conversion_is_honored() {
        let index = hourly(4);
        let outcome = solve_dispatch(&dispatch_system(4), &index).unwrap();
        let input = outcome.table.get(&FlowKey::new("bgas", "pp_gas")).unwrap();
        let output = outcome.table.get(&FlowKey::new("pp_gas", "bel")).unwrap();
        for t in 0..4 {
            assert!((output[t] - 0.58 * input[t]).abs() < TOLERANCE);
        }
    }

    #[test]
    fn gas_plant_covers_the_wind_gap() {
        let index = hourly(4);
        let outcome = solve_dispatch(&dispatch_system(4), &index).unwrap();
        // demand 8, wind 5 -> gas output 3 each period
        let output = outcome.table.get(&FlowKey::new("pp_gas", "bel")).unwrap();
        for value in output {
            assert!((value - 3.0).abs() < TOLERANCE);
        }
        // objective = 40 cost * 3 units * 4 periods
        assert!((outcome.objective - 480.0).abs() < 1e-3);
    }

    #[test]
    fn empty_horizon_is_rejected() {
        let index = TimeIndex::new(Vec::new()).unwrap();
        let err = solve_dispatch(&dispatch_system(4), &index).unwrap_err();
        assert!(matches!(err, DispatchError::EmptyHorizon));
    }

    /// Storage shifts cheap early energy into expensive later periods.
    #[test]
    fn storage_investment_surfaces_as_scalar() {
        let periods = 4;
        let index = hourly(periods);
        let mut system = EnergySystem::new();
        system.add_bus("bel").unwrap();
        system.add_source("pv").unwrap();
        system.add_source("backup").unwrap();
        system.add_sink("demand").unwrap();
        system
            .add_storage(
                "battery",
                StorageSpec {
                    capacity: Capacity::Invest { ep_costs: 0.1 },
                    initial_fill: 0.0,
                    inflow_efficiency: 1.0,
                    outflow_efficiency: 1.0,
                    loss_rate: 0.0,
                },
            )
            .unwrap();

        // pv is free but only available in the first half
        system
            .add_flow(
                "pv",
                "bel",
                FlowSpec::new()
                    .with_nominal_value(10.0)
                    .with_profile(vec![1.0, 1.0, 0.0, 0.0]),
            )
            .unwrap();
        // backup can always deliver, at a price
        system
            .add_flow(
                "backup",
                "bel",
                FlowSpec::new().with_variable_costs(100.0),
            )
            .unwrap();
        system
            .add_flow(
                "bel",
                "demand",
                FlowSpec::new()
                    .with_nominal_value(4.0)
                    .with_profile(vec![1.0; periods]),
            )
            .unwrap();
        system.add_flow("bel", "battery", FlowSpec::new()).unwrap();
        system.add_flow("battery", "bel", FlowSpec::new()).unwrap();

        let outcome = solve_dispatch(&system, &index).unwrap();
        let invested = outcome
            .table
            .scalar(&ScalarKey::Node(NodeLabel::from("battery")))
            .unwrap();
        // 4 units of demand in each of the two dark periods
        assert!(invested > 8.0 - TOLERANCE);
        let backup = outcome.table.get(&FlowKey::new("backup", "bel")).unwrap();
        let backup_total: f64 = backup.iter().sum();
        assert!(backup_total < TOLERANCE.max(1e-3));
    }
}
