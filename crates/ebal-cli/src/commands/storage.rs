//! Storage investment: wind, pv, and a gas plant serve the electrical
//! demand; the optimizer sizes a battery against its periodical costs.

use std::path::Path;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use ebal_core::{FlowKey, NodeLabel, ScalarKey, TimeIndex};
use ebal_model::{solve_dispatch, Capacity, EnergySystem, FlowSpec, ModelError, StorageSpec};
use ebal_viz::{io_plot, Color, OrderSpec, PlotSpec, SmoothingPolicy, StyleSpec, TickSpec};
use tracing::info;

use crate::commands::{parse_window, print_sums, write_summary};
use crate::profiles::Profiles;
use ebal_cli::cli::CommonArgs;

const BUS: &str = "electricity";

pub fn handle(
    out: &Path,
    periods: usize,
    from: &str,
    smooth: bool,
    common: &CommonArgs,
) -> Result<()> {
    info!("Initialize the energy system");
    let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).expect("valid start date");
    let index = TimeIndex::hourly(start, periods);
    let profiles = Profiles::load(common.data.as_deref(), periods)?;

    // Costs of one unit of storage capacity over the optimized horizon
    let ep_costs = annuity(1000.0, 20, 0.05) * periods as f64 / 8760.0;
    let system = build_storage_system(&profiles, ep_costs)?;

    info!("Solve the optimization problem");
    let outcome = solve_dispatch(&system, &index)?;
    let invested = outcome
        .table
        .scalar(&ScalarKey::Node(NodeLabel::from("storage")))
        .unwrap_or(0.0);
    info!(
        "Optimization successful, invested storage capacity {:.1}, total costs {:.2}",
        invested, outcome.objective
    );
    print_sums(&outcome.table)?;

    let mut spec = PlotSpec {
        window: parse_window(Some(from), common.to.as_deref())?,
        order: OrderSpec::default().with_inorder(vec![
            FlowKey::new("pv", BUS),
            FlowKey::new("wind", BUS),
            FlowKey::new("storage", BUS),
            FlowKey::new("pp_gas", BUS),
        ]),
        style: storage_style()?,
        policy: if smooth {
            SmoothingPolicy::Smooth
        } else {
            SmoothingPolicy::Step
        },
        tick_spec: TickSpec::Distance(48),
        tick_format: "%d-%m-%H".to_string(),
        tick_offset: 12,
        ..PlotSpec::default()
    };
    spec.options.title = "Electricity bus".to_string();

    io_plot(&outcome.table, &BUS.into(), &spec, out)?;
    info!("Balance plot written to {}", out.display());

    if let Some(json) = &common.json {
        write_summary(&outcome.table, outcome.objective, json)?;
    }
    Ok(())
}

/// Equivalent periodical costs of an investment, per year.
fn annuity(capex: f64, n: u32, wacc: f64) -> f64 {
    let q = (1.0 + wacc).powi(n as i32);
    capex * (wacc * q) / (q - 1.0)
}

fn build_storage_system(profiles: &Profiles, ep_costs: f64) -> Result<EnergySystem, ModelError> {
    let mut system = EnergySystem::new();

    system.add_bus("natural_gas")?;
    system.add_bus(BUS)?;

    system.add_source("rgas")?;
    system.add_flow("rgas", "natural_gas", FlowSpec::new())?;

    system.add_source("wind")?;
    system.add_flow(
        "wind",
        BUS,
        FlowSpec::new()
            .with_nominal_value(1000.0)
            .with_profile(profiles.wind.clone()),
    )?;
    system.add_source("pv")?;
    system.add_flow(
        "pv",
        BUS,
        FlowSpec::new()
            .with_nominal_value(582.0)
            .with_profile(profiles.pv.clone()),
    )?;

    system.add_sink("demand")?;
    system.add_flow(
        BUS,
        "demand",
        FlowSpec::new()
            .with_nominal_value(600.0)
            .with_profile(profiles.demand_el.clone()),
    )?;
    system.add_sink("excess_bel")?;
    system.add_flow(BUS, "excess_bel", FlowSpec::new())?;

    system.add_transformer("pp_gas")?;
    system.add_flow("natural_gas", "pp_gas", FlowSpec::new())?;
    system.add_flow(
        "pp_gas",
        BUS,
        FlowSpec::new()
            .with_variable_costs(50.0)
            .with_conversion_factor(0.58),
    )?;

    system.add_storage(
        "storage",
        StorageSpec {
            capacity: Capacity::Invest { ep_costs },
            initial_fill: 0.0,
            inflow_efficiency: 1.0,
            outflow_efficiency: 0.8,
            loss_rate: 0.0,
        },
    )?;
    system.add_flow(BUS, "storage", FlowSpec::new())?;
    system.add_flow("storage", BUS, FlowSpec::new())?;

    Ok(system)
}

/// The color dictionary of the original storage-investment figure.
fn storage_style() -> Result<StyleSpec> {
    let style = StyleSpec::default()
        .with_color(FlowKey::new(BUS, "demand"), Color::from_hex("#ce4aff")?)
        .with_color(FlowKey::new(BUS, "excess_bel"), Color::from_hex("#555555")?)
        .with_color(FlowKey::new(BUS, "storage"), Color::from_hex("#42c77a")?)
        .with_color(FlowKey::new("pp_gas", BUS), Color::from_hex("#636f6b")?)
        .with_color(FlowKey::new("pv", BUS), Color::from_hex("#ffde32")?)
        .with_color(FlowKey::new("storage", BUS), Color::from_hex("#42c77a")?)
        .with_color(FlowKey::new("wind", BUS), Color::from_hex("#5b5bae")?);
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annuity_matches_the_closed_form() {
        // 1000 over 20 years at 5% is roughly 80.24 per year
        assert!((annuity(1000.0, 20, 0.05) - 80.24).abs() < 0.01);
    }

    #[test]
    fn storage_system_solves_with_investment() {
        let periods = 48;
        let profiles = Profiles::synthetic(periods);
        let system = build_storage_system(&profiles, 1.0).unwrap();
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let outcome = solve_dispatch(&system, &TimeIndex::hourly(start, periods)).unwrap();
        let invested = outcome
            .table
            .scalar(&ScalarKey::Node(NodeLabel::from("storage")))
            .unwrap();
        assert!(invested >= 0.0);
    }
}
