//! Multi-fuel dispatch: coal, lignite, gas, oil, and a CHP cover what
//! wind and pv leave of the electrical and thermal demand.

use std::path::Path;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use ebal_core::{FlowKey, TimeIndex};
use ebal_model::{solve_dispatch, EnergySystem, FlowSpec, ModelError};
use ebal_viz::{io_plot, Color, PlotSpec, SmoothingPolicy, StyleSpec, TickSpec};
use tracing::info;

use crate::commands::{parse_window, print_sums, write_summary};
use crate::profiles::Profiles;
use ebal_cli::cli::CommonArgs;

pub fn handle(
    out: &Path,
    periods: usize,
    bus: &str,
    from: Option<&str>,
    smooth: bool,
    common: &CommonArgs,
) -> Result<()> {
    info!("Initialize the energy system");
    let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).expect("valid start date");
    let index = TimeIndex::hourly(start, periods);
    let profiles = Profiles::load(common.data.as_deref(), periods)?;
    let system = build_fleet(&profiles)?;

    info!("Solve the optimization problem");
    let outcome = solve_dispatch(&system, &index)?;
    info!("Optimization successful, total costs {:.2}", outcome.objective);
    print_sums(&outcome.table)?;

    let mut spec = PlotSpec {
        window: parse_window(from, common.to.as_deref())?,
        style: fleet_style()?,
        policy: if smooth {
            SmoothingPolicy::Smooth
        } else {
            SmoothingPolicy::Step
        },
        tick_spec: TickSpec::Count(6),
        tick_format: "%d-%m".to_string(),
        ..PlotSpec::default()
    };
    spec.options.title = format!("{bus} balance");

    io_plot(&outcome.table, &bus.into(), &spec, out)?;
    info!("Balance plot written to {}", out.display());

    if let Some(json) = &common.json {
        write_summary(&outcome.table, outcome.objective, json)?;
    }
    Ok(())
}

/// Four fuel buses feeding condensing plants, one gas CHP serving the
/// heat bus, wind and pv on fixed profiles, and an excess sink keeping
/// the electrical bus feasible.
fn build_fleet(profiles: &Profiles) -> Result<EnergySystem, ModelError> {
    let mut system = EnergySystem::new();

    for bus in ["bcoal", "bgas", "boil", "blig", "bel", "bth"] {
        system.add_bus(bus)?;
    }
    for (source, bus) in [
        ("rcoal", "bcoal"),
        ("rgas", "bgas"),
        ("roil", "boil"),
        ("rlig", "blig"),
    ] {
        system.add_source(source)?;
        system.add_flow(source, bus, FlowSpec::new())?;
    }

    system.add_source("wind")?;
    system.add_flow(
        "wind",
        "bel",
        FlowSpec::new()
            .with_nominal_value(66.3)
            .with_profile(profiles.wind.clone()),
    )?;
    system.add_source("pv")?;
    system.add_flow(
        "pv",
        "bel",
        FlowSpec::new()
            .with_nominal_value(65.3)
            .with_profile(profiles.pv.clone()),
    )?;

    system.add_sink("demand_el")?;
    system.add_flow(
        "bel",
        "demand_el",
        FlowSpec::new()
            .with_nominal_value(85.0)
            .with_profile(profiles.demand_el.clone()),
    )?;
    system.add_sink("demand_th")?;
    system.add_flow(
        "bth",
        "demand_th",
        FlowSpec::new()
            .with_nominal_value(40.0)
            .with_profile(profiles.demand_th.clone()),
    )?;
    system.add_sink("excess_el")?;
    system.add_flow("bel", "excess_el", FlowSpec::new())?;

    // (fuel bus, plant, nominal output, variable costs, efficiency)
    let plants = [
        ("bcoal", "pp_coal", 20.2, 25.0, 0.39),
        ("blig", "pp_lig", 11.8, 19.0, 0.41),
        ("bgas", "pp_gas", 41.0, 40.0, 0.50),
        ("boil", "pp_oil", 5.0, 50.0, 0.28),
    ];
    for (fuel, plant, nominal, costs, efficiency) in plants {
        system.add_transformer(plant)?;
        system.add_flow(fuel, plant, FlowSpec::new())?;
        system.add_flow(
            plant,
            "bel",
            FlowSpec::new()
                .with_nominal_value(nominal)
                .with_variable_costs(costs)
                .with_conversion_factor(efficiency),
        )?;
    }

    system.add_transformer("pp_chp")?;
    system.add_flow("bgas", "pp_chp", FlowSpec::new())?;
    system.add_flow(
        "pp_chp",
        "bel",
        FlowSpec::new()
            .with_nominal_value(30.0)
            .with_variable_costs(42.0)
            .with_conversion_factor(0.3),
    )?;
    system.add_flow(
        "pp_chp",
        "bth",
        FlowSpec::new()
            .with_nominal_value(40.0)
            .with_conversion_factor(0.4),
    )?;

    Ok(system)
}

fn fleet_style() -> Result<StyleSpec> {
    let style = StyleSpec::default()
        .with_color(FlowKey::new("wind", "bel"), Color::from_hex("#5b5bae")?)
        .with_color(FlowKey::new("pv", "bel"), Color::from_hex("#ffde32")?)
        .with_color(FlowKey::new("pp_gas", "bel"), Color::from_hex("#636f6b")?)
        .with_color(FlowKey::new("bel", "demand_el"), Color::from_hex("#ce4aff")?)
        .with_color(FlowKey::new("bel", "excess_el"), Color::from_hex("#555555")?);
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebal_core::partition;

    #[test]
    fn fleet_solves_and_balances() {
        let periods = 24;
        let profiles = Profiles::synthetic(periods);
        let system = build_fleet(&profiles).unwrap();
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let outcome = solve_dispatch(&system, &TimeIndex::hourly(start, periods)).unwrap();

        let view = partition(&outcome.table, &"bel".into()).unwrap();
        for t in 0..periods {
            let inflow: f64 = view
                .inflows
                .iter()
                .map(|k| outcome.table.get(k).unwrap()[t])
                .sum();
            let outflow: f64 = view
                .outflows
                .iter()
                .map(|k| outcome.table.get(k).unwrap()[t])
                .sum();
            assert!((inflow - outflow).abs() < 1e-4);
        }
        assert!(outcome.objective > 0.0);
    }

    #[test]
    fn cheap_plants_run_before_expensive_ones() {
        let periods = 24;
        let profiles = Profiles::synthetic(periods);
        let system = build_fleet(&profiles).unwrap();
        let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let outcome = solve_dispatch(&system, &TimeIndex::hourly(start, periods)).unwrap();

        let lig: f64 = outcome
            .table
            .get(&FlowKey::new("pp_lig", "bel"))
            .unwrap()
            .iter()
            .sum();
        let oil: f64 = outcome
            .table
            .get(&FlowKey::new("pp_oil", "bel"))
            .unwrap()
            .iter()
            .sum();
        assert!(lig >= oil);
    }
}
