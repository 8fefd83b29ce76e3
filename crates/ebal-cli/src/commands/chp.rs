//! Combined heat and power: one gas-fired CHP feeds an electricity and a
//! heat bus with fixed output shares; excess sinks absorb whichever side
//! overshoots its demand.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{TimeZone, Utc};
use ebal_core::{FlowKey, FlowTable, TimeIndex};
use ebal_model::{solve_dispatch, EnergySystem, FlowSpec, ModelError};
use ebal_viz::{io_plot, Color, PlotSpec, SmoothingPolicy, StyleSpec, TickSpec};
use tracing::info;

use crate::commands::{parse_window, print_sums, write_summary};
use crate::profiles::Profiles;
use ebal_cli::cli::CommonArgs;

pub fn handle(out: &Path, periods: usize, steps: bool, common: &CommonArgs) -> Result<()> {
    info!("Initialize the energy system");
    let start = Utc.with_ymd_and_hms(2012, 5, 5, 0, 0, 0).expect("valid start date");
    let index = TimeIndex::hourly(start, periods);
    let profiles = Profiles::load(common.data.as_deref(), periods)?;
    let system = build_chp_system(&profiles)?;

    info!("Solve the optimization problem");
    let outcome = solve_dispatch(&system, &index)?;
    info!("Optimization successful, total costs {:.2}", outcome.objective);
    print_sums(&outcome.table)?;

    let policy = if steps {
        SmoothingPolicy::Step
    } else {
        SmoothingPolicy::Smooth
    };
    plot_bus(&outcome.table, "electricity", policy, common, &suffixed(out, "electricity"))?;
    plot_bus(&outcome.table, "heat", policy, common, &suffixed(out, "heat"))?;

    if let Some(json) = &common.json {
        write_summary(&outcome.table, outcome.objective, json)?;
    }
    Ok(())
}

fn plot_bus(
    table: &FlowTable,
    bus: &str,
    policy: SmoothingPolicy,
    common: &CommonArgs,
    out: &Path,
) -> Result<()> {
    let mut spec = PlotSpec {
        window: parse_window(None, common.to.as_deref())?,
        style: chp_style()?,
        policy,
        tick_spec: TickSpec::Count(6),
        tick_format: "%d-%m".to_string(),
        ..PlotSpec::default()
    };
    spec.options.title = match bus {
        "heat" => "Heat output".to_string(),
        _ => "Electricity output".to_string(),
    };
    spec.options.line_width = 4;

    io_plot(table, &bus.into(), &spec, out)?;
    info!("Balance plot written to {}", out.display());
    Ok(())
}

/// `chp.png` becomes `chp_electricity.png` / `chp_heat.png`.
fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("chp");
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("png");
    path.with_file_name(format!("{stem}_{suffix}.{extension}"))
}

fn build_chp_system(profiles: &Profiles) -> Result<EnergySystem, ModelError> {
    let mut system = EnergySystem::new();

    for bus in ["natural_gas", "electricity", "heat"] {
        system.add_bus(bus)?;
    }
    system.add_source("rgas")?;
    system.add_flow("rgas", "natural_gas", FlowSpec::new().with_variable_costs(50.0))?;

    system.add_transformer("chp_gas")?;
    system.add_flow("natural_gas", "chp_gas", FlowSpec::new())?;
    system.add_flow(
        "chp_gas",
        "electricity",
        FlowSpec::new().with_conversion_factor(0.3),
    )?;
    system.add_flow(
        "chp_gas",
        "heat",
        FlowSpec::new().with_conversion_factor(0.5),
    )?;

    system.add_sink("demand_elec")?;
    system.add_flow(
        "electricity",
        "demand_elec",
        FlowSpec::new()
            .with_nominal_value(100.0)
            .with_profile(profiles.demand_el.clone()),
    )?;
    system.add_sink("demand_therm")?;
    system.add_flow(
        "heat",
        "demand_therm",
        FlowSpec::new()
            .with_nominal_value(200.0)
            .with_profile(profiles.demand_th.clone()),
    )?;

    system.add_sink("excess_elec")?;
    system.add_flow("electricity", "excess_elec", FlowSpec::new())?;
    system.add_sink("excess_therm")?;
    system.add_flow("heat", "excess_therm", FlowSpec::new())?;

    Ok(system)
}

fn chp_style() -> Result<StyleSpec> {
    let chp_teal = Color::from_hex("#20b4b6")?;
    let demand_blue = Color::from_hex("#5b5bae")?;
    let excess_red = Color::from_hex("#f22222")?;
    let style = StyleSpec::default()
        .with_color(FlowKey::new("chp_gas", "electricity"), chp_teal)
        .with_color(FlowKey::new("chp_gas", "heat"), chp_teal)
        .with_color(FlowKey::new("electricity", "demand_elec"), demand_blue)
        .with_color(FlowKey::new("heat", "demand_therm"), demand_blue)
        .with_color(FlowKey::new("electricity", "excess_elec"), excess_red)
        .with_color(FlowKey::new("heat", "excess_therm"), excess_red);
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_are_appended_before_the_extension() {
        let out = suffixed(Path::new("figures/chp.png"), "heat");
        assert_eq!(out, Path::new("figures/chp_heat.png"));
    }

    #[test]
    fn chp_couples_heat_and_power() {
        let periods = 24;
        let profiles = Profiles::synthetic(periods);
        let system = build_chp_system(&profiles).unwrap();
        let start = Utc.with_ymd_and_hms(2012, 5, 5, 0, 0, 0).unwrap();
        let outcome = solve_dispatch(&system, &TimeIndex::hourly(start, periods)).unwrap();

        let input = outcome
            .table
            .get(&FlowKey::new("natural_gas", "chp_gas"))
            .unwrap();
        let electricity = outcome
            .table
            .get(&FlowKey::new("chp_gas", "electricity"))
            .unwrap();
        let heat = outcome.table.get(&FlowKey::new("chp_gas", "heat")).unwrap();
        for t in 0..periods {
            assert!((electricity[t] - 0.3 * input[t]).abs() < 1e-4);
            assert!((heat[t] - 0.5 * input[t]).abs() < 1e-4);
        }
    }
}
