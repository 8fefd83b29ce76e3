//! Normalized feed-in and demand profiles for the example scenarios.
//!
//! Values are per-unit of the nominal flow capacity. Profiles come from a
//! CSV file when one is given, otherwise from deterministic synthetic
//! shapes so every scenario runs without input files.

use std::f64::consts::PI;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Profiles {
    pub wind: Vec<f64>,
    pub pv: Vec<f64>,
    pub demand_el: Vec<f64>,
    pub demand_th: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    wind: f64,
    pv: f64,
    demand_el: f64,
    demand_th: Option<f64>,
}

impl Profiles {
    pub fn load(data: Option<&Path>, periods: usize) -> Result<Profiles> {
        match data {
            Some(path) => Profiles::from_csv(path, periods),
            None => Ok(Profiles::synthetic(periods)),
        }
    }

    /// Reads `wind`, `pv`, `demand_el`, and optionally `demand_th` columns.
    /// The file must cover at least `periods` rows; extra rows are ignored.
    pub fn from_csv(path: &Path, periods: usize) -> Result<Profiles> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("opening profile data {}", path.display()))?;

        let mut profiles = Profiles {
            wind: Vec::with_capacity(periods),
            pv: Vec::with_capacity(periods),
            demand_el: Vec::with_capacity(periods),
            demand_th: Vec::with_capacity(periods),
        };
        let fallback_th = synthetic_demand_th(periods);

        for (t, row) in reader.deserialize::<ProfileRow>().enumerate() {
            if t >= periods {
                break;
            }
            let row = row.with_context(|| format!("parsing profile row {}", t + 1))?;
            profiles.wind.push(row.wind);
            profiles.pv.push(row.pv);
            profiles.demand_el.push(row.demand_el);
            profiles.demand_th.push(row.demand_th.unwrap_or(fallback_th[t]));
        }

        if profiles.wind.len() < periods {
            bail!(
                "profile data {} has {} rows, {} periods requested",
                path.display(),
                profiles.wind.len(),
                periods
            );
        }
        Ok(profiles)
    }

    /// Deterministic stand-in profiles: overlapping sine terms for wind, a
    /// daily bell for pv, and day/night cycles for the demands.
    pub fn synthetic(periods: usize) -> Profiles {
        let mut wind = Vec::with_capacity(periods);
        let mut pv = Vec::with_capacity(periods);
        let mut demand_el = Vec::with_capacity(periods);

        for t in 0..periods {
            let hour = (t % 24) as f64;
            let x = t as f64;

            let w = 0.4 + 0.25 * (x / 11.0).sin() + 0.2 * (x / 29.0 + 1.3).sin();
            wind.push(w.clamp(0.02, 1.0));

            let p = if (6.0..18.0).contains(&hour) {
                (PI * (hour - 6.0) / 12.0).sin() * (0.8 + 0.2 * (x / 71.0).sin())
            } else {
                0.0
            };
            pv.push(p.clamp(0.0, 1.0));

            let d = 0.55 + 0.2 * (2.0 * PI * (hour - 9.0) / 24.0).sin() + 0.05 * (x / 53.0).sin();
            demand_el.push(d.clamp(0.2, 1.0));
        }

        Profiles {
            wind,
            pv,
            demand_el,
            demand_th: synthetic_demand_th(periods),
        }
    }
}

/// Heat demand peaks in the early morning hours.
fn synthetic_demand_th(periods: usize) -> Vec<f64> {
    (0..periods)
        .map(|t| {
            let hour = (t % 24) as f64;
            let d = 0.45 + 0.25 * (2.0 * PI * (hour - 3.0) / 24.0).cos();
            d.clamp(0.05, 0.9)
        })
        .collect()
}
