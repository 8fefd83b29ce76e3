//! Scenario handlers and the helpers they share.

pub mod chp;
pub mod dispatch;
pub mod storage;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use ebal_core::{FlowTable, ScalarKey, TimeWindow};
use serde::Serialize;
use tabwriter::TabWriter;

/// Accepts `2012-02-15` or `2012-02-15T12:00`.
pub fn parse_stamp(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    let stamp = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
        .with_context(|| format!("parsing timestamp '{text}'"))?;
    Ok(Utc.from_utc_datetime(&stamp))
}

/// Builds the slicing window from the optional CLI bounds.
pub fn parse_window(from: Option<&str>, to: Option<&str>) -> Result<Option<TimeWindow>> {
    let start = from.map(parse_stamp).transpose()?;
    let end = to.map(parse_stamp).transpose()?;
    Ok(match (start, end) {
        (None, None) => None,
        (start, end) => Some(TimeWindow { start, end }),
    })
}

/// Prints the per-flow sums over the horizon as an aligned table.
pub fn print_sums(table: &FlowTable) -> Result<()> {
    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "flow\tsum")?;
    for (key, sum) in table.sums() {
        writeln!(tw, "{} -> {}\t{:.2}", key.source, key.target, sum)?;
    }
    tw.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct Summary {
    objective: f64,
    sums: BTreeMap<String, f64>,
    scalars: BTreeMap<String, f64>,
}

/// Writes objective, flow sums, and scalars as JSON.
pub fn write_summary(table: &FlowTable, objective: f64, path: &Path) -> Result<()> {
    let summary = Summary {
        objective,
        sums: table
            .sums()
            .into_iter()
            .map(|(key, sum)| (format!("{} -> {}", key.source, key.target), sum))
            .collect(),
        scalars: table
            .scalars()
            .map(|(key, value)| {
                let name = match key {
                    ScalarKey::Node(label) => label.to_string(),
                    ScalarKey::Flow(key) => format!("{} -> {}", key.source, key.target),
                };
                (name, value)
            })
            .collect(),
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating summary file {}", path.display()))?;
    serde_json::to_writer_pretty(file, &summary).context("writing summary JSON")?;
    Ok(())
}
