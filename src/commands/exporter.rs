// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::logs::{LogFilter, query_logs};
use crate::tsv::{COL_COST, COL_DATE, COL_DISTANCE, COL_GARAGE, COL_LITRES};
use crate::utils::required;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("logs", sub)) => export_logs(conn, sub),
        _ => Ok(()),
    }
}

fn export_logs(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.trim().to_lowercase();
    let out = required(sub, "out")?.trim();
    if !matches!(fmt.as_str(), "csv" | "json" | "tsv") {
        return Err(anyhow!("Unknown format: {} (use csv|json|tsv)", fmt));
    }

    let filter = LogFilter::from_matches(conn, sub)?;
    let logs = query_logs(conn, &filter, true, None)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "timestamp",
                "brand",
                "cost",
                "distance_km",
                "litres",
                "vehicle_id",
                "latitude",
                "longitude",
                "accuracy",
                "user_id",
            ])?;
            for l in &logs {
                let e = &l.entry;
                let loc = e.location;
                wtr.write_record([
                    l.id.to_string(),
                    e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    e.brand.clone(),
                    e.cost.to_string(),
                    e.distance.to_string(),
                    e.fuel_amount.to_string(),
                    e.vehicle_id.map(|v| v.to_string()).unwrap_or_default(),
                    loc.map(|l| l.latitude.to_string()).unwrap_or_default(),
                    loc.map(|l| l.longitude.to_string()).unwrap_or_default(),
                    loc.and_then(|l| l.accuracy)
                        .map(|a| a.to_string())
                        .unwrap_or_default(),
                    e.user_id.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "tsv" => {
            // same layout `import tsv` reads back
            let mut wtr = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .quote_style(csv::QuoteStyle::Never)
                .from_path(out)?;
            wtr.write_record([COL_DATE, COL_LITRES, COL_COST, COL_GARAGE, COL_DISTANCE])?;
            for l in &logs {
                let e = &l.entry;
                wtr.write_record([
                    e.timestamp.format("%d/%m/%Y").to_string(),
                    e.fuel_amount.to_string(),
                    e.cost.to_string(),
                    e.brand.replace(['\t', '\n', '\r'], " "),
                    e.distance.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = logs
                .iter()
                .map(|l| {
                    let e = &l.entry;
                    json!({
                        "id": l.id,
                        "timestamp": e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                        "brand": e.brand,
                        "cost": e.cost,
                        "distance_km": e.distance,
                        "litres": e.fuel_amount,
                        "vehicle_id": e.vehicle_id,
                        "location": e.location,
                        "user_id": e.user_id,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported {} fuel log(s) to {}", logs.len(), out);
    Ok(())
}
