// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::logs::{LogFilter, query_logs};
use crate::metrics;
use crate::models::FuelLog;
use crate::utils::{currency_symbol, fmt_opt, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("chart", sub)) => chart(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Summary {
    pub fills: usize,
    pub total_cost: Decimal,
    pub total_distance_km: f64,
    pub total_litres: f64,
    pub mpg: Option<f64>,
    pub km_per_litre: Option<f64>,
    pub litres_per_100km: Option<f64>,
    pub cost_per_mile: Option<f64>,
    pub avg_price_per_litre: Option<f64>,
}

/// Totals across `logs`; the economy figures come from the totals, not an
/// average of per-fill ratios.
pub fn summarize(logs: &[FuelLog]) -> Result<Summary> {
    let mut total_cost = Decimal::ZERO;
    let mut distance = 0.0;
    let mut litres = 0.0;
    let mut cost_f = 0.0;
    for l in logs {
        let e = &l.entry;
        let c = Decimal::try_from(e.cost)
            .with_context(|| format!("Invalid cost '{}' on fuel log #{}", e.cost, l.id))?;
        total_cost += c.round_dp(2);
        cost_f += e.cost;
        distance += e.distance;
        litres += e.fuel_amount;
    }
    Ok(Summary {
        fills: logs.len(),
        total_cost,
        total_distance_km: distance,
        total_litres: litres,
        mpg: metrics::mpg(distance, litres),
        km_per_litre: metrics::km_per_litre(distance, litres),
        litres_per_100km: metrics::litres_per_100km(distance, litres),
        cost_per_mile: metrics::cost_per_mile(cost_f, distance),
        avg_price_per_litre: metrics::fuel_price(cost_f, litres),
    })
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = LogFilter::from_matches(conn, sub)?;
    let logs = query_logs(conn, &filter, true, None)?;
    let s = summarize(&logs)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let ccy = currency_symbol(conn)?;
    let rows = vec![
        vec!["Fills".into(), s.fills.to_string()],
        vec!["Total cost".into(), format!("{}{:.2}", ccy, s.total_cost)],
        vec!["Distance (km)".into(), format!("{:.1}", s.total_distance_km)],
        vec!["Fuel (l)".into(), format!("{:.2}", s.total_litres)],
        vec!["MPG".into(), metrics::render(s.mpg, 2)],
        vec!["km/L".into(), metrics::render(s.km_per_litre, 2)],
        vec!["L/100km".into(), metrics::render(s.litres_per_100km, 2)],
        vec![
            "Cost per mile".into(),
            s.cost_per_mile
                .map(|v| format!("{}{:.3}", ccy, v))
                .unwrap_or_else(|| metrics::NOT_AVAILABLE.to_string()),
        ],
        vec![
            "Avg price per litre".into(),
            s.avg_price_per_litre
                .map(|v| format!("{}{:.3}", ccy, v))
                .unwrap_or_else(|| metrics::NOT_AVAILABLE.to_string()),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChartPoint {
    pub timestamp: String,
    /// `None` is a gap in the line, never zero.
    pub value: Option<f64>,
}

pub fn chart_series(logs: &[FuelLog], metric: &str) -> Vec<ChartPoint> {
    logs.iter()
        .map(|l| {
            let e = &l.entry;
            let value = match metric {
                "price" => metrics::numeric_fuel_price(e.cost, e.fuel_amount),
                _ => metrics::numeric_mpg(e.distance, e.fuel_amount),
            };
            ChartPoint {
                timestamp: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                value,
            }
        })
        .collect()
}

/// Table cells for a chart series: MPG to 2 dp like every other MPG figure,
/// prices to 3 dp. Gaps render as `-`.
pub fn chart_rows(points: &[ChartPoint], metric: &str) -> Vec<Vec<String>> {
    let decimals = if metric == "price" { 3 } else { 2 };
    points
        .iter()
        .map(|p| vec![p.timestamp.clone(), fmt_opt(p.value, decimals)])
        .collect()
}

fn chart(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let metric = sub
        .get_one::<String>("metric")
        .map(|s| s.as_str())
        .unwrap_or("mpg");
    let filter = LogFilter::from_matches(conn, sub)?;
    let logs = query_logs(conn, &filter, true, None)?;
    let points = chart_series(&logs, metric);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
        let header = if metric == "price" { "Price/L" } else { "MPG" };
        println!(
            "{}",
            pretty_table(&["When", header], chart_rows(&points, metric))
        );
    }
    Ok(())
}
