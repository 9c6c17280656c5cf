// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::metrics;
use crate::models::{FuelLog, Location, NewFuelLog, location_columns, normalize_brand};
use crate::store::insert_log;
use crate::utils::{
    currency_symbol, current_user, fmt_opt, id_for_vehicle, maybe_print_json, parse_coordinate,
    parse_date, parse_positive, parse_time, pretty_table, required,
};
use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct LogFilter {
    pub vehicle_id: Option<i64>,
    pub unassigned: bool,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub brand: Option<String>,
}

impl LogFilter {
    pub fn from_matches(conn: &Connection, sub: &clap::ArgMatches) -> Result<Self> {
        let vehicle_id = match sub.get_one::<String>("vehicle") {
            Some(name) => Some(id_for_vehicle(conn, name)?),
            None => None,
        };
        let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
        let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(anyhow!("--from {} is after --to {}", f, t));
            }
        }
        Ok(Self {
            vehicle_id,
            unassigned: sub.get_flag("unassigned"),
            from,
            to,
            brand: sub
                .get_one::<String>("brand")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

fn log_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<FuelLog> {
    let lat: Option<f64> = r.get(8)?;
    let lon: Option<f64> = r.get(9)?;
    let location = match (lat, lon) {
        (Some(latitude), Some(longitude)) => Some(Location {
            latitude,
            longitude,
            accuracy: r.get(10)?,
        }),
        _ => None,
    };
    Ok(FuelLog {
        id: r.get(0)?,
        entry: NewFuelLog {
            user_id: r.get(1)?,
            timestamp: r.get(2)?,
            brand: r.get(3)?,
            cost: r.get(4)?,
            distance: r.get(5)?,
            fuel_amount: r.get(6)?,
            vehicle_id: r.get(7)?,
            location,
        },
    })
}

/// Logs matching `filter`, newest first unless `oldest_first`.
pub fn query_logs(
    conn: &Connection,
    filter: &LogFilter,
    oldest_first: bool,
    limit: Option<usize>,
) -> Result<Vec<FuelLog>> {
    let mut sql = String::from(
        "SELECT id, user_id, timestamp, brand, cost, distance, fuel_amount, vehicle_id, latitude, longitude, accuracy FROM fuel_logs WHERE 1=1",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(vid) = filter.vehicle_id {
        sql.push_str(" AND vehicle_id=?");
        params_vec.push(Box::new(vid));
    }
    if filter.unassigned {
        sql.push_str(" AND vehicle_id IS NULL");
    }
    if let Some(from) = filter.from {
        sql.push_str(" AND date(timestamp)>=?");
        params_vec.push(Box::new(from.to_string()));
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND date(timestamp)<=?");
        params_vec.push(Box::new(to.to_string()));
    }
    if let Some(brand) = &filter.brand {
        sql.push_str(" AND instr(lower(brand), lower(?))>0");
        params_vec.push(Box::new(brand.clone()));
    }
    if oldest_first {
        sql.push_str(" ORDER BY timestamp ASC, id ASC");
    } else {
        sql.push_str(" ORDER BY timestamp DESC, id DESC");
    }
    if let Some(limit) = limit {
        let limit = i64::try_from(limit).with_context(|| format!("Limit {} is too large", limit))?;
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
        log_from_row,
    )?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn timestamp_from(sub: &clap::ArgMatches) -> Result<Option<NaiveDateTime>> {
    let date = sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?;
    let time = sub.get_one::<String>("time").map(|s| parse_time(s)).transpose()?;
    Ok(match (date, time) {
        (Some(d), t) => Some(d.and_time(t.unwrap_or(NaiveTime::MIN))),
        (None, Some(t)) => Some(chrono::Local::now().date_naive().and_time(t)),
        (None, None) => None,
    })
}

fn location_from(sub: &clap::ArgMatches) -> Result<Option<Location>> {
    let (Some(lat), Some(lon)) = (sub.get_one::<String>("lat"), sub.get_one::<String>("lon"))
    else {
        return Ok(None);
    };
    let accuracy = match sub.get_one::<String>("accuracy") {
        Some(a) => {
            let v: f64 = a
                .trim()
                .parse()
                .with_context(|| format!("Invalid accuracy '{}'", a))?;
            if !v.is_finite() || v < 0.0 {
                return Err(anyhow!("accuracy must not be negative, got '{}'", a));
            }
            Some(v)
        }
        None => None,
    };
    Ok(Some(Location {
        latitude: parse_coordinate(lat, "latitude", 90.0)?,
        longitude: parse_coordinate(lon, "longitude", 180.0)?,
        accuracy,
    }))
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let timestamp = match timestamp_from(sub)? {
        Some(ts) => ts,
        None => chrono::Local::now().naive_local(),
    };
    let cost = parse_positive(required(sub, "cost")?, "cost")?;
    let distance = parse_positive(required(sub, "distance")?, "distance")?;
    let fuel_amount = parse_positive(required(sub, "litres")?, "litres")?;
    let vehicle_id = match sub.get_one::<String>("vehicle") {
        Some(name) => Some(id_for_vehicle(conn, name)?),
        None => None,
    };

    let rec = NewFuelLog {
        user_id: current_user(conn)?,
        timestamp,
        brand: normalize_brand(sub.get_one::<String>("brand").map_or("", |s| s.as_str())),
        cost,
        distance,
        fuel_amount,
        vehicle_id,
        location: location_from(sub)?,
    };
    let id = insert_log(conn, &rec)?;
    println!(
        "Recorded #{}: {:.2} l at '{}' for {:.2} on {} ({} mpg)",
        id,
        rec.fuel_amount,
        rec.brand,
        rec.cost,
        rec.timestamp.format("%Y-%m-%d %H:%M"),
        metrics::fuel_economy_mpg(rec.distance, rec.fuel_amount)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct LogRow {
    pub id: i64,
    pub timestamp: String,
    pub vehicle: String,
    pub brand: String,
    pub cost: f64,
    pub distance_km: f64,
    pub litres: f64,
    pub mpg: String,
    pub km_per_litre: String,
    pub litres_per_100km: String,
    pub cost_per_mile: String,
    pub price_per_litre: Option<f64>,
}

pub fn list_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<LogRow>> {
    let filter = LogFilter::from_matches(conn, sub)?;
    let limit = sub.get_one::<usize>("limit").copied();
    let logs = query_logs(conn, &filter, false, limit)?;
    let ccy = currency_symbol(conn)?;
    let names = vehicle_names(conn)?;

    Ok(logs
        .into_iter()
        .map(|l| {
            let e = &l.entry;
            LogRow {
                id: l.id,
                timestamp: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                vehicle: e
                    .vehicle_id
                    .and_then(|v| names.get(&v).cloned())
                    .unwrap_or_default(),
                brand: e.brand.clone(),
                cost: e.cost,
                distance_km: e.distance,
                litres: e.fuel_amount,
                mpg: metrics::fuel_economy_mpg(e.distance, e.fuel_amount),
                km_per_litre: metrics::km_per_litre_display(e.distance, e.fuel_amount),
                litres_per_100km: metrics::litres_per_100km_display(e.distance, e.fuel_amount),
                cost_per_mile: metrics::cost_per_mile_display(e.cost, e.distance, &ccy),
                price_per_litre: metrics::numeric_fuel_price(e.cost, e.fuel_amount),
            }
        })
        .collect())
}

fn vehicle_names(conn: &Connection) -> Result<std::collections::HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, name FROM vehicles")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = std::collections::HashMap::new();
    for row in rows {
        let (id, name) = row?;
        out.insert(id, name);
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = list_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.timestamp.clone(),
                    r.vehicle.clone(),
                    r.brand.clone(),
                    format!("{:.2}", r.cost),
                    format!("{:.1}", r.distance_km),
                    format!("{:.2}", r.litres),
                    r.mpg.clone(),
                    r.km_per_litre.clone(),
                    r.litres_per_100km.clone(),
                    r.cost_per_mile.clone(),
                    fmt_opt(r.price_per_litre, 3),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "When", "Vehicle", "Station", "Cost", "km", "Litres", "MPG", "km/L",
                    "L/100km", "Per mile", "Per litre"
                ],
                rows,
            )
        );
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid log id '{}'", raw))
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(required(sub, "id")?)?;
    let mut rec = conn
        .query_row(
            "SELECT id, user_id, timestamp, brand, cost, distance, fuel_amount, vehicle_id, latitude, longitude, accuracy FROM fuel_logs WHERE id=?1",
            params![id],
            log_from_row,
        )
        .with_context(|| format!("Fuel log #{} not found", id))?
        .entry;

    // each half of the timestamp keeps its stored value unless given
    let date = sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?;
    let time = sub.get_one::<String>("time").map(|s| parse_time(s)).transpose()?;
    rec.timestamp = date
        .unwrap_or(rec.timestamp.date())
        .and_time(time.unwrap_or(rec.timestamp.time()));
    if let Some(v) = sub.get_one::<String>("cost") {
        rec.cost = parse_positive(v, "cost")?;
    }
    if let Some(v) = sub.get_one::<String>("distance") {
        rec.distance = parse_positive(v, "distance")?;
    }
    if let Some(v) = sub.get_one::<String>("litres") {
        rec.fuel_amount = parse_positive(v, "litres")?;
    }
    if let Some(v) = sub.get_one::<String>("brand") {
        rec.brand = normalize_brand(v);
    }
    if let Some(name) = sub.get_one::<String>("vehicle") {
        rec.vehicle_id = Some(id_for_vehicle(conn, name)?);
    }
    if sub.get_flag("unassign") {
        rec.vehicle_id = None;
    }
    if sub.get_flag("clear_location") {
        rec.location = None;
    } else if let Some(loc) = location_from(sub)? {
        rec.location = Some(loc);
    }
    let (lat, lon, acc) = location_columns(rec.location);

    conn.execute(
        "UPDATE fuel_logs SET timestamp=?1, brand=?2, cost=?3, distance=?4, fuel_amount=?5, vehicle_id=?6, \
         latitude=?7, longitude=?8, accuracy=?9 WHERE id=?10",
        params![
            rec.timestamp,
            rec.brand,
            rec.cost,
            rec.distance,
            rec.fuel_amount,
            rec.vehicle_id,
            lat,
            lon,
            acc,
            id
        ],
    )?;
    println!("Updated fuel log #{}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(required(sub, "id")?)?;
    let n = conn.execute("DELETE FROM fuel_logs WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Fuel log #{} not found", id));
    }
    println!("Removed fuel log #{}", id);
    Ok(())
}
