// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Vehicle;
use crate::utils::{id_for_vehicle, maybe_print_json, pretty_table, required};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let name = required(sub, "name")?.trim();
            let unassigned = remove(conn, name)?;
            println!(
                "Removed vehicle '{}' ({} fuel log(s) now unassigned)",
                name, unassigned
            );
        }
        _ => {}
    }
    Ok(())
}

fn opt_text(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn opt_year(sub: &clap::ArgMatches) -> Result<Option<i32>> {
    sub.get_one::<String>("year")
        .map(|s| {
            s.trim()
                .parse::<i32>()
                .with_context(|| format!("Invalid year '{}'", s))
        })
        .transpose()
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?.trim();
    if name.is_empty() {
        return Err(anyhow!("Vehicle name must not be empty"));
    }
    let make = opt_text(sub, "make");
    let model = opt_text(sub, "model");
    let year = opt_year(sub)?;
    conn.execute(
        "INSERT INTO vehicles(name, make, model, year) VALUES (?1, ?2, ?3, ?4)",
        params![name, make, model, year],
    )
    .with_context(|| format!("Add vehicle '{}'", name))?;
    println!("Added vehicle '{}'", name);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct VehicleRow {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub logs: i64,
}

pub fn list_vehicles(conn: &Connection) -> Result<Vec<VehicleRow>> {
    let mut stmt = conn.prepare(
        "SELECT v.id, v.name, v.make, v.model, v.year, COUNT(f.id)
         FROM vehicles v LEFT JOIN fuel_logs f ON f.vehicle_id=v.id
         GROUP BY v.id ORDER BY v.name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(VehicleRow {
            vehicle: Vehicle {
                id: r.get(0)?,
                name: r.get(1)?,
                make: r.get(2)?,
                model: r.get(3)?,
                year: r.get(4)?,
            },
            logs: r.get(5)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = list_vehicles(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                let v = &r.vehicle;
                vec![
                    v.name.clone(),
                    v.make.clone().unwrap_or_default(),
                    v.model.clone().unwrap_or_default(),
                    v.year.map(|y| y.to_string()).unwrap_or_default(),
                    r.logs.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Name", "Make", "Model", "Year", "Logs"], rows)
        );
    }
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?.trim();
    let id = id_for_vehicle(conn, name)?;
    // validate everything before the first write
    let rename = opt_text(sub, "rename");
    let make = opt_text(sub, "make");
    let model = opt_text(sub, "model");
    let year = opt_year(sub)?;
    let clear = sub.get_flag("clear_details");

    let tx = conn.transaction()?;
    if clear {
        tx.execute(
            "UPDATE vehicles SET make=NULL, model=NULL, year=NULL WHERE id=?1",
            params![id],
        )?;
    }
    if let Some(new_name) = &rename {
        tx.execute(
            "UPDATE vehicles SET name=?1 WHERE id=?2",
            params![new_name, id],
        )
        .with_context(|| format!("Rename vehicle '{}' to '{}'", name, new_name))?;
    }
    if let Some(make) = make {
        tx.execute("UPDATE vehicles SET make=?1 WHERE id=?2", params![make, id])?;
    }
    if let Some(model) = model {
        tx.execute("UPDATE vehicles SET model=?1 WHERE id=?2", params![model, id])?;
    }
    if let Some(year) = year {
        tx.execute("UPDATE vehicles SET year=?1 WHERE id=?2", params![year, id])?;
    }
    tx.commit()?;
    println!("Updated vehicle '{}'", rename.as_deref().unwrap_or(name));
    Ok(())
}

/// Delete a vehicle and unassign its fuel logs. Returns how many logs were unassigned.
pub fn remove(conn: &mut Connection, name: &str) -> Result<usize> {
    let id = id_for_vehicle(conn, name)?;
    let tx = conn.transaction()?;
    let unassigned = tx.execute(
        "UPDATE fuel_logs SET vehicle_id=NULL WHERE vehicle_id=?1",
        params![id],
    )?;
    tx.execute("DELETE FROM vehicles WHERE id=?1", params![id])?;
    tx.commit()?;
    info!(vehicle = name, unassigned, "vehicle deleted");
    Ok(unassigned)
}
