// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::MAX_QUANTITY;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{Connection, params};

/// Problems found in stored data, as (issue, detail) pairs.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Logs pointing at a vehicle that no longer exists
    let mut stmt = conn.prepare(
        "SELECT f.id, f.vehicle_id FROM fuel_logs f
         LEFT JOIN vehicles v ON f.vehicle_id=v.id
         WHERE f.vehicle_id IS NOT NULL AND v.id IS NULL ORDER BY f.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let vid: i64 = r.get(1)?;
        rows.push(vec![
            "orphaned_vehicle_ref".into(),
            format!("log #{} -> vehicle {}", id, vid),
        ]);
    }

    // 2) Quantities outside (0, MAX_QUANTITY]; only reachable if validation was bypassed
    let mut stmt2 = conn.prepare(
        "SELECT id, cost, distance, fuel_amount FROM fuel_logs
         WHERE NOT (cost > 0 AND cost <= ?1 AND distance > 0 AND distance <= ?1
                    AND fuel_amount > 0 AND fuel_amount <= ?1) ORDER BY id",
    )?;
    let mut cur2 = stmt2.query(params![MAX_QUANTITY])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let cost: f64 = r.get(1)?;
        let dist: f64 = r.get(2)?;
        let litres: f64 = r.get(3)?;
        rows.push(vec![
            "quantity_out_of_range".into(),
            format!(
                "log #{} cost={} distance={} litres={}",
                id, cost, dist, litres
            ),
        ]);
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
