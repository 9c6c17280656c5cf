// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fuelclip::commands::{doctor, logs, stats};
use fuelclip::{db, utils};
use fuelclip::models::{FuelLog, MAX_QUANTITY, NewFuelLog};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn log(id: i64, day: u32, cost: f64, distance: f64, litres: f64) -> FuelLog {
    FuelLog {
        id,
        entry: NewFuelLog {
            user_id: "local".into(),
            timestamp: NaiveDate::from_ymd_opt(2025, 3, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            brand: "BP".into(),
            cost,
            distance,
            fuel_amount: litres,
            vehicle_id: None,
            location: None,
        },
    }
}

#[test]
fn summary_uses_totals() {
    let logs = vec![log(1, 1, 60.10, 500.0, 40.0), log(2, 9, 39.90, 300.0, 25.0)];
    let s = stats::summarize(&logs).unwrap();
    assert_eq!(s.fills, 2);
    assert_eq!(s.total_cost, Decimal::new(10000, 2));
    assert_eq!(s.total_distance_km, 800.0);
    assert_eq!(s.total_litres, 65.0);
    let kpl = s.km_per_litre.unwrap();
    assert!((kpl - 800.0 / 65.0).abs() < 1e-9);
    let price = s.avg_price_per_litre.unwrap();
    assert!((price - 100.0 / 65.0).abs() < 1e-9);
}

#[test]
fn empty_summary_has_no_ratios() {
    let s = stats::summarize(&[]).unwrap();
    assert_eq!(s.fills, 0);
    assert_eq!(s.total_cost, Decimal::ZERO);
    assert_eq!(s.mpg, None);
    assert_eq!(s.cost_per_mile, None);
}

#[test]
fn chart_series_keeps_gaps_as_null() {
    let logs = vec![log(1, 1, 60.0, 500.0, 40.0), log(2, 2, 10.0, 0.0, 5.0)];
    let points = stats::chart_series(&logs, "mpg");
    assert!(points[0].value.is_some());
    assert_eq!(points[1].value, None);
    let as_json = serde_json::to_value(&points).unwrap();
    assert!(as_json[1]["value"].is_null());

    let prices = stats::chart_series(&logs, "price");
    assert_eq!(prices[0].value, Some(1.5));
    assert_eq!(prices[1].value, Some(2.0));

    let mpg_cells = stats::chart_rows(&points, "mpg");
    assert_eq!(mpg_cells[0][1], format!("{:.2}", points[0].value.unwrap()));
    assert_eq!(mpg_cells[1][1], "-");
    let price_cells = stats::chart_rows(&prices, "price");
    assert_eq!(price_cells[0][1], "1.500");
}

#[test]
fn chart_over_stored_logs_is_oldest_first() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO fuel_logs(user_id,timestamp,brand,cost,distance,fuel_amount) VALUES
            ('local','2025-03-09 10:00:00','BP',40,300,30),
            ('local','2025-03-01 10:00:00','BP',60,500,40);
        "#,
    )
    .unwrap();
    let found = logs::query_logs(&conn, &logs::LogFilter::default(), true, None).unwrap();
    let points = stats::chart_series(&found, "price");
    assert_eq!(points[0].timestamp, "2025-03-01 10:00");
    assert_eq!(points[1].timestamp, "2025-03-09 10:00");
}

#[test]
fn doctor_flags_dangling_vehicle_refs() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = OFF;
        INSERT INTO fuel_logs(user_id,timestamp,brand,cost,distance,fuel_amount,vehicle_id) VALUES
            ('local','2025-03-01 10:00:00','BP',60,500,40,42);
        "#,
    )
    .unwrap();
    let issues = doctor::find_issues(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "orphaned_vehicle_ref");
    assert!(issues[0][1].contains("vehicle 42"));
}

#[test]
fn summary_handles_largest_accepted_cost() {
    let logs = vec![
        log(1, 1, MAX_QUANTITY, 500.0, 40.0),
        log(2, 2, MAX_QUANTITY, 500.0, 40.0),
    ];
    let s = stats::summarize(&logs).unwrap();
    assert_eq!(s.total_cost, Decimal::new(2_000_000_000, 0));
    assert!(utils::parse_positive("1e30", "cost").is_err());
    assert!(utils::parse_positive("1000000000", "cost").is_ok());
}

#[test]
fn doctor_flags_quantities_written_around_validation() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO fuel_logs(user_id,timestamp,brand,cost,distance,fuel_amount) VALUES ('local','2025-03-01 10:00:00','BP',1e30,500,40)",
        [],
    )
    .unwrap();
    let issues = doctor::find_issues(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "quantity_out_of_range");
}
