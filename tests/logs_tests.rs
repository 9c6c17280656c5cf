// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fuelclip::{cli, commands::logs, db};
use rusqlite::{Connection, params};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute("INSERT INTO vehicles(id,name) VALUES (1,'Golf')", [])
        .unwrap();
    conn.execute("INSERT INTO vehicles(id,name) VALUES (2,'Van')", [])
        .unwrap();
    let rows: [(&str, &str, f64, f64, f64, Option<i64>); 4] = [
        ("2025-01-01 08:00:00", "Shell", 60.0, 500.0, 40.0, Some(1)),
        ("2025-01-10 09:30:00", "BP", 55.0, 450.0, 38.0, Some(2)),
        ("2025-02-01 18:00:00", "Shell Express", 62.5, 520.0, 41.0, Some(1)),
        ("2025-02-15 12:00:00", "Tesco", 30.0, 240.0, 20.0, None),
    ];
    for (ts, brand, cost, dist, litres, vid) in rows {
        conn.execute(
            "INSERT INTO fuel_logs(user_id,timestamp,brand,cost,distance,fuel_amount,vehicle_id) VALUES ('local',?1,?2,?3,?4,?5,?6)",
            params![ts, brand, cost, dist, litres, vid],
        )
        .unwrap();
    }
    conn
}

fn log_matches(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["fuelclip", "log"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    match matches.subcommand() {
        Some(("log", log_m)) => log_m.clone(),
        _ => panic!("no log subcommand"),
    }
}

fn list(conn: &Connection, args: &[&str]) -> Vec<logs::LogRow> {
    let mut full = vec!["list"];
    full.extend_from_slice(args);
    let m = log_matches(&full);
    let Some(("list", list_m)) = m.subcommand() else {
        panic!("no list subcommand");
    };
    logs::list_rows(conn, list_m).unwrap()
}

#[test]
fn list_is_newest_first_with_derived_columns() {
    let conn = setup();
    let rows = list(&conn, &[]);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].brand, "Tesco");
    assert_eq!(rows[0].vehicle, "");
    assert_eq!(rows[3].km_per_litre, "12.50");
    assert_eq!(rows[3].litres_per_100km, "8.00");
    assert_eq!(rows[3].vehicle, "Golf");
    assert!(rows[3].cost_per_mile.starts_with('£'));
    assert_eq!(rows[3].price_per_litre, Some(1.5));
}

#[test]
fn list_filters_combine() {
    let conn = setup();
    assert_eq!(list(&conn, &["--vehicle", "Golf"]).len(), 2);
    assert_eq!(list(&conn, &["--unassigned"]).len(), 1);
    assert_eq!(list(&conn, &["--brand", "shell"]).len(), 2);
    let feb = list(&conn, &["--from", "2025-02-01", "--to", "2025-02-28"]);
    assert_eq!(feb.len(), 2);
    let one = list(&conn, &["--vehicle", "Golf", "--to", "2025-01-31"]);
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].brand, "Shell");
    assert_eq!(list(&conn, &["--limit", "3"]).len(), 3);
}

#[test]
fn list_rejects_inverted_range() {
    let conn = setup();
    let m = log_matches(&["list", "--from", "2025-03-01", "--to", "2025-01-01"]);
    let Some(("list", list_m)) = m.subcommand() else {
        panic!("no list subcommand");
    };
    assert!(logs::list_rows(&conn, list_m).is_err());
}

#[test]
fn add_records_location_and_vehicle() {
    let conn = setup();
    let m = log_matches(&[
        "add", "--date", "2025-03-01", "--time", "07:45", "--cost", "70.10", "--distance",
        "610", "--litres", "45.2", "--brand", "  ", "--vehicle", "Van", "--lat", "-33.86",
        "--lon", "151.2", "--accuracy", "12",
    ]);
    logs::handle(&conn, &m).unwrap();

    let (ts, brand, vid, lat, lon, acc): (String, String, Option<i64>, f64, f64, f64) = conn
        .query_row(
            "SELECT timestamp, brand, vehicle_id, latitude, longitude, accuracy FROM fuel_logs ORDER BY id DESC LIMIT 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
        )
        .unwrap();
    assert!(ts.starts_with("2025-03-01 07:45"));
    assert_eq!(brand, "Unknown");
    assert_eq!(vid, Some(2));
    assert_eq!((lat, lon, acc), (-33.86, 151.2, 12.0));
}

#[test]
fn add_rejects_non_positive_quantities() {
    let conn = setup();
    for (cost, dist, litres) in [("0", "100", "10"), ("10", "inf", "10"), ("10", "100", "abc")] {
        let m = log_matches(&[
            "add", "--cost", cost, "--distance", dist, "--litres", litres,
        ]);
        assert!(logs::handle(&conn, &m).is_err());
    }
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM fuel_logs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 4);
}

#[test]
fn add_rejects_out_of_range_latitude() {
    let conn = setup();
    let m = log_matches(&[
        "add", "--cost", "10", "--distance", "100", "--litres", "8", "--lat", "95", "--lon", "0",
    ]);
    let err = logs::handle(&conn, &m).unwrap_err();
    assert!(err.to_string().contains("latitude"));
}

#[test]
fn edit_updates_fields_and_unassigns() {
    let conn = setup();
    let m = log_matches(&[
        "edit", "--id", " 1 ", "--cost", "61.5", "--date", "2025-01-02", "--unassign",
    ]);
    logs::handle(&conn, &m).unwrap();
    let (ts, cost, vid): (String, f64, Option<i64>) = conn
        .query_row(
            "SELECT timestamp, cost, vehicle_id FROM fuel_logs WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert!(ts.starts_with("2025-01-02 08:00"));
    assert_eq!(cost, 61.5);
    assert_eq!(vid, None);

    let bad = log_matches(&["edit", "--id", "1", "--litres", "0"]);
    assert!(logs::handle(&conn, &bad).is_err());

    let located = log_matches(&[
        "edit", "--id", "1", "--lat", "51.5", "--lon", "-0.12", "--accuracy", "5",
    ]);
    logs::handle(&conn, &located).unwrap();
    let (lat, lon, acc, cost): (Option<f64>, Option<f64>, Option<f64>, f64) = conn
        .query_row(
            "SELECT latitude, longitude, accuracy, cost FROM fuel_logs WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .unwrap();
    assert_eq!((lat, lon, acc), (Some(51.5), Some(-0.12), Some(5.0)));
    assert_eq!(cost, 61.5);

    let out_of_range = log_matches(&["edit", "--id", "1", "--lat", "91", "--lon", "0"]);
    assert!(logs::handle(&conn, &out_of_range).is_err());

    logs::handle(&conn, &log_matches(&["edit", "--id", "1", "--clear-location"])).unwrap();
    let cleared: (Option<f64>, Option<f64>, Option<f64>) = conn
        .query_row(
            "SELECT latitude, longitude, accuracy FROM fuel_logs WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(cleared, (None, None, None));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn limit_beyond_sqlite_range_is_an_error() {
    let conn = setup();
    let err = logs::query_logs(&conn, &logs::LogFilter::default(), false, Some(usize::MAX))
        .unwrap_err();
    assert!(err.to_string().contains("too large"));
}

#[test]
fn rm_deletes_and_reports_missing() {
    let conn = setup();
    logs::handle(&conn, &log_matches(&["rm", "--id", "2"])).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM fuel_logs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 3);
    let err = logs::handle(&conn, &log_matches(&["rm", "--id", "2"])).unwrap_err();
    assert!(err.to_string().contains("#2 not found"));
}
