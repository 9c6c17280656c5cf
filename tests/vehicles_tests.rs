// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fuelclip::{cli, commands::vehicles, db};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["fuelclip", "vehicle"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    if let Some(("vehicle", m)) = matches.subcommand() {
        vehicles::handle(conn, m)
    } else {
        panic!("no vehicle subcommand");
    }
}

#[test]
fn add_edit_and_list() {
    let mut conn = setup();
    run(
        &mut conn,
        &["add", "--name", " Golf ", "--make", "VW", "--year", "2019"],
    )
    .unwrap();
    run(
        &mut conn,
        &["edit", "--name", "Golf", "--rename", "Golf GTI", "--model", "Mk7"],
    )
    .unwrap();

    let rows = vehicles::list_vehicles(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    let v = &rows[0].vehicle;
    assert_eq!(v.name, "Golf GTI");
    assert_eq!(v.make.as_deref(), Some("VW"));
    assert_eq!(v.model.as_deref(), Some("Mk7"));
    assert_eq!(v.year, Some(2019));
    assert_eq!(rows[0].logs, 0);
}

#[test]
fn duplicate_names_and_bad_years_are_rejected() {
    let mut conn = setup();
    run(&mut conn, &["add", "--name", "Van"]).unwrap();
    assert!(run(&mut conn, &["add", "--name", "Van"]).is_err());
    let err = run(&mut conn, &["add", "--name", "Car", "--year", "twenty"]).unwrap_err();
    assert!(err.to_string().contains("Invalid year 'twenty'"));
}

#[test]
fn removing_a_vehicle_unassigns_its_logs() {
    let mut conn = setup();
    conn.execute_batch(
        r#"
        INSERT INTO vehicles(id,name) VALUES (1,'Golf'), (2,'Van');
        INSERT INTO fuel_logs(user_id,timestamp,brand,cost,distance,fuel_amount,vehicle_id) VALUES
            ('local','2025-01-01 00:00:00','BP',50,400,35,1),
            ('local','2025-01-08 00:00:00','BP',52,410,36,1),
            ('local','2025-01-09 00:00:00','BP',70,500,50,2);
        "#,
    )
    .unwrap();

    let unassigned = vehicles::remove(&mut conn, "Golf").unwrap();
    assert_eq!(unassigned, 2);

    let (logs, orphaned): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), SUM(vehicle_id IS NULL) FROM fuel_logs",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(logs, 3);
    assert_eq!(orphaned, 2);

    let rows = vehicles::list_vehicles(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].vehicle.name, "Van");
    assert_eq!(rows[0].logs, 1);
}

#[test]
fn removing_unknown_vehicle_fails() {
    let mut conn = setup();
    let err = run(&mut conn, &["rm", "--name", "Ghost"]).unwrap_err();
    assert!(err.to_string().contains("Vehicle 'Ghost' not found"));
}

#[test]
fn failed_edit_changes_nothing() {
    let mut conn = setup();
    run(&mut conn, &["add", "--name", "Golf", "--make", "Ford"]).unwrap();
    let err = run(
        &mut conn,
        &[
            "edit", "--name", "Golf", "--rename", "GTI", "--make", "VW", "--year", "abc",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid year 'abc'"));

    let rows = vehicles::list_vehicles(&conn).unwrap();
    assert_eq!(rows[0].vehicle.name, "Golf");
    assert_eq!(rows[0].vehicle.make.as_deref(), Some("Ford"));
}

#[test]
fn clear_details_resets_make_model_and_year() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "add", "--name", "Van", "--make", "Ford", "--model", "Transit", "--year", "2015",
        ],
    )
    .unwrap();
    run(&mut conn, &["edit", "--name", "Van", "--clear-details"]).unwrap();

    let v = &vehicles::list_vehicles(&conn).unwrap()[0].vehicle;
    assert_eq!(v.name, "Van");
    assert_eq!(v.make, None);
    assert_eq!(v.model, None);
    assert_eq!(v.year, None);
}
