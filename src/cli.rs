// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    ]
}

/// Filters shared by `log list`, `stats` and `export`.
fn filter_args() -> [Arg; 5] {
    [
        Arg::new("vehicle")
            .long("vehicle")
            .help("Only logs for this vehicle"),
        Arg::new("unassigned")
            .long("unassigned")
            .action(ArgAction::SetTrue)
            .conflicts_with("vehicle")
            .help("Only logs without a vehicle"),
        Arg::new("from")
            .long("from")
            .help("Earliest date, inclusive (YYYY-MM-DD)"),
        Arg::new("to")
            .long("to")
            .help("Latest date, inclusive (YYYY-MM-DD)"),
        Arg::new("brand")
            .long("brand")
            .help("Station name contains (case-insensitive)"),
    ]
}

fn location_args() -> [Arg; 3] {
    [
        Arg::new("lat")
            .long("lat")
            .requires("lon")
            .allow_hyphen_values(true),
        Arg::new("lon")
            .long("lon")
            .requires("lat")
            .allow_hyphen_values(true),
        Arg::new("accuracy")
            .long("accuracy")
            .requires("lat")
            .help("Metres"),
    ]
}

fn vehicle_details() -> [Arg; 3] {
    [
        Arg::new("make").long("make"),
        Arg::new("model").long("model"),
        Arg::new("year").long("year"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("fuelclip")
        .version(crate_version!())
        .about("Personal fuel log: refuels, vehicles, economy metrics, TSV import")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Use this database file instead of the default location"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More logging on stderr (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-user")
                        .about("User id attached to new records")
                        .arg(Arg::new("id").long("id").required(true)),
                )
                .subcommand(
                    Command::new("set-currency")
                        .about("Currency symbol used for cost per mile")
                        .arg(Arg::new("symbol").long("symbol").required(true)),
                ),
        )
        .subcommand(
            Command::new("vehicle")
                .about("Manage vehicles")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .args(vehicle_details()),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("rename").long("rename"))
                        .args(vehicle_details())
                        .arg(
                            Arg::new("clear_details")
                                .long("clear-details")
                                .action(ArgAction::SetTrue)
                                .conflicts_with_all(["make", "model", "year"])
                                .help("Remove make, model and year"),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a vehicle; its logs become unassigned")
                        .arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("log")
                .about("Record and browse refuels")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                        .arg(Arg::new("time").long("time").help("HH:MM"))
                        .arg(Arg::new("cost").long("cost").required(true))
                        .arg(
                            Arg::new("distance")
                                .long("distance")
                                .required(true)
                                .help("Kilometres since the last fill"),
                        )
                        .arg(Arg::new("litres").long("litres").required(true))
                        .arg(Arg::new("brand").long("brand"))
                        .arg(Arg::new("vehicle").long("vehicle"))
                        .args(location_args()),
                )
                .subcommand(
                    Command::new("list")
                        .args(filter_args())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        )
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("time").long("time"))
                        .arg(Arg::new("cost").long("cost"))
                        .arg(Arg::new("distance").long("distance"))
                        .arg(Arg::new("litres").long("litres"))
                        .arg(Arg::new("brand").long("brand"))
                        .arg(Arg::new("vehicle").long("vehicle"))
                        .arg(
                            Arg::new("unassign")
                                .long("unassign")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("vehicle"),
                        )
                        .args(location_args())
                        .arg(
                            Arg::new("clear_location")
                                .long("clear-location")
                                .action(ArgAction::SetTrue)
                                .conflicts_with_all(["lat", "lon", "accuracy"]),
                        ),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("import")
                .about("Bulk import")
                .subcommand(
                    Command::new("tsv")
                        .about("Import a tab-separated fuel history file")
                        .arg(Arg::new("path").long("path").required(true))
                        .arg(
                            Arg::new("vehicle")
                                .long("vehicle")
                                .help("Assign every imported record to this vehicle"),
                        )
                        .arg(
                            Arg::new("batch_size")
                                .long("batch-size")
                                .value_parser(value_parser!(usize))
                                .help("Records per atomic batch (max 499)"),
                        ),
                ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("logs")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv | json | tsv"),
                    )
                    .arg(Arg::new("out").long("out").required(true))
                    .args(filter_args()),
            ),
        )
        .subcommand(
            Command::new("stats")
                .about("Totals and chart series")
                .subcommand(
                    Command::new("summary")
                        .args(filter_args())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("chart")
                        .arg(
                            Arg::new("metric")
                                .long("metric")
                                .default_value("mpg")
                                .value_parser(["mpg", "price"]),
                        )
                        .args(filter_args())
                        .args(json_args()),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
}
