// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{currency_symbol, current_user, pretty_table, required, set_setting};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-user", sub)) => {
            let id = required(sub, "id")?.trim();
            if id.is_empty() {
                return Err(anyhow!("User id must not be empty"));
            }
            set_setting(conn, "user_id", id)?;
            println!("New records will be tagged with user '{}'", id);
        }
        Some(("set-currency", sub)) => {
            let symbol = required(sub, "symbol")?.trim();
            set_setting(conn, "currency", symbol)?;
            println!("Currency symbol set to '{}'", symbol);
        }
        _ => {
            let rows = vec![
                vec!["user_id".to_string(), current_user(conn)?],
                vec!["currency".to_string(), currency_symbol(conn)?],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
    }
    Ok(())
}
