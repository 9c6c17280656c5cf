// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{BATCH_SIZE, ImportPhase, run_import};
use crate::utils::{current_user, id_for_vehicle, required};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("tsv", sub)) => import_tsv(conn, sub),
        _ => Ok(()),
    }
}

fn import_tsv(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = required(sub, "path")?.trim();
    let batch_size = sub
        .get_one::<usize>("batch_size")
        .copied()
        .unwrap_or(BATCH_SIZE);
    let vehicle_id = match sub.get_one::<String>("vehicle") {
        Some(name) => Some(id_for_vehicle(conn, name)?),
        None => None,
    };
    let user_id = current_user(conn)?;

    let mut advance = |next: &ImportPhase| {
        info!(phase = %next, "import");
        if let ImportPhase::Importing {
            committed, total, ..
        } = next
        {
            println!("Imported {}/{}", committed, total);
        }
    };

    advance(&ImportPhase::Reading);
    let text = std::fs::read_to_string(path).with_context(|| format!("Read TSV {}", path))?;

    let end = run_import(
        conn,
        &text,
        &user_id,
        batch_size,
        |rec| rec.vehicle_id = vehicle_id,
        &mut advance,
    )?;

    match end {
        ImportPhase::Success { imported } => {
            println!("Imported {} fuel log(s) from {}", imported, path);
            Ok(())
        }
        ImportPhase::NothingToImport => {
            println!("Nothing to import from {}", path);
            Ok(())
        }
        ImportPhase::Failed(msg) => Err(anyhow!("Import of {} failed: {}", path, msg)),
        other => Err(anyhow!("Import of {} stopped in phase '{}'", path, other)),
    }
}
