// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Writing parsed fuel logs to storage in bounded, atomic batches.

use crate::models::{NewFuelLog, location_columns};
use crate::tsv::{ParseOutcome, parse_import};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};
use std::fmt;
use tracing::{debug, info, warn};

/// Most write operations the store accepts in one atomic batch.
pub const BATCH_CEILING: usize = 500;
/// Records per batch, one below the ceiling.
pub const BATCH_SIZE: usize = BATCH_CEILING - 1;

/// Anything that can atomically persist a batch of fuel logs.
pub trait LogStore {
    /// Persist every record or none of them. Returns how many were written.
    fn commit_batch(&mut self, batch: &[NewFuelLog]) -> Result<usize>;
}

pub fn insert_log(conn: &Connection, rec: &NewFuelLog) -> Result<i64> {
    if !rec.is_complete() {
        return Err(anyhow!(
            "Refusing to store incomplete fuel log (cost={}, distance={}, litres={})",
            rec.cost,
            rec.distance,
            rec.fuel_amount
        ));
    }
    if rec.location.is_some_and(|loc| !loc.is_valid()) {
        return Err(anyhow!("Refusing to store out-of-range location"));
    }
    let (lat, lon, acc) = location_columns(rec.location);
    conn.execute(
        "INSERT INTO fuel_logs(user_id, timestamp, brand, cost, distance, fuel_amount, vehicle_id, latitude, longitude, accuracy) \
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
        params![
            rec.user_id,
            rec.timestamp,
            rec.brand,
            rec.cost,
            rec.distance,
            rec.fuel_amount,
            rec.vehicle_id,
            lat,
            lon,
            acc
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl LogStore for Connection {
    fn commit_batch(&mut self, batch: &[NewFuelLog]) -> Result<usize> {
        let tx = self.transaction()?;
        for rec in batch {
            insert_log(&tx, rec)
                .with_context(|| format!("Insert fuel log dated {}", rec.timestamp))?;
        }
        tx.commit()?;
        Ok(batch.len())
    }
}

/// Where an import currently stands. Once `Importing` starts it runs to a
/// terminal phase; there is no cancellation.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportPhase {
    Idle,
    Reading,
    Parsing,
    Importing {
        batch: usize,
        batches: usize,
        committed: usize,
        total: usize,
    },
    Success {
        imported: usize,
    },
    NothingToImport,
    Failed(String),
}

impl ImportPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportPhase::Success { .. } | ImportPhase::NothingToImport | ImportPhase::Failed(_)
        )
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportPhase::Idle => write!(f, "idle"),
            ImportPhase::Reading => write!(f, "reading file"),
            ImportPhase::Parsing => write!(f, "parsing rows"),
            ImportPhase::Importing {
                batch,
                batches,
                committed,
                total,
            } => write!(f, "batch {}/{}: imported {}/{}", batch, batches, committed, total),
            ImportPhase::Success { imported } => write!(f, "imported {} records", imported),
            ImportPhase::NothingToImport => write!(f, "nothing to import"),
            ImportPhase::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

/// Commit `records` in chunks of `batch_size`, one chunk after another.
///
/// A failing chunk ends the import with `Failed`; chunks committed before it
/// stay committed.
pub fn commit_in_batches<S, F>(
    store: &mut S,
    records: &[NewFuelLog],
    batch_size: usize,
    mut observe: F,
) -> ImportPhase
where
    S: LogStore + ?Sized,
    F: FnMut(&ImportPhase),
{
    if records.is_empty() {
        let phase = ImportPhase::NothingToImport;
        observe(&phase);
        return phase;
    }
    let size = batch_size.clamp(1, BATCH_SIZE);
    let total = records.len();
    let batches = total.div_ceil(size);
    let mut committed = 0;

    for (i, chunk) in records.chunks(size).enumerate() {
        match store.commit_batch(chunk) {
            Ok(n) => {
                committed += n;
                debug!(batch = i + 1, batches, committed, total, "batch committed");
                observe(&ImportPhase::Importing {
                    batch: i + 1,
                    batches,
                    committed,
                    total,
                });
            }
            Err(err) => {
                warn!(batch = i + 1, committed, "batch failed: {:#}", err);
                let phase = ImportPhase::Failed(format!(
                    "batch {}/{} failed after {} of {} records: {:#}",
                    i + 1,
                    batches,
                    committed,
                    total,
                    err
                ));
                observe(&phase);
                return phase;
            }
        }
    }

    info!(imported = committed, "import finished");
    let phase = ImportPhase::Success {
        imported: committed,
    };
    observe(&phase);
    phase
}

/// Render a rejected parse as one message: the first few row errors and the total.
pub fn rejection_message(errors: &[crate::tsv::RowError], total: usize) -> String {
    let mut msg = format!("{} row(s) failed validation; nothing was imported", total);
    for e in errors {
        msg.push_str("\n  ");
        msg.push_str(&e.to_string());
    }
    if total > errors.len() {
        msg.push_str(&format!("\n  ... and {} more", total - errors.len()));
    }
    msg
}

/// Parse `text` and, if every row is valid, commit it in batches.
///
/// `prepare` runs on the parsed records before anything is written.
pub fn run_import<S, P, F>(
    store: &mut S,
    text: &str,
    user_id: &str,
    batch_size: usize,
    mut prepare: P,
    mut observe: F,
) -> Result<ImportPhase>
where
    S: LogStore + ?Sized,
    P: FnMut(&mut NewFuelLog),
    F: FnMut(&ImportPhase),
{
    observe(&ImportPhase::Parsing);
    let outcome = match parse_import(text, user_id) {
        Ok(o) => o,
        Err(err) => {
            let phase = ImportPhase::Failed(err.to_string());
            observe(&phase);
            return Err(anyhow!(err));
        }
    };
    match outcome {
        ParseOutcome::Ready(mut records) => {
            records.iter_mut().for_each(&mut prepare);
            Ok(commit_in_batches(store, &records, batch_size, observe))
        }
        ParseOutcome::Rejected { errors, total } => {
            let phase = ImportPhase::Failed(rejection_message(&errors, total));
            observe(&phase);
            Ok(phase)
        }
        ParseOutcome::NothingToImport => {
            observe(&ImportPhase::NothingToImport);
            Ok(ImportPhase::NothingToImport)
        }
    }
}
