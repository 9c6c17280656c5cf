// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Tab-separated fuel history parser.
//!
//! The first non-blank line is a header naming at least the columns in
//! [`REQUIRED_COLUMNS`] (any order, case-insensitive). Every following line is
//! one refuel. Parsing never touches the database: the caller decides what to
//! do with the [`ParseOutcome`].

use crate::models::{NewFuelLog, normalize_brand, quantity_in_range};
use chrono::{Datelike, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub const COL_DATE: &str = "Date";
pub const COL_LITRES: &str = "Litres";
pub const COL_COST: &str = "Total Cost";
pub const COL_GARAGE: &str = "Garage";
pub const COL_DISTANCE: &str = "Distance since fueled";

pub const REQUIRED_COLUMNS: [&str; 5] = [COL_DATE, COL_LITRES, COL_COST, COL_GARAGE, COL_DISTANCE];

/// How many row errors a rejected import reports back.
pub const MAX_REPORTED_ERRORS: usize = 5;

static DMY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{4})$").expect("valid date pattern"));

/// Problems that stop the whole import before any row is read.
#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    #[error("File must contain a header row and at least one data row")]
    TooFewLines,
    #[error("Missing required column '{0}' in header")]
    MissingColumn(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowErrorKind {
    #[error("insufficient columns")]
    InsufficientColumns,
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("invalid {column} value '{raw}'")]
    InvalidNumber { column: &'static str, raw: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based position among non-blank lines; the header is row 1.
    pub row: usize,
    pub kind: RowErrorKind,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    Valid(NewFuelLog),
    Invalid(RowError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Ready(Vec<NewFuelLog>),
    /// At least one row failed. `errors` holds the first few, `total` counts all.
    Rejected { errors: Vec<RowError>, total: usize },
    NothingToImport,
}

/// Parse a day-first date (`D/M/YYYY`, `DD-MM-YYYY`, ...).
///
/// Impossible calendar dates such as `31/02/2023` yield `None`.
pub fn parse_dmy_date(raw: &str) -> Option<NaiveDate> {
    let caps = DMY.captures(raw.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    // read back, never accept a rolled-over date
    if date.day() != day || date.month() != month || date.year() != year {
        return None;
    }
    Some(date)
}

struct ColumnIndex {
    date: usize,
    litres: usize,
    cost: usize,
    garage: usize,
    distance: usize,
}

impl ColumnIndex {
    fn resolve(header_line: &str) -> Result<Self, ImportError> {
        let mut lookup: HashMap<String, usize> = HashMap::new();
        for (i, cell) in header_line.split('\t').enumerate() {
            // first occurrence wins
            lookup.entry(cell.trim().to_lowercase()).or_insert(i);
        }
        let find = |name: &str| {
            lookup
                .get(&name.to_lowercase())
                .copied()
                .ok_or_else(|| ImportError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            date: find(COL_DATE)?,
            litres: find(COL_LITRES)?,
            cost: find(COL_COST)?,
            garage: find(COL_GARAGE)?,
            distance: find(COL_DISTANCE)?,
        })
    }
}

fn positive_number(fields: &[&str], idx: usize, column: &'static str) -> Result<f64, RowErrorKind> {
    let raw = fields.get(idx).map(|s| s.trim()).unwrap_or("");
    match raw.parse::<f64>() {
        Ok(v) if quantity_in_range(v) => Ok(v),
        _ => Err(RowErrorKind::InvalidNumber {
            column,
            raw: raw.to_string(),
        }),
    }
}

fn parse_line(line: &str, cols: &ColumnIndex, user_id: &str) -> Result<NewFuelLog, RowErrorKind> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < REQUIRED_COLUMNS.len() {
        return Err(RowErrorKind::InsufficientColumns);
    }
    let date_raw = fields.get(cols.date).map(|s| s.trim()).unwrap_or("");
    let date =
        parse_dmy_date(date_raw).ok_or_else(|| RowErrorKind::InvalidDate(date_raw.to_string()))?;
    let fuel_amount = positive_number(&fields, cols.litres, COL_LITRES)?;
    let cost = positive_number(&fields, cols.cost, COL_COST)?;
    let distance = positive_number(&fields, cols.distance, COL_DISTANCE)?;
    let garage = fields.get(cols.garage).copied().unwrap_or("");

    Ok(NewFuelLog {
        user_id: user_id.to_string(),
        timestamp: date.and_time(NaiveTime::MIN),
        brand: normalize_brand(garage),
        cost,
        distance,
        fuel_amount,
        vehicle_id: None,
        location: None,
    })
}

/// Split the text into rows and parse each one independently.
pub fn parse_rows(text: &str, user_id: &str) -> Result<Vec<ParsedRow>, ImportError> {
    // spreadsheet exports often lead with a byte-order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(ImportError::TooFewLines);
    }
    let cols = ColumnIndex::resolve(lines[0])?;

    let rows = lines
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, line)| match parse_line(line, &cols, user_id) {
            Ok(rec) => ParsedRow::Valid(rec),
            Err(kind) => ParsedRow::Invalid(RowError { row: i + 1, kind }),
        })
        .collect();
    Ok(rows)
}

/// Parse and apply the all-or-nothing policy: any bad row rejects the file.
pub fn parse_import(text: &str, user_id: &str) -> Result<ParseOutcome, ImportError> {
    let mut valid = Vec::new();
    let mut errors = Vec::new();
    for row in parse_rows(text, user_id)? {
        match row {
            ParsedRow::Valid(rec) => valid.push(rec),
            ParsedRow::Invalid(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        let total = errors.len();
        errors.truncate(MAX_REPORTED_ERRORS);
        return Ok(ParseOutcome::Rejected { errors, total });
    }
    if valid.is_empty() {
        return Ok(ParseOutcome::NothingToImport);
    }
    Ok(ParseOutcome::Ready(valid))
}
