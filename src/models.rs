// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Brand stored when a station name is empty or missing.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Largest cost, distance or litre figure a fuel log may hold. Keeps money
/// totals inside what `rust_decimal::Decimal` can represent.
pub const MAX_QUANTITY: f64 = 1e9;

/// Finite, strictly positive and no larger than [`MAX_QUANTITY`].
pub fn quantity_in_range(v: f64) -> bool {
    v.is_finite() && v > 0.0 && v <= MAX_QUANTITY
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: i64,
    pub name: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>, // metres
}

impl Location {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.accuracy.is_none_or(|a| a.is_finite() && a >= 0.0)
    }
}

/// Split an optional location into its `(latitude, longitude, accuracy)` columns.
pub fn location_columns(loc: Option<Location>) -> (Option<f64>, Option<f64>, Option<f64>) {
    match loc {
        Some(l) => (Some(l.latitude), Some(l.longitude), l.accuracy),
        None => (None, None, None),
    }
}

/// A refuel event before the store has assigned it an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewFuelLog {
    pub user_id: String,
    pub timestamp: NaiveDateTime,
    pub brand: String,
    pub cost: f64,
    pub distance: f64,    // km since the previous fill
    pub fuel_amount: f64, // litres
    pub vehicle_id: Option<i64>,
    pub location: Option<Location>,
}

impl NewFuelLog {
    /// The three measured quantities are all in range.
    pub fn is_complete(&self) -> bool {
        [self.cost, self.distance, self.fuel_amount]
            .into_iter()
            .all(quantity_in_range)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelLog {
    pub id: i64,
    #[serde(flatten)]
    pub entry: NewFuelLog,
}

pub fn normalize_brand(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_BRAND.to_string()
    } else {
        trimmed.to_string()
    }
}
