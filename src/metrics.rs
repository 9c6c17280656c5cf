// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fuel economy and cost metrics.
//!
//! Inputs are kilometres, litres and currency units. The numeric functions
//! return `None` when an input is outside its domain; the `*_display`
//! functions render that as [`NOT_AVAILABLE`] for tables.

pub const LITRES_TO_UK_GALLONS: f64 = 4.54609;
pub const KM_TO_MILES: f64 = 1.0 / 1.60934;

pub const NOT_AVAILABLE: &str = "N/A";

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Miles per UK gallon.
pub fn mpg(distance: f64, fuel_amount: f64) -> Option<f64> {
    if !positive(distance) || !positive(fuel_amount) {
        return None;
    }
    finite((distance * KM_TO_MILES) / (fuel_amount / LITRES_TO_UK_GALLONS))
}

pub fn cost_per_mile(cost: f64, distance: f64) -> Option<f64> {
    if !positive(cost) || !positive(distance) {
        return None;
    }
    finite(cost / (distance * KM_TO_MILES))
}

pub fn km_per_litre(distance: f64, fuel_amount: f64) -> Option<f64> {
    if !positive(distance) || !positive(fuel_amount) {
        return None;
    }
    finite(distance / fuel_amount)
}

pub fn litres_per_100km(distance: f64, fuel_amount: f64) -> Option<f64> {
    if !positive(distance) || !positive(fuel_amount) {
        return None;
    }
    finite((fuel_amount / distance) * 100.0)
}

/// Price paid per litre.
pub fn fuel_price(cost: f64, fuel_amount: f64) -> Option<f64> {
    if !positive(cost) || !positive(fuel_amount) {
        return None;
    }
    finite(cost / fuel_amount)
}

// Chart series use these; a gap must stay `None` rather than become zero.
pub fn numeric_mpg(distance: f64, fuel_amount: f64) -> Option<f64> {
    mpg(distance, fuel_amount)
}

pub fn numeric_fuel_price(cost: f64, fuel_amount: f64) -> Option<f64> {
    fuel_price(cost, fuel_amount)
}

pub fn render(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn fuel_economy_mpg(distance: f64, fuel_amount: f64) -> String {
    render(mpg(distance, fuel_amount), 2)
}

pub fn cost_per_mile_display(cost: f64, distance: f64, currency: &str) -> String {
    match cost_per_mile(cost, distance) {
        Some(v) => format!("{}{:.3}", currency, v),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn km_per_litre_display(distance: f64, fuel_amount: f64) -> String {
    render(km_per_litre(distance, fuel_amount), 2)
}

pub fn litres_per_100km_display(distance: f64, fuel_amount: f64) -> String {
    render(litres_per_100km(distance, fuel_amount), 2)
}
