// ABOUTME: Structured records produced by the food stats, recipe and shopping list chains
// ABOUTME: Re-exports FoodDetails, RecipeDetails and ShoppingList with their nested types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Records
//!
//! Field doc comments double as the field descriptions in the generated JSON
//! Schema, so they are written for the model as much as for the reader.
//!
//! The schema handed to the model forbids extra fields, but parsing ignores
//! them and accepts whole numbers written as `4.0` or `"4"`.

mod food;
mod recipe;
mod shopping;

pub use food::{FoodDetails, Portion};
pub use recipe::{Ingredient, RecipeDetails};
pub use shopping::{Item, ShoppingList};

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::AppResult;
use crate::schema::{require_amount, require_non_empty};

/// Nutrient name to amount
pub type Nutrients = BTreeMap<String, f64>;

/// Case-insensitive nutrient lookup
fn find_nutrient(nutrients: &Nutrients, name: &str) -> Option<f64> {
    nutrients
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, amount)| *amount)
}

fn validate_nutrients(record: &str, nutrients: &Nutrients) -> AppResult<()> {
    for (name, amount) in nutrients {
        require_non_empty(record, "nutrient name", name)?;
        require_amount(record, &format!("nutrients.{name}"), *amount)?;
    }
    Ok(())
}

/// Accept a whole number given as an integer, an integral float or a numeric string
fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|n| {
            n.is_finite() && n.fract().abs() < f64::EPSILON && (0.0..=f64::from(u32::MAX)).contains(n)
        })
        .map(|n| n as u32)
        .ok_or_else(|| D::Error::custom(format!("expected a whole number, got {value}")))
}
