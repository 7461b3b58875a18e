// ABOUTME: FoodDetails record returned by the nutrition facts lookup
// ABOUTME: Holds the nutrient panel, a reference portion, main ingredients and a preparation summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{find_nutrient, validate_nutrients, Nutrients};
use crate::errors::AppResult;
use crate::schema::{require_amount, require_non_empty, StructuredOutput};

/// Reference portion the nutrient values refer to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct Portion {
    /// The description of this portion
    pub description: String,
    /// Numerical quantity
    pub quantity: f64,
    /// Unit of the serving (e.g., 'gram', 'liter')
    pub unit: String,
}

/// Nutrition facts for a single food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct FoodDetails {
    /// Name of the food
    pub food_name: String,
    /// Nutrients; keys are nutrient names, values are amounts.
    pub nutrients: Nutrients,
    /// Portion info; like sandwich, bowl, tablespoon. Also includes its numerical amount and unit of measurement
    pub portion: Portion,
    /// List of ingredient names.
    pub ingredients: Vec<String>,
    /// Very brief overview of preparation.
    pub recipe: String,
}

impl FoodDetails {
    /// Amount of a nutrient, matched case-insensitively
    #[must_use]
    pub fn nutrient(&self, name: &str) -> Option<f64> {
        find_nutrient(&self.nutrients, name)
    }
}

impl StructuredOutput for FoodDetails {
    const RECORD_NAME: &'static str = "FoodDetails";

    fn validate(&self) -> AppResult<()> {
        require_non_empty(Self::RECORD_NAME, "food_name", &self.food_name)?;
        validate_nutrients(Self::RECORD_NAME, &self.nutrients)?;
        require_amount(Self::RECORD_NAME, "portion.quantity", self.portion.quantity)?;
        require_non_empty(Self::RECORD_NAME, "portion.unit", &self.portion.unit)
    }
}
