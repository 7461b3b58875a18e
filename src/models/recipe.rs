// ABOUTME: RecipeDetails record returned by the recipe generator
// ABOUTME: Ordered ingredients with quantities, ordered steps, yield and per-serving nutrients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{deserialize_whole_number, find_nutrient, validate_nutrients, Nutrients};
use crate::errors::{AppError, AppResult};
use crate::schema::{require_amount, require_non_empty, StructuredOutput};

/// One recipe ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct Ingredient {
    /// Name of the ingredient
    pub name: String,
    /// Numerical quantity
    pub quantity: f64,
    /// Measurement unit, e.g., 'gram', 'cup', 'teaspoon'
    pub unit: String,
}

/// A complete recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct RecipeDetails {
    /// Name of the recipe
    pub recipe_name: String,
    /// List of ingredients with quantity and measurement units
    pub ingredients: Vec<Ingredient>,
    /// Ordered list of steps describing preparation
    pub steps: Vec<String>,
    /// Number of servings the recipe yields
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub serving_size: u32,
    /// Nutrition information per serving; keys are nutrient names, values are amounts.
    pub nutrients: Nutrients,
}

impl RecipeDetails {
    /// Per-serving amount of a nutrient, matched case-insensitively
    #[must_use]
    pub fn nutrient(&self, name: &str) -> Option<f64> {
        find_nutrient(&self.nutrients, name)
    }
}

impl StructuredOutput for RecipeDetails {
    const RECORD_NAME: &'static str = "RecipeDetails";

    fn validate(&self) -> AppResult<()> {
        require_non_empty(Self::RECORD_NAME, "recipe_name", &self.recipe_name)?;
        if self.serving_size == 0 {
            return Err(AppError::schema_validation(
                Self::RECORD_NAME,
                "serving_size must be at least 1",
            ));
        }
        for (index, ingredient) in self.ingredients.iter().enumerate() {
            require_non_empty(
                Self::RECORD_NAME,
                &format!("ingredients[{index}].name"),
                &ingredient.name,
            )?;
            require_amount(
                Self::RECORD_NAME,
                &format!("ingredients[{index}].quantity"),
                ingredient.quantity,
            )?;
        }
        validate_nutrients(Self::RECORD_NAME, &self.nutrients)
    }
}
