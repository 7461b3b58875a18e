// ABOUTME: ShoppingList record returned by the shopping list generator
// ABOUTME: A titled, ordered list of items with free-text purchase amounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::schema::{require_non_empty, StructuredOutput};

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct Item {
    /// the name of the item
    pub name: String,
    /// the amount that should be bought at the supermarket
    pub amount: String,
}

/// Shopping list covering a meal plan for a given duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ShoppingList {
    /// shopping list title
    pub title: String,
    /// items to be bought
    pub items: Vec<Item>,
}

impl StructuredOutput for ShoppingList {
    const RECORD_NAME: &'static str = "ShoppingList";

    fn validate(&self) -> AppResult<()> {
        require_non_empty(Self::RECORD_NAME, "title", &self.title)?;
        self.items.iter().enumerate().try_for_each(|(index, item)| {
            require_non_empty(Self::RECORD_NAME, &format!("items[{index}].name"), &item.name)
        })
    }
}
