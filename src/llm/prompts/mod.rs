// ABOUTME: Prompt templates for the nutritionist agent and the three chains, loaded at compile time
// ABOUTME: Provides single-pass `{placeholder}` rendering for template variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompts
//!
//! Prompts are kept in markdown files next to this module and embedded with
//! `include_str!`, so editing a prompt never touches Rust code.

/// System prompt for the agent's model node
pub const NUTRITIONIST_SYSTEM_PROMPT: &str = include_str!("nutritionist_system.md");

/// Food stats chain template (`food_name`, `format_instructions`)
pub const FOOD_STATS_TEMPLATE: &str = include_str!("food_stats.md");

/// Recipe chain template (`recipe_name`, `yield_clause`, `format_instructions`)
pub const RECIPE_TEMPLATE: &str = include_str!("recipe.md");

/// Shopping list chain template (`meal_plan`, `food_preferences`, `duration`)
pub const SHOPPING_LIST_TEMPLATE: &str = include_str!("shopping_list.md");

/// Get the nutritionist system prompt
#[must_use]
pub const fn get_nutritionist_system_prompt() -> &'static str {
    NUTRITIONIST_SYSTEM_PROMPT
}

/// Build the per-turn context message injected ahead of the system prompt
#[must_use]
pub fn session_context(meal_plan: &str, food_preferences: &str) -> String {
    format!("Meal plan:\n{meal_plan}\nFood preferences:\n{food_preferences}")
}

/// Substitute `{name}` placeholders in `template`
///
/// Substitution is single pass: text inserted from `vars` is never scanned
/// again, so user input containing braces is left as is. Placeholders with no
/// matching variable are kept verbatim.
#[must_use]
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
