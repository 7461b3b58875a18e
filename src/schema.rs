// ABOUTME: Structured-output contract shared by the food, recipe and shopping list records
// ABOUTME: Generates JSON Schema format instructions and parses model text into validated records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Structured Output
//!
//! Every record the chains produce implements [`StructuredOutput`]. Parsing is
//! two-phase: `serde` enforces presence, types and the absence of unknown
//! fields, then [`StructuredOutput::validate`] checks value constraints that a
//! JSON Schema cannot express to `serde` (finite non-negative amounts,
//! non-empty names).

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// A record the model is asked to emit as JSON
pub trait StructuredOutput: JsonSchema + DeserializeOwned + Serialize + Sized {
    /// Record name used in schema names and error messages
    const RECORD_NAME: &'static str;

    /// Check value constraints after deserialization
    ///
    /// # Errors
    ///
    /// Returns a `SchemaValidation` error naming the offending field.
    fn validate(&self) -> AppResult<()>;
}

/// JSON Schema document for `T`
///
/// # Errors
///
/// Returns a serialization error if the generated schema cannot be converted
/// to a JSON value.
pub fn json_schema<T: JsonSchema>() -> AppResult<Value> {
    Ok(serde_json::to_value(schema_for!(T))?)
}

/// Prompt text instructing the model to answer with an instance of `T`
///
/// # Errors
///
/// Returns a serialization error if the schema cannot be rendered.
pub fn format_instructions<T: StructuredOutput>() -> AppResult<String> {
    let schema = serde_json::to_string(&schema_for!(T))?;
    Ok(format!(
        "The output must be a single JSON object that conforms to the JSON schema below. \
         Do not add fields that the schema does not define and do not wrap the object in prose.\n\
         \n\
         For example, for the schema {{\"properties\": {{\"foo\": {{\"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}} \
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance, while {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not.\n\
         \n\
         Here is the output schema:\n```\n{schema}\n```"
    ))
}

/// Parse raw model text into a validated `T`
///
/// Prose around the JSON is tolerated when the JSON sits in a Markdown code
/// fence.
///
/// # Errors
///
/// Returns a `SchemaValidation` error if the text is not JSON, does not match
/// the schema of `T`, or fails [`StructuredOutput::validate`].
pub fn parse_structured<T: StructuredOutput>(text: &str) -> AppResult<T> {
    let json = strip_code_fence(text);
    debug!(record = T::RECORD_NAME, len = json.len(), "Parsing structured output");

    let record: T = serde_json::from_str(json).map_err(|e| {
        AppError::schema_validation(T::RECORD_NAME, format!("output does not match schema: {e}"))
            .with_source(e)
    })?;
    record.validate()?;
    Ok(record)
}

const FENCE: &str = "```";
const JSON_INFO: &str = "json";

/// Extract the JSON payload from a reply that may wrap it in a Markdown fence
///
/// Bare JSON is returned as is. Otherwise the first ```` ``` ```` block
/// anywhere in the text is used, with an optional `json` info string on the
/// same line or on its own line.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let mut body = &trimmed[open + FENCE.len()..];
    if body
        .get(..JSON_INFO.len())
        .is_some_and(|info| info.eq_ignore_ascii_case(JSON_INFO))
    {
        body = &body[JSON_INFO.len()..];
    }
    body.find(FENCE).map_or(body, |close| &body[..close]).trim()
}

// ============================================================================
// Field checks used by record validators
// ============================================================================

/// Reject names that are empty after trimming
pub(crate) fn require_non_empty(record: &str, field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::schema_validation(
            record,
            format!("{field} must not be empty"),
        ));
    }
    Ok(())
}

/// Reject amounts that are NaN, infinite or negative
pub(crate) fn require_amount(record: &str, field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::schema_validation(
            record,
            format!("{field} must be a finite non-negative number, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n{\"a\":1}\n```  \n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(
            strip_code_fence("Here is the JSON:\n```json\n{\"a\":1}\n```\nEnjoy!"),
            "{\"a\":1}"
        );
        assert_eq!(strip_code_fence("```json {\"a\":1} ```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```JSON\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(
            strip_code_fence("{\"step\":\"use ``` here\"}"),
            "{\"step\":\"use ``` here\"}"
        );
    }

    #[test]
    fn test_require_amount_rejects_bad_values() {
        assert!(require_amount("R", "x", 0.0).is_ok());
        assert!(require_amount("R", "x", -1.0).is_err());
        assert!(require_amount("R", "x", f64::NAN).is_err());
        assert!(require_amount("R", "x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("R", "name", "kale").is_ok());
        let err = require_non_empty("R", "name", "  ").unwrap_err();
        assert!(err.message.starts_with("R: name"));
    }
}
