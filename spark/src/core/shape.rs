//! Output shape check for model replies.
//!
//! A reply is usable only if it parses as JSON and conforms to the story
//! starters schema. Anything else is reported as `None` rather than an
//! error: an unusable payload counts as an empty generation.

use std::fmt;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use jsonschema::{Draft, Validator};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::core::types::{StoryStarter, StoryStartersOutput};

/// JSON Schema (Draft 2020-12) for [`StoryStartersOutput`].
pub const OUTPUT_SCHEMA: &str = include_str!("../../schemas/story_starters_output.schema.json");

static FENCED_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("fence regex is valid")
});

/// Compiled output schema.
pub struct OutputShape {
    schema: Value,
    validator: Validator,
}

impl fmt::Debug for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputShape")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl OutputShape {
    /// Compile the bundled story starters schema.
    pub fn new() -> Result<Self> {
        Self::from_schema_str(OUTPUT_SCHEMA)
    }

    pub fn from_schema_str(raw: &str) -> Result<Self> {
        let schema: Value = serde_json::from_str(raw).context("parse output schema json")?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .context("compile output json schema")?;
        Ok(Self { schema, validator })
    }

    /// The schema as JSON, for backends that accept a response schema.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Schema violations for `instance`; empty when it conforms.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect()
    }

    /// Parse and shape-check a raw model reply.
    ///
    /// Returns `None` for anything that is not schema-conformant JSON.
    pub fn check(&self, raw: &str) -> Option<Vec<StoryStarter>> {
        let body = strip_code_fence(raw);
        if body.trim().is_empty() {
            debug!("empty model reply");
            return None;
        }
        let instance: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, bytes = body.len(), "model reply is not json");
                return None;
            }
        };
        let violations = self.violations(&instance);
        if !violations.is_empty() {
            debug!(violations = ?violations, "model reply failed schema check");
            return None;
        }
        serde_json::from_value::<StoryStartersOutput>(instance)
            .ok()
            .map(|output| output.story_starters)
    }
}

/// Unwrap a reply wrapped in a markdown code fence (```json ... ```).
fn strip_code_fence(raw: &str) -> &str {
    FENCED_JSON_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str())
}
