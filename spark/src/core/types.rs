//! Shared value types for the generation pipeline.
//!
//! These types define stable contracts between the flow, the adapter and the
//! presentation layers. None of them outlive a single request.

use serde::{Deserialize, Serialize};

/// A short generated narrative opening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryStarter {
    pub title: String,
    pub story: String,
}

impl StoryStarter {
    pub fn new(title: impl Into<String>, story: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            story: story.into(),
        }
    }

    /// A starter with no title.
    pub fn untitled(story: impl Into<String>) -> Self {
        Self::new(String::new(), story)
    }
}

/// Structured payload the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStartersOutput {
    pub story_starters: Vec<StoryStarter>,
}

/// How many remote calls a generation makes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// One call asking for every starter at once.
    #[default]
    Batched,
    /// One call per starter, each asking for a single item.
    PerStarter,
}

/// Caller-facing outcome of one generation request.
///
/// Failures are data: `success` is false and `error` carries a user-facing
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stories: Option<Vec<StoryStarter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn success(stories: Vec<StoryStarter>) -> Self {
        Self {
            success: true,
            stories: Some(stories),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            stories: None,
            error: Some(error.into()),
        }
    }
}
