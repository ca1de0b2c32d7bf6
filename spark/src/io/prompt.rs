//! Prompt rendering for story starter requests.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use tracing::debug;

use crate::core::selection::{Selection, StarterCount};

const STORY_STARTERS_TEMPLATE: &str = include_str!("prompts/story_starters.md");

/// Template engine wrapper around minijinja.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptBuilder").finish_non_exhaustive()
    }
}

impl PromptBuilder {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("story_starters", STORY_STARTERS_TEMPLATE)
            .context("load story_starters template")?;
        Ok(Self { env })
    }

    /// Render the prompt asking for `count` starters for `selection`.
    ///
    /// `count` is passed separately from the selection's own count so the
    /// per-starter strategy can ask for one item at a time.
    pub fn build(&self, selection: &Selection, count: StarterCount) -> Result<PromptPack> {
        let template = self.env.get_template("story_starters")?;
        let content = template
            .render(context! {
                mood => selection.mood.as_str(),
                genre => selection.genre.as_str(),
                character_archetype => selection.character_archetype.as_str(),
                setting => selection.setting.as_str(),
                count => count.get(),
            })
            .context("render story_starters prompt")?;
        debug!(bytes = content.len(), count = count.get(), "rendered prompt");
        Ok(PromptPack { content })
    }
}

/// A rendered prompt ready to send to a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPack {
    content: String,
}

impl PromptPack {
    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_string(self) -> String {
        self.content
    }
}
