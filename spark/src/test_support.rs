//! Test-only helpers: a scripted generator and payload builders.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::core::selection::RawSelection;
use crate::core::types::{StoryStarter, StoryStartersOutput};
use crate::io::generator::{GenerateRequest, Generator};

/// One scripted backend answer.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
}

/// Generator that replays queued answers and records every prompt it sees.
///
/// Once the queue is empty the `fallback` answer repeats; without a fallback
/// further calls fail.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<ScriptedReply>>,
    fallback: Option<ScriptedReply>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(script: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Successful raw replies, in order.
    pub fn replies(replies: impl IntoIterator<Item = String>) -> Self {
        Self::new(replies.into_iter().map(ScriptedReply::Text))
    }

    /// A backend whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            fallback: Some(ScriptedReply::Fail(message.to_string())),
            ..Self::default()
        }
    }

    /// Number of `generate` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(request.prompt.clone());
        let next = self.script.lock().expect("script lock").pop_front();
        match next.or_else(|| self.fallback.clone()) {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted generator exhausted")),
        }
    }
}

/// Raw model reply holding the given `(title, story)` pairs.
pub fn starters_payload(items: &[(&str, &str)]) -> String {
    let output = StoryStartersOutput {
        story_starters: items
            .iter()
            .map(|(title, story)| StoryStarter::new(*title, *story))
            .collect(),
    };
    serde_json::to_string(&output).expect("serialize payload")
}

/// A raw selection that passes validation.
pub fn valid_raw_selection() -> RawSelection {
    RawSelection {
        mood: "hopeful".to_string(),
        genre: "fantasy".to_string(),
        character_archetype: "reluctant hero".to_string(),
        setting: "enchanted forest".to_string(),
        number_of_starters: None,
    }
}
