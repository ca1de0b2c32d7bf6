//! Story starter generation flow.
//!
//! Renders the prompt for a validated [`Selection`], calls a [`Generator`]
//! according to the configured [`GenerationStrategy`], and shape-checks every
//! reply. Unusable replies count as empty; only backend failures are errors.

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::selection::{Selection, StarterCount};
use crate::core::shape::OutputShape;
use crate::core::types::{GenerationStrategy, StoryStarter};
use crate::io::generator::{GenerateRequest, Generator};
use crate::io::prompt::PromptBuilder;

/// Flow wrapper that owns the prompt template, the output schema and the
/// strategy.
#[derive(Debug)]
pub struct StoryStarterFlow {
    strategy: GenerationStrategy,
    prompts: PromptBuilder,
    shape: OutputShape,
}

impl StoryStarterFlow {
    pub fn new(strategy: GenerationStrategy) -> Result<Self> {
        Ok(Self {
            strategy,
            prompts: PromptBuilder::new()?,
            shape: OutputShape::new()?,
        })
    }

    pub fn strategy(&self) -> GenerationStrategy {
        self.strategy
    }

    /// Same flow with a different strategy.
    pub fn with_strategy(mut self, strategy: GenerationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Generate up to `selection.number_of_starters` starters.
    ///
    /// The result may hold fewer items than requested (including none) when
    /// the backend returns unusable or short replies.
    #[instrument(skip_all, fields(strategy = ?self.strategy, requested = selection.number_of_starters.get()))]
    pub async fn run<G: Generator + ?Sized>(
        &self,
        generator: &G,
        selection: &Selection,
    ) -> Result<Vec<StoryStarter>> {
        let requested = selection.number_of_starters;
        let (calls, per_call) = match self.strategy {
            GenerationStrategy::Batched => (1, requested),
            GenerationStrategy::PerStarter => (requested.as_usize(), StarterCount::ONE),
        };

        let request = GenerateRequest {
            prompt: self.prompts.build(selection, per_call)?.into_string(),
            output_schema: self.shape.schema().clone(),
        };

        let mut starters = Vec::with_capacity(requested.as_usize());
        for call in 0..calls {
            let raw = generator.generate(&request).await?;
            let Some(mut reply) = self.shape.check(&raw) else {
                warn!(call, "discarding unusable reply");
                continue;
            };
            if reply.is_empty() {
                warn!(call, "reply held no starters");
                continue;
            }
            reply.truncate(per_call.as_usize());
            debug!(call, received = reply.len(), "accepted reply");
            starters.extend(reply);
        }

        if starters.len() < requested.as_usize() {
            warn!(
                requested = requested.get(),
                returned = starters.len(),
                "fewer starters than requested"
            );
        }
        Ok(starters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selection::{CharacterArchetype, Genre, Mood, Setting};
    use crate::test_support::{ScriptedGenerator, starters_payload};

    fn selection(count: i64) -> Selection {
        Selection {
            mood: Mood::Tense,
            genre: Genre::Thriller,
            character_archetype: CharacterArchetype::CunningVillain,
            setting: Setting::DystopianCity,
            number_of_starters: StarterCount::new(count).expect("in range"),
        }
    }

    #[tokio::test]
    async fn batched_makes_one_call_and_keeps_order() {
        let generator = ScriptedGenerator::replies([starters_payload(&[
            ("A", "first"),
            ("B", "second"),
            ("C", "third"),
        ])]);
        let flow = StoryStarterFlow::new(GenerationStrategy::Batched).expect("flow");

        let starters = flow.run(&generator, &selection(3)).await.expect("run");

        let titles: Vec<&str> = starters.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(generator.calls(), 1);
        assert!(generator.prompts()[0].contains("Return exactly 3 story starters"));
    }

    #[tokio::test]
    async fn batched_truncates_surplus_items() {
        let generator = ScriptedGenerator::replies([starters_payload(&[
            ("A", "a"),
            ("B", "b"),
            ("C", "c"),
        ])]);
        let flow = StoryStarterFlow::new(GenerationStrategy::Batched).expect("flow");

        let starters = flow.run(&generator, &selection(2)).await.expect("run");
        assert_eq!(starters.len(), 2);
    }

    #[tokio::test]
    async fn batched_malformed_reply_is_empty_not_error() {
        let generator = ScriptedGenerator::replies(["definitely not json".to_string()]);
        let flow = StoryStarterFlow::new(GenerationStrategy::Batched).expect("flow");

        let starters = flow.run(&generator, &selection(3)).await.expect("run");
        assert!(starters.is_empty());
    }

    #[tokio::test]
    async fn per_starter_calls_once_per_item_and_takes_first() {
        let generator = ScriptedGenerator::replies([
            starters_payload(&[("A", "a"), ("extra", "ignored")]),
            starters_payload(&[("B", "b")]),
            starters_payload(&[("C", "c")]),
        ]);
        let flow = StoryStarterFlow::new(GenerationStrategy::PerStarter).expect("flow");

        let starters = flow.run(&generator, &selection(3)).await.expect("run");

        let titles: Vec<&str> = starters.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(generator.calls(), 3);
        assert!(
            generator
                .prompts()
                .iter()
                .all(|prompt| prompt.contains("Return exactly 1 story starter as"))
        );
    }

    #[tokio::test]
    async fn per_starter_skips_empty_replies() {
        let generator = ScriptedGenerator::replies([
            starters_payload(&[("A", "a")]),
            String::new(),
            r#"{"storyStarters":[]}"#.to_string(),
            starters_payload(&[("D", "d")]),
        ]);
        let flow = StoryStarterFlow::new(GenerationStrategy::PerStarter).expect("flow");

        let starters = flow.run(&generator, &selection(4)).await.expect("run");

        let titles: Vec<&str> = starters.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "D"]);
        assert_eq!(generator.calls(), 4);
    }

    #[tokio::test]
    async fn backend_error_propagates() {
        let generator = ScriptedGenerator::failing("quota exceeded");
        let flow = StoryStarterFlow::new(GenerationStrategy::PerStarter).expect("flow");

        let err = flow.run(&generator, &selection(2)).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn with_strategy_overrides() {
        let flow = StoryStarterFlow::new(GenerationStrategy::Batched)
            .expect("flow")
            .with_strategy(GenerationStrategy::PerStarter);
        assert_eq!(flow.strategy(), GenerationStrategy::PerStarter);
    }
}
