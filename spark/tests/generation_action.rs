//! End-to-end tests for the caller-facing action.
//!
//! These drive `generate_stories_action` with a scripted backend through
//! both strategies, then export the result, covering validation, shape
//! checking and the failure taxonomy together.

use spark::action::generate_stories_action;
use spark::core::export::export_markdown;
use spark::core::selection::RawSelection;
use spark::core::types::{GenerationResult, GenerationStrategy, StoryStarter};
use spark::flow::StoryStarterFlow;
use spark::test_support::{
    ScriptedGenerator, ScriptedReply, starters_payload, valid_raw_selection,
};

fn flow(strategy: GenerationStrategy) -> StoryStarterFlow {
    StoryStarterFlow::new(strategy).expect("flow")
}

/// Each field, replaced by a value outside its enumeration, is rejected
/// before the backend is touched.
#[tokio::test]
async fn every_invalid_field_is_rejected_without_backend_call() {
    let cases = [
        RawSelection {
            mood: "bored".to_string(),
            ..valid_raw_selection()
        },
        RawSelection {
            genre: "western".to_string(),
            ..valid_raw_selection()
        },
        RawSelection {
            character_archetype: "trickster".to_string(),
            ..valid_raw_selection()
        },
        RawSelection {
            setting: "underwater city".to_string(),
            ..valid_raw_selection()
        },
    ];

    for raw in &cases {
        let generator = ScriptedGenerator::replies([starters_payload(&[("A", "a")])]);
        let result =
            generate_stories_action(&generator, &flow(GenerationStrategy::Batched), raw).await;
        assert_eq!(result, GenerationResult::failure("Invalid input provided."));
        assert_eq!(generator.calls(), 0, "{raw:?} must not reach the backend");
    }
}

/// Batched generation returns exactly the requested items, in order, and
/// the export numbers them consecutively.
#[tokio::test]
async fn batched_generation_then_export() {
    let generator = ScriptedGenerator::replies([starters_payload(&[
        ("Lanterns", "The forest hummed."),
        ("Roots", "Every tree remembered her name."),
    ])]);
    let raw = RawSelection {
        number_of_starters: Some(2),
        ..valid_raw_selection()
    };

    let result = generate_stories_action(&generator, &flow(GenerationStrategy::Batched), &raw).await;

    let stories = result.stories.expect("stories");
    assert!(result.success);
    assert_eq!(
        stories,
        vec![
            StoryStarter::new("Lanterns", "The forest hummed."),
            StoryStarter::new("Roots", "Every tree remembered her name."),
        ]
    );
    assert_eq!(
        export_markdown(&stories),
        "## Story Starter 1\n\n### Lanterns\n\nThe forest hummed.\n\n---\n\n\
         ## Story Starter 2\n\n### Roots\n\nEvery tree remembered her name."
    );
}

/// Per-starter generation tolerates an unusable reply and reports the rest
/// as a success.
#[tokio::test]
async fn per_starter_generation_undercounts_silently() {
    let generator = ScriptedGenerator::new([
        ScriptedReply::Text(starters_payload(&[("One", "1")])),
        ScriptedReply::Text("```json\nnot json\n```".to_string()),
        ScriptedReply::Text(starters_payload(&[("Three", "3")])),
    ]);

    let result = generate_stories_action(
        &generator,
        &flow(GenerationStrategy::PerStarter),
        &valid_raw_selection(),
    )
    .await;

    assert!(result.success);
    let titles: Vec<String> = result
        .stories
        .expect("stories")
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, vec!["One", "Three"]);
    assert_eq!(generator.calls(), 3);
}

#[tokio::test]
async fn malformed_reply_is_reported_as_failure() {
    for strategy in [GenerationStrategy::Batched, GenerationStrategy::PerStarter] {
        let generator = ScriptedGenerator::new([
            ScriptedReply::Text("[]".to_string()),
            ScriptedReply::Text(String::new()),
            ScriptedReply::Text(r#"{"storyStarters":"nope"}"#.to_string()),
        ]);
        let result =
            generate_stories_action(&generator, &flow(strategy), &valid_raw_selection()).await;
        assert!(!result.success);
        assert!(result.stories.is_none());
        assert!(!result.error.expect("error message").is_empty());
    }
}

/// A backend failure midway through per-starter generation aborts the whole
/// request; partial results are not returned.
#[tokio::test]
async fn backend_failure_midway_is_reported_as_failure() {
    let generator = ScriptedGenerator::new([
        ScriptedReply::Text(starters_payload(&[("One", "1")])),
        ScriptedReply::Fail("429 RESOURCE_EXHAUSTED".to_string()),
    ]);

    let result = generate_stories_action(
        &generator,
        &flow(GenerationStrategy::PerStarter),
        &valid_raw_selection(),
    )
    .await;

    assert_eq!(
        result,
        GenerationResult::failure("Failed to generate story starters. Please try again later.")
    );
    assert_eq!(generator.calls(), 2);
}
