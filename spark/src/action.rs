//! Caller-facing entry point.
//!
//! Validates a raw selection, runs the flow, and folds every outcome into a
//! plain-data [`GenerationResult`]. Nothing raised below this point reaches
//! the caller.

use thiserror::Error;
use tracing::{debug, error};

use crate::core::selection::{RawSelection, Selection};
use crate::core::types::{GenerationResult, StoryStarter};
use crate::exit_codes;
use crate::flow::StoryStarterFlow;
use crate::io::generator::Generator;

/// Failure classes surfaced to callers. `Display` is the user-facing message.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A field is outside its enumeration; no backend call was made.
    #[error("Invalid input provided.")]
    InvalidInput,
    /// The backend answered but nothing usable came back.
    #[error("The AI could not generate stories. Please try different options.")]
    EmptyGeneration,
    /// The backend call itself failed.
    #[error("Failed to generate story starters. Please try again later.")]
    RemoteFailure(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ActionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ActionError::InvalidInput => exit_codes::INVALID,
            ActionError::EmptyGeneration => exit_codes::EMPTY,
            ActionError::RemoteFailure(_) => exit_codes::REMOTE_FAILURE,
        }
    }
}

/// Validate, generate, and classify the outcome.
pub async fn run_action<G: Generator + ?Sized>(
    generator: &G,
    flow: &StoryStarterFlow,
    raw: &RawSelection,
) -> Result<Vec<StoryStarter>, ActionError> {
    let selection = match Selection::parse(raw) {
        Ok(selection) => selection,
        Err(reason) => {
            debug!(%reason, "rejected selection");
            return Err(ActionError::InvalidInput);
        }
    };

    match flow.run(generator, &selection).await {
        Ok(stories) if stories.is_empty() => Err(ActionError::EmptyGeneration),
        Ok(stories) => Ok(stories),
        Err(err) => {
            error!(error = ?err, "error generating story starters");
            Err(ActionError::RemoteFailure(err.into()))
        }
    }
}

/// [`run_action`] folded into a [`GenerationResult`].
pub async fn generate_stories_action<G: Generator + ?Sized>(
    generator: &G,
    flow: &StoryStarterFlow,
    raw: &RawSelection,
) -> GenerationResult {
    GenerationResult::from(run_action(generator, flow, raw).await)
}

impl From<Result<Vec<StoryStarter>, ActionError>> for GenerationResult {
    fn from(outcome: Result<Vec<StoryStarter>, ActionError>) -> Self {
        match outcome {
            Ok(stories) => GenerationResult::success(stories),
            Err(err) => GenerationResult::failure(err.to_string()),
        }
    }
}
