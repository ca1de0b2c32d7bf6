//! Shared application state for the HTTP server.

use std::sync::Arc;

use spark::core::selection::StarterCount;
use spark::flow::StoryStarterFlow;
use spark::io::generator::Generator;

/// Shared state accessible from all request handlers.
///
/// Everything here is immutable after startup; requests share no mutable
/// state.
#[derive(Clone)]
pub struct AppState {
    /// Remote generation backend.
    pub generator: Arc<dyn Generator>,
    /// Prompt, schema and strategy used for every request.
    pub flow: Arc<StoryStarterFlow>,
    /// Starter count used when a request does not carry one.
    pub default_starters: StarterCount,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn Generator>,
        flow: StoryStarterFlow,
        default_starters: StarterCount,
    ) -> Self {
        Self {
            generator,
            flow: Arc::new(flow),
            default_starters,
        }
    }
}
