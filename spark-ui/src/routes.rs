//! HTTP route handlers for the story starter API.

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use serde::Deserialize;
use spark::action::{ActionError, generate_stories_action};
use spark::core::export::{EXPORT_FILE_NAME, export_markdown};
use spark::core::selection::{RawSelection, SelectionOptions};
use spark::core::types::{GenerationResult, StoryStarter};
use tracing::debug;

use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/options", get(options))
        .route("/stories", post(generate_stories))
        .route("/export", post(export))
}

async fn health() -> &'static str {
    "ok"
}

/// GET /api/options - every selectable value plus count bounds.
///
/// `defaultStarters` is the count this server fills in when a request omits
/// one.
async fn options(State(state): State<AppState>) -> Json<SelectionOptions> {
    Json(SelectionOptions::with_default(state.default_starters))
}

/// POST /api/stories - validate the selection and generate starters.
///
/// Always answers 200 with a `GenerationResult`; failures are carried in the
/// body. A body that does not deserialize is treated as invalid input.
async fn generate_stories(
    State(state): State<AppState>,
    body: Result<Json<RawSelection>, JsonRejection>,
) -> Json<GenerationResult> {
    let mut raw = match body {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejected request body");
            return Json(GenerationResult::failure(
                ActionError::InvalidInput.to_string(),
            ));
        }
    };
    raw.number_of_starters
        .get_or_insert(i64::from(state.default_starters.get()));
    Json(generate_stories_action(state.generator.as_ref(), &state.flow, &raw).await)
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    stories: Vec<StoryStarter>,
}

/// POST /api/export - render starters as a markdown download.
async fn export(Json(request): Json<ExportRequest>) -> impl IntoResponse {
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export_markdown(&request.stories),
    )
}
