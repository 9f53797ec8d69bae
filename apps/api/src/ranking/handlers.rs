//! Axum route handlers for the AI API.

use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::ranking::{RankedArea, RankingPipeline, RankingRequest};
use crate::state::AppState;

/// POST /v1/ai/init
///
/// Ranks the areas most relevant to the submitted problem, each with its own
/// ranked contacts. At most four areas, best first.
///
/// Status codes:
/// - 400 `problem cannot be empty` for a blank problem.
/// - 400 `Invalid Prompt: …` when the area ratings cannot be parsed.
/// - 502 when the completion service itself fails on the area stage.
/// - A contact-stage failure does not fail the request: that area is still
///   returned, with `contacts: []`.
pub async fn handle_init(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<RankingRequest>,
) -> Result<Json<Vec<RankedArea>>, AppError> {
    if request.problem.trim().is_empty() {
        return Err(AppError::Validation("problem cannot be empty".to_string()));
    }

    tracing::info!(
        "Ranking request from {} (profile {:?})",
        user.username,
        request.profile
    );

    let pipeline = RankingPipeline::new(&state.areas, &state.contacts, state.llm.as_ref());
    let ranked = pipeline.rank(&request).await?;

    Ok(Json(ranked))
}

/// POST /v1/ai/message
///
/// Conversational follow-up. Not built yet; acknowledges the call.
pub async fn handle_message(AuthUser(_): AuthUser) -> &'static str {
    "Message"
}
