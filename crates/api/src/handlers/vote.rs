//! Handlers for votes on a prompt's responses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use challenge_core::error::CoreError;
use challenge_core::types::DbId;
use challenge_db::models::status::PromptStatus;
use challenge_db::models::vote::{CastVote, Vote};
use challenge_db::repositories::VoteRepo;
use validator::Validate;

use crate::engine::voting;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::league_access::member_prompt;
use crate::state::AppState;

/// POST /api/v1/prompts/{id}/votes
pub async fn cast(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prompt_id): Path<DbId>,
    Json(input): Json<CastVote>,
) -> AppResult<(StatusCode, Json<Vote>)> {
    input.validate()?;
    let vote = voting::cast(&state.pool, prompt_id, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(vote)))
}

/// GET /api/v1/prompts/{id}/votes/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prompt_id): Path<DbId>,
) -> AppResult<Json<Vec<Vote>>> {
    member_prompt(&state.pool, prompt_id, auth.user_id).await?;
    let votes = VoteRepo::list_for_voter(&state.pool, prompt_id, auth.user_id).await?;
    Ok(Json(votes))
}

/// DELETE /api/v1/prompts/{id}/votes/{vote_id}
pub async fn retract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((prompt_id, vote_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let (prompt, _) = member_prompt(&state.pool, prompt_id, auth.user_id).await?;
    if prompt.status_id != PromptStatus::Voting.id() {
        return Err(AppError::Core(CoreError::Validation(
            "Voting is not open for this prompt".into(),
        )));
    }

    if VoteRepo::delete_own(&state.pool, prompt_id, vote_id, auth.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Vote",
            id: vote_id,
        }))
    }
}
