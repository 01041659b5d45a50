//! Handlers for prompt responses (photo submissions).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use challenge_core::error::CoreError;
use challenge_core::types::DbId;
use challenge_db::models::prompt::Prompt;
use challenge_db::models::response::{BallotEntry, Response, ResponseResult, UpsertResponse};
use challenge_db::models::status::PromptStatus;
use challenge_db::repositories::ResponseRepo;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::league_access::member_prompt;
use crate::response::DataResponse;
use crate::state::AppState;

/// What a member may see of a prompt's responses, by prompt status.
#[derive(Debug, Serialize)]
#[serde(tag = "view", content = "responses", rename_all = "snake_case")]
pub enum ResponsesView {
    /// Before voting: only the caller's own submission.
    Own(Vec<Response>),
    /// During voting: published entries without authors.
    Ballot(Vec<BallotEntry>),
    /// After completion: authors, points and ranks.
    Results(Vec<ResponseResult>),
}

/// PUT /api/v1/prompts/{id}/response
///
/// Submit or replace the caller's response while the prompt is active.
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prompt_id): Path<DbId>,
    Json(input): Json<UpsertResponse>,
) -> AppResult<Json<Response>> {
    let (prompt, _) = member_prompt(&state.pool, prompt_id, auth.user_id).await?;
    ensure_accepting(&prompt)?;
    input.validate()?;

    // The status can change between the check above and the write; the
    // upsert re-checks it under a share lock.
    let response = ResponseRepo::upsert(&state.pool, prompt_id, auth.user_id, &input)
        .await?
        .ok_or_else(submissions_closed)?;

    tracing::info!(
        prompt_id,
        user_id = auth.user_id,
        response_id = response.id,
        "Response saved"
    );
    Ok(Json(response))
}

/// DELETE /api/v1/prompts/{id}/response
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prompt_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (prompt, _) = member_prompt(&state.pool, prompt_id, auth.user_id).await?;
    ensure_accepting(&prompt)?;

    if ResponseRepo::delete_for_user(&state.pool, prompt_id, auth.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Response for prompt",
            id: prompt_id,
        }))
    }
}

/// GET /api/v1/prompts/{id}/responses
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(prompt_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ResponsesView>>> {
    let (prompt, _) = member_prompt(&state.pool, prompt_id, auth.user_id).await?;

    let data = match PromptStatus::from_id(prompt.status_id) {
        Some(PromptStatus::Voting) => {
            ResponsesView::Ballot(ResponseRepo::list_ballot(&state.pool, prompt_id).await?)
        }
        Some(PromptStatus::Completed) => {
            ResponsesView::Results(ResponseRepo::list_results(&state.pool, prompt_id).await?)
        }
        _ => {
            let own = ResponseRepo::find_for_user(&state.pool, prompt_id, auth.user_id).await?;
            ResponsesView::Own(own.into_iter().collect())
        }
    };
    Ok(Json(DataResponse { data }))
}

fn ensure_accepting(prompt: &Prompt) -> AppResult<()> {
    if prompt.status_id == PromptStatus::Active.id() {
        Ok(())
    } else {
        Err(submissions_closed())
    }
}

fn submissions_closed() -> AppError {
    AppError::Core(CoreError::Validation(
        "This prompt is not accepting submissions".into(),
    ))
}
