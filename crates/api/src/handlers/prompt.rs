//! Handlers for prompts and the league prompt queue.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use challenge_core::phase::is_deadline_passed;
use challenge_core::types::{DbId, Timestamp};
use challenge_db::models::prompt::{CreatePrompt, Prompt, ReorderQueue, UpdatePrompt};
use challenge_db::models::status::PromptStatus;
use challenge_db::repositories::PromptRepo;
use chrono::Utc;
use serde::Serialize;
use validator::Validate;

use crate::engine::queue;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::league_access::{member_league, owned_league, owned_prompt};
use crate::query::PromptStatusParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// The league's open prompt with its computed phase deadline.
#[derive(Debug, Serialize)]
pub struct CurrentPrompt {
    pub prompt: Option<Prompt>,
    /// `active` or `voting` while a prompt is open.
    pub phase: Option<&'static str>,
    pub phase_end: Option<Timestamp>,
    /// The deadline has passed and the next sweep will move the prompt on.
    pub is_expired: bool,
}

/// POST /api/v1/leagues/{id}/prompts
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(league_id): Path<DbId>,
    Json(input): Json<CreatePrompt>,
) -> AppResult<(StatusCode, Json<Prompt>)> {
    owned_league(&state.pool, league_id, auth.user_id).await?;
    input.validate()?;

    let prompt = queue::append(&state.pool, league_id, input.text.trim()).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

/// GET /api/v1/leagues/{id}/prompts?status=
pub async fn list_by_league(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(league_id): Path<DbId>,
    Query(params): Query<PromptStatusParams>,
) -> AppResult<Json<Vec<Prompt>>> {
    member_league(&state.pool, league_id, auth.user_id).await?;
    let status = params.status_id()?;

    let prompts = PromptRepo::list_by_league(&state.pool, league_id, status).await?;
    Ok(Json(prompts))
}

/// GET /api/v1/leagues/{id}/prompts/current
///
/// Read-only: an expired phase is reported, not advanced.
pub async fn current(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(league_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CurrentPrompt>>> {
    member_league(&state.pool, league_id, auth.user_id).await?;

    let data = match PromptRepo::find_open(&state.pool, league_id).await? {
        Some(prompt) => CurrentPrompt {
            phase: PromptStatus::from_id(prompt.status_id).map(PromptStatus::name),
            phase_end: prompt.phase_deadline(),
            is_expired: is_deadline_passed(prompt.phase_deadline(), Utc::now()),
            prompt: Some(prompt),
        },
        None => CurrentPrompt {
            prompt: None,
            phase: None,
            phase_end: None,
            is_expired: false,
        },
    };
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/leagues/{id}/prompts/queue
pub async fn reorder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(league_id): Path<DbId>,
    Json(input): Json<ReorderQueue>,
) -> AppResult<Json<Vec<Prompt>>> {
    owned_league(&state.pool, league_id, auth.user_id).await?;
    let prompts = queue::reorder(&state.pool, league_id, &input.prompt_ids).await?;
    Ok(Json(prompts))
}

/// PUT /api/v1/prompts/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePrompt>,
) -> AppResult<Json<Prompt>> {
    let (prompt, _) = owned_prompt(&state.pool, id, auth.user_id).await?;
    input.validate()?;

    let prompt = queue::edit_text(&state.pool, &prompt, input.text.trim()).await?;
    Ok(Json(prompt))
}

/// DELETE /api/v1/prompts/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let (prompt, _) = owned_prompt(&state.pool, id, auth.user_id).await?;
    queue::remove(&state.pool, &prompt).await?;
    Ok(StatusCode::NO_CONTENT)
}
