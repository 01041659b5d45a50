//! Handlers that drive the prompt cycle: league start, owner transitions
//! and the scheduler hook.

use axum::extract::{Path, State};
use axum::Json;
use challenge_core::types::DbId;
use challenge_db::models::prompt::Prompt;
use chrono::Utc;
use serde::Serialize;

use crate::engine::cycle::{self, QueueReport, Transition};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::cron::CronCaller;
use crate::middleware::league_access::owned_league;
use crate::state::AppState;

/// One applied transition as returned to the owner.
#[derive(Debug, Serialize)]
pub struct TransitionView {
    pub event: &'static str,
    pub prompt: Prompt,
    /// Responses published when voting opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_responses: Option<u64>,
    /// Responses ranked when the prompt completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scored_responses: Option<usize>,
}

impl From<Transition> for TransitionView {
    fn from(t: Transition) -> Self {
        let event = t.event_type();
        match t {
            Transition::Activated(prompt) => Self {
                event,
                prompt,
                published_responses: None,
                scored_responses: None,
            },
            Transition::VotingOpened { prompt, published } => Self {
                event,
                prompt,
                published_responses: Some(published),
                scored_responses: None,
            },
            Transition::Completed { prompt, ranked } => Self {
                event,
                prompt,
                published_responses: None,
                scored_responses: Some(ranked.len()),
            },
        }
    }
}

/// Response body for start and transition endpoints.
#[derive(Debug, Serialize)]
pub struct TransitionsResponse {
    pub transitions: Vec<TransitionView>,
}

impl From<Vec<Transition>> for TransitionsResponse {
    fn from(transitions: Vec<Transition>) -> Self {
        Self {
            transitions: transitions.into_iter().map(TransitionView::from).collect(),
        }
    }
}

/// POST /api/v1/leagues/{id}/start
///
/// Start the league and activate its first scheduled prompt, if any.
pub async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<TransitionsResponse>> {
    owned_league(&state.pool, id, auth.user_id).await?;
    let transitions =
        cycle::start_league(&state.pool, &state.event_bus, id, auth.user_id, Utc::now()).await?;
    Ok(Json(transitions.into()))
}

/// POST /api/v1/leagues/{id}/transition
///
/// Close the open phase now instead of waiting for it to expire.
pub async fn transition(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<TransitionsResponse>> {
    owned_league(&state.pool, id, auth.user_id).await?;
    let transitions =
        cycle::advance_league(&state.pool, &state.event_bus, id, auth.user_id, Utc::now())
            .await?;
    Ok(Json(transitions.into()))
}

/// POST /api/v1/cron/process-prompts
pub async fn process_prompts(
    State(state): State<AppState>,
    _caller: CronCaller,
) -> AppResult<Json<QueueReport>> {
    let report = cycle::process_prompt_queue(&state.pool, &state.event_bus, Utc::now()).await?;
    Ok(Json(report))
}
