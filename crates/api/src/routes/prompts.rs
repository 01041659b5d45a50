//! Route definitions for the `/prompts` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{prompt, response, vote};
use crate::state::AppState;

/// Routes mounted at `/prompts`.
///
/// ```text
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// PUT    /{id}/response             -> upsert own response
/// DELETE /{id}/response             -> withdraw own response
/// GET    /{id}/responses            -> list
/// POST   /{id}/votes                -> cast
/// GET    /{id}/votes/mine           -> list_mine
/// DELETE /{id}/votes/{vote_id}      -> retract
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(prompt::update).delete(prompt::delete))
        .route("/{id}/response", put(response::upsert).delete(response::delete))
        .route("/{id}/responses", get(response::list))
        .route("/{id}/votes", post(vote::cast))
        .route("/{id}/votes/mine", get(vote::list_mine))
        .route("/{id}/votes/{vote_id}", delete(vote::retract))
}
