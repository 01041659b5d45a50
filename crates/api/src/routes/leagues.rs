//! Route definitions for the `/leagues` resource.
//!
//! Also nests the league's prompt queue under `/leagues/{id}/prompts`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{cycle, leaderboard, league, prompt};
use crate::state::AppState;

/// Routes mounted at `/leagues`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// POST   /join                          -> join
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// POST   /{id}/leave                    -> leave
/// GET    /{id}/members                  -> members
/// GET    /{id}/leaderboard              -> leaderboard
/// POST   /{id}/start                    -> start
/// POST   /{id}/transition               -> transition
///
/// GET    /{id}/prompts           -> list_by_league
/// POST   /{id}/prompts           -> create
/// GET    /{id}/prompts/current   -> current
/// PUT    /{id}/prompts/queue     -> reorder
/// ```
pub fn router() -> Router<AppState> {
    let prompt_routes = Router::new()
        .route("/", get(prompt::list_by_league).post(prompt::create))
        .route("/current", get(prompt::current))
        .route("/queue", put(prompt::reorder));

    Router::new()
        .route("/", get(league::list).post(league::create))
        .route("/join", post(league::join))
        .route("/{id}", get(league::get_by_id).put(league::update))
        .route("/{id}/leave", post(league::leave))
        .route("/{id}/members", get(league::members))
        .route("/{id}/leaderboard", get(leaderboard::get))
        .route("/{id}/start", post(cycle::start))
        .route("/{id}/transition", post(cycle::transition))
        .nest("/{id}/prompts", prompt_routes)
}
