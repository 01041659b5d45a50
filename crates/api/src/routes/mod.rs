pub mod auth;
pub mod cron;
pub mod health;
pub mod leagues;
pub mod prompts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /leagues                                         list, create
/// /leagues/join                                    join by invite code (POST)
/// /leagues/{id}                                    get, update
/// /leagues/{id}/leave                              leave (POST)
/// /leagues/{id}/members                            active members
/// /leagues/{id}/leaderboard                        standings
/// /leagues/{id}/start                              start league (POST, owner)
/// /leagues/{id}/transition                         force one step (POST, owner)
/// /leagues/{id}/prompts                            list, create
/// /leagues/{id}/prompts/current                    open prompt + deadline
/// /leagues/{id}/prompts/queue                      reorder (PUT, owner)
///
/// /prompts/{id}                                    update, delete (scheduled only)
/// /prompts/{id}/response                           submit, withdraw own response
/// /prompts/{id}/responses                          list (view depends on status)
/// /prompts/{id}/votes                              cast (POST)
/// /prompts/{id}/votes/mine                         own votes
/// /prompts/{id}/votes/{vote_id}                    retract (DELETE)
///
/// /cron/process-prompts                            queue sweep (POST, cron secret)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/leagues", leagues::router())
        .nest("/prompts", prompts::router())
        .nest("/cron", cron::router())
}
