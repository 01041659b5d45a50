//! Route definitions for scheduler hooks.

use axum::routing::post;
use axum::Router;

use crate::handlers::cycle;
use crate::state::AppState;

/// Routes mounted at `/cron`.
///
/// ```text
/// POST   /process-prompts   -> process_prompts
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/process-prompts", post(cycle::process_prompts))
}
