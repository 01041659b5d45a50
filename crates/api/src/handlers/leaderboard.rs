//! League standings.

use axum::extract::{Path, State};
use axum::Json;
use challenge_core::scoring::assign_ranks;
use challenge_core::types::DbId;
use challenge_db::repositories::LeagueRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::league_access::member_league;
use crate::response::DataResponse;
use crate::state::AppState;

/// One row of the leaderboard.
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub user_id: DbId,
    pub username: String,
    pub total_points: i64,
    pub wins: i64,
    pub submissions: i64,
}

/// GET /api/v1/leagues/{id}/leaderboard
///
/// Members equal on points and wins share a rank.
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(league_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<LeaderboardEntry>>>> {
    member_league(&state.pool, league_id, auth.user_id).await?;

    let rows = LeagueRepo::standings(&state.pool, league_id).await?;
    let data = assign_ranks(rows, |r| (r.total_points, r.wins))
        .into_iter()
        .map(|(row, rank)| LeaderboardEntry {
            rank,
            user_id: row.user_id,
            username: row.username,
            total_points: row.total_points,
            wins: row.wins,
            submissions: row.submissions,
        })
        .collect();
    Ok(Json(DataResponse { data }))
}
