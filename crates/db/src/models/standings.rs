//! League leaderboard rows.

use challenge_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// Aggregated results of one member across a league's completed prompts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StandingRow {
    pub user_id: DbId,
    pub username: String,
    pub total_points: i64,
    pub wins: i64,
    pub submissions: i64,
}
