//! Vote model and DTOs.

use challenge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vote {
    pub id: DbId,
    pub prompt_id: DbId,
    pub response_id: DbId,
    pub voter_id: DbId,
    pub rank: i32,
    pub points: i32,
    pub created_at: Timestamp,
}

/// Request body for `POST /prompts/{id}/votes`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CastVote {
    pub response_id: DbId,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub rank: i32,
}

/// DTO for inserting a vote once rank and points are resolved.
#[derive(Debug, Clone)]
pub struct NewVote {
    pub prompt_id: DbId,
    pub response_id: DbId,
    pub voter_id: DbId,
    pub rank: i32,
    pub points: i32,
}

/// Per-response vote aggregate used when scoring a prompt.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct VoteTally {
    pub response_id: DbId,
    pub total_points: i64,
    pub first_place_votes: i64,
}
