//! Response (photo submission) model and DTOs.

use challenge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Response {
    pub id: DbId,
    pub prompt_id: DbId,
    pub user_id: DbId,
    pub image_url: String,
    pub caption: Option<String>,
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
    pub total_points: i64,
    pub final_rank: Option<i32>,
    pub submitted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `PUT /prompts/{id}/response`.
///
/// The image itself is uploaded to object storage by the client; only the
/// resulting URL is stored here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertResponse {
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub caption: Option<String>,
}

/// Anonymous view of a published response shown while voting is open.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BallotEntry {
    pub id: DbId,
    pub image_url: String,
    pub caption: Option<String>,
    pub published_at: Option<Timestamp>,
}

/// A scored response with its author, shown once a prompt is completed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResponseResult {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub image_url: String,
    pub caption: Option<String>,
    pub total_points: i64,
    pub final_rank: Option<i32>,
}
