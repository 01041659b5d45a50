//! Prompt entity model and DTOs.

use challenge_core::phase::current_deadline;
use challenge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::status::StatusId;

/// A prompt row from the `prompts` table.
///
/// `queue_order` is only meaningful while the prompt is scheduled; once
/// activated it keeps the position it left the queue from.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Prompt {
    pub id: DbId,
    pub league_id: DbId,
    pub text: String,
    pub status_id: StatusId,
    pub queue_order: i32,
    pub phase_started_at: Option<Timestamp>,
    pub week_start: Option<Timestamp>,
    pub week_end: Option<Timestamp>,
    pub vote_start: Option<Timestamp>,
    pub vote_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Prompt {
    /// Stored end of the open phase, `None` for scheduled or completed prompts.
    pub fn phase_deadline(&self) -> Option<Timestamp> {
        current_deadline(self.status_id, self.week_end, self.vote_end)
    }
}

/// DTO for queueing a new prompt.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePrompt {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub text: String,
}

/// DTO for editing a scheduled prompt.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePrompt {
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub text: String,
}

/// Request body for `PUT /leagues/{id}/prompts/queue`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderQueue {
    pub prompt_ids: Vec<DbId>,
}
