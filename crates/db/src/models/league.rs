//! League entity model and DTOs.

use challenge_core::phase::PhaseSettings;
use challenge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A league row from the `leagues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct League {
    pub id: DbId,
    pub name: String,
    pub owner_id: DbId,
    pub invite_code: String,
    pub submission_days: i32,
    pub voting_days: i32,
    pub votes_per_player: i32,
    pub is_started: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl League {
    /// Phase durations configured for this league.
    pub fn phase_settings(&self) -> PhaseSettings {
        PhaseSettings {
            submission_days: self.submission_days,
            voting_days: self.voting_days,
            votes_per_player: self.votes_per_player,
        }
    }

    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.owner_id == user_id
    }
}

/// DTO for creating a new league. Omitted settings use the defaults in
/// [`challenge_core::league`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLeague {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 30))]
    pub submission_days: Option<i32>,
    #[validate(range(min = 1, max = 14))]
    pub voting_days: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub votes_per_player: Option<i32>,
}

/// DTO for updating a league. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLeague {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 30))]
    pub submission_days: Option<i32>,
    #[validate(range(min = 1, max = 14))]
    pub voting_days: Option<i32>,
    #[validate(range(min = 1, max = 10))]
    pub votes_per_player: Option<i32>,
}

impl UpdateLeague {
    /// Whether the update touches phase lengths or the vote allowance.
    pub fn changes_phase_settings(&self) -> bool {
        self.submission_days.is_some()
            || self.voting_days.is_some()
            || self.votes_per_player.is_some()
    }
}

/// Request body for `POST /leagues/join`.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinLeague {
    pub invite_code: String,
}
