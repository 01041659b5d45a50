//! League membership model.

use challenge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `league_memberships` join table.
///
/// Ownership is tracked on `leagues.owner_id`, not here.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeagueMembership {
    pub id: DbId,
    pub league_id: DbId,
    pub user_id: DbId,
    pub is_active: bool,
    pub joined_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Active member listing entry joined with the user's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeagueMember {
    pub user_id: DbId,
    pub username: String,
    pub is_owner: bool,
    pub joined_at: Timestamp,
}
