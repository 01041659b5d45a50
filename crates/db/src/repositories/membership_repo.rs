//! Repository for the `league_memberships` table.

use challenge_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::membership::{LeagueMember, LeagueMembership};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, league_id, user_id, is_active, joined_at, updated_at";

/// Provides membership queries for leagues.
pub struct MembershipRepo;

impl MembershipRepo {
    /// Join a league, reactivating a previous membership if one exists.
    pub async fn join(
        pool: &PgPool,
        league_id: DbId,
        user_id: DbId,
    ) -> Result<LeagueMembership, sqlx::Error> {
        let query = format!(
            "INSERT INTO league_memberships (league_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (league_id, user_id) DO UPDATE SET is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LeagueMembership>(&query)
            .bind(league_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Whether the user currently belongs to the league.
    pub async fn is_active_member(
        pool: &PgPool,
        league_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM league_memberships
                 WHERE league_id = $1 AND user_id = $2 AND is_active = true
             )",
        )
        .bind(league_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Deactivate a membership. Returns `true` if an active row was updated.
    pub async fn leave(pool: &PgPool, league_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE league_memberships SET is_active = false
             WHERE league_id = $1 AND user_id = $2 AND is_active = true",
        )
        .bind(league_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active members with their usernames, owner first, then by join time.
    pub async fn list_members(
        pool: &PgPool,
        league_id: DbId,
    ) -> Result<Vec<LeagueMember>, sqlx::Error> {
        sqlx::query_as::<_, LeagueMember>(
            "SELECT m.user_id, u.username, (l.owner_id = m.user_id) AS is_owner, m.joined_at
             FROM league_memberships m
             JOIN users u ON u.id = m.user_id
             JOIN leagues l ON l.id = m.league_id
             WHERE m.league_id = $1 AND m.is_active = true
             ORDER BY is_owner DESC, m.joined_at, m.user_id",
        )
        .bind(league_id)
        .fetch_all(pool)
        .await
    }

    /// User IDs of all active members. Used for notification fan-out.
    pub async fn active_member_ids(
        pool: &PgPool,
        league_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT user_id FROM league_memberships
             WHERE league_id = $1 AND is_active = true
             ORDER BY user_id",
        )
        .bind(league_id)
        .fetch_all(pool)
        .await
    }

    /// Lock the user's active membership row for the caller's transaction.
    ///
    /// Serializes concurrent vote submissions by the same member.
    pub async fn lock_active(
        conn: &mut PgConnection,
        league_id: DbId,
        user_id: DbId,
    ) -> Result<Option<LeagueMembership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM league_memberships
             WHERE league_id = $1 AND user_id = $2 AND is_active = true
             FOR UPDATE"
        );
        sqlx::query_as::<_, LeagueMembership>(&query)
            .bind(league_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }
}
