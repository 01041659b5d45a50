//! Repository for the `leagues` table.

use challenge_core::league::{
    DEFAULT_SUBMISSION_DAYS, DEFAULT_VOTES_PER_PLAYER, DEFAULT_VOTING_DAYS,
};
use challenge_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::league::{CreateLeague, League, UpdateLeague};
use crate::models::standings::StandingRow;
use crate::models::status::PromptStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, owner_id, invite_code, submission_days, voting_days, \
                        votes_per_player, is_started, created_at, updated_at";

/// Provides CRUD operations for leagues.
pub struct LeagueRepo;

impl LeagueRepo {
    /// Insert a new league owned by `owner_id` and enrol the owner as an
    /// active member, in one transaction.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        invite_code: &str,
        input: &CreateLeague,
    ) -> Result<League, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO leagues
                 (name, owner_id, invite_code, submission_days, voting_days, votes_per_player)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let league = sqlx::query_as::<_, League>(&query)
            .bind(&input.name)
            .bind(owner_id)
            .bind(invite_code)
            .bind(input.submission_days.unwrap_or(DEFAULT_SUBMISSION_DAYS))
            .bind(input.voting_days.unwrap_or(DEFAULT_VOTING_DAYS))
            .bind(input.votes_per_player.unwrap_or(DEFAULT_VOTES_PER_PLAYER))
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO league_memberships (league_id, user_id) VALUES ($1, $2)")
            .bind(league.id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(league)
    }

    /// Find a league by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<League>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leagues WHERE id = $1");
        sqlx::query_as::<_, League>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a league by its (normalized) invite code.
    pub async fn find_by_invite_code(
        pool: &PgPool,
        invite_code: &str,
    ) -> Result<Option<League>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leagues WHERE invite_code = $1");
        sqlx::query_as::<_, League>(&query)
            .bind(invite_code)
            .fetch_optional(pool)
            .await
    }

    /// List leagues the user is an active member of, newest first.
    pub async fn list_for_member(pool: &PgPool, user_id: DbId) -> Result<Vec<League>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM leagues l
             JOIN league_memberships m ON m.league_id = l.id
             WHERE m.user_id = $1 AND m.is_active = true
             ORDER BY l.created_at DESC",
            prefixed_columns("l")
        );
        sqlx::query_as::<_, League>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// IDs of every league, in creation order. Used by the queue sweep.
    pub async fn list_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM leagues ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Update a league. Only non-`None` fields in `input` are applied.
    ///
    /// Callers hold [`lock`](Self::lock) so settings cannot change under a
    /// running cycle step. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateLeague,
    ) -> Result<Option<League>, sqlx::Error> {
        let query = format!(
            "UPDATE leagues SET
                name = COALESCE($2, name),
                submission_days = COALESCE($3, submission_days),
                voting_days = COALESCE($4, voting_days),
                votes_per_player = COALESCE($5, votes_per_player)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, League>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.submission_days)
            .bind(input.voting_days)
            .bind(input.votes_per_player)
            .fetch_optional(conn)
            .await
    }

    /// Mark a league as started. Returns `false` if it already was.
    pub async fn mark_started(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE leagues SET is_started = true WHERE id = $1 AND is_started = false")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lock the league row for the rest of the caller's transaction.
    ///
    /// Every prompt-cycle step and queue mutation takes this lock first, so
    /// concurrent sweeps, owner actions and queue edits for the same league
    /// are serialized.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<Option<League>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leagues WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, League>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Read the league under a share lock held until the caller commits.
    ///
    /// Blocks settings changes and cycle steps for the league, which take
    /// [`lock`](Self::lock).
    pub async fn find_for_share(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<League>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM leagues WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, League>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Aggregate standings of the league's active members.
    ///
    /// Points and wins only count completed prompts; `submissions` counts
    /// every response the member made in this league.
    pub async fn standings(
        pool: &PgPool,
        league_id: DbId,
    ) -> Result<Vec<StandingRow>, sqlx::Error> {
        sqlx::query_as::<_, StandingRow>(
            "SELECT u.id AS user_id,
                    u.username,
                    COALESCE(SUM(r.total_points) FILTER (WHERE p.status_id = $2), 0)::BIGINT
                        AS total_points,
                    COUNT(r.id) FILTER (WHERE p.status_id = $2 AND r.final_rank = 1) AS wins,
                    COUNT(r.id) AS submissions
             FROM league_memberships m
             JOIN users u ON u.id = m.user_id
             LEFT JOIN prompts p ON p.league_id = m.league_id
             LEFT JOIN responses r ON r.prompt_id = p.id AND r.user_id = m.user_id
             WHERE m.league_id = $1 AND m.is_active = true
             GROUP BY u.id, u.username
             ORDER BY total_points DESC, wins DESC, u.username",
        )
        .bind(league_id)
        .bind(PromptStatus::Completed.id())
        .fetch_all(pool)
        .await
    }
}

/// `COLUMNS` qualified with a table alias for JOIN queries.
fn prefixed_columns(alias: &str) -> String {
    COLUMNS
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
