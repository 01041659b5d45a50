//! Repository for the `prompts` table.
//!
//! Status changes are single conditional updates guarded by the current
//! status (`... WHERE status_id = <expected>`), so a step that lost a race
//! returns `None` instead of applying twice. Queue mutations and status
//! changes run inside a transaction holding the league lock
//! ([`LeagueRepo::lock`](crate::repositories::LeagueRepo::lock)).

use challenge_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::prompt::Prompt;
use crate::models::status::{PromptStatus, StatusId};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, league_id, text, status_id, queue_order, phase_started_at, \
                        week_start, week_end, vote_start, vote_end, created_at, updated_at";

/// Provides queries and guarded transitions for prompts.
pub struct PromptRepo;

impl PromptRepo {
    /// Append a scheduled prompt to the end of the league queue.
    ///
    /// Must run under the league lock so two appends cannot pick the same
    /// position.
    pub async fn create_scheduled(
        conn: &mut PgConnection,
        league_id: DbId,
        text: &str,
    ) -> Result<Prompt, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompts (league_id, text, status_id, queue_order)
             SELECT $1, $2, $3, COALESCE(MAX(queue_order), 0) + 1
             FROM prompts WHERE league_id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(league_id)
            .bind(text)
            .bind(PromptStatus::Scheduled.id())
            .fetch_one(conn)
            .await
    }

    /// Find a prompt by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompts WHERE id = $1");
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a league's prompts, optionally filtered by status.
    ///
    /// Ordered by status then queue position, so the upcoming queue reads
    /// top to bottom and completed prompts come last.
    pub async fn list_by_league(
        pool: &PgPool,
        league_id: DbId,
        status: Option<StatusId>,
    ) -> Result<Vec<Prompt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompts
             WHERE league_id = $1 AND ($2::SMALLINT IS NULL OR status_id = $2)
             ORDER BY status_id, queue_order, id"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(league_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// The league's open prompt (active or voting), if any.
    ///
    /// Derived from status rather than stored on the league; at most one row
    /// can match thanks to `uq_prompts_one_open_per_league`.
    pub async fn find_open(pool: &PgPool, league_id: DbId) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompts
             WHERE league_id = $1 AND status_id IN ($2, $3)"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(league_id)
            .bind(PromptStatus::Active.id())
            .bind(PromptStatus::Voting.id())
            .fetch_optional(pool)
            .await
    }

    /// Same as [`find_open`](Self::find_open) inside a transaction.
    pub async fn find_open_in(
        conn: &mut PgConnection,
        league_id: DbId,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompts
             WHERE league_id = $1 AND status_id IN ($2, $3)"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(league_id)
            .bind(PromptStatus::Active.id())
            .bind(PromptStatus::Voting.id())
            .fetch_optional(conn)
            .await
    }

    /// Read a prompt while holding a share lock until the caller commits.
    ///
    /// Blocks concurrent status changes of the prompt, so work validated
    /// against its status (votes, submissions) cannot straddle a transition.
    pub async fn find_for_share(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompts WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// IDs of the league's scheduled prompts in queue order.
    pub async fn scheduled_ids(
        conn: &mut PgConnection,
        league_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM prompts
             WHERE league_id = $1 AND status_id = $2
             ORDER BY queue_order, id",
        )
        .bind(league_id)
        .bind(PromptStatus::Scheduled.id())
        .fetch_all(conn)
        .await
    }

    /// Edit the text of a scheduled prompt.
    ///
    /// Returns `None` if the prompt does not exist or has left the queue.
    pub async fn update_scheduled_text(
        pool: &PgPool,
        id: DbId,
        text: &str,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "UPDATE prompts SET text = $2
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .bind(text)
            .bind(PromptStatus::Scheduled.id())
            .fetch_optional(pool)
            .await
    }

    /// Delete a scheduled prompt and close the gap it leaves in the queue.
    ///
    /// Returns `false` if the prompt is not scheduled (or gone).
    pub async fn delete_scheduled(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let removed: Option<(DbId, i32)> = sqlx::query_as(
            "DELETE FROM prompts WHERE id = $1 AND status_id = $2
             RETURNING league_id, queue_order",
        )
        .bind(id)
        .bind(PromptStatus::Scheduled.id())
        .fetch_optional(&mut *conn)
        .await?;

        match removed {
            Some((league_id, queue_order)) => {
                Self::shift_queue_after(conn, league_id, queue_order).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rewrite queue positions. `positions` must cover the whole queue.
    pub async fn apply_queue_positions(
        conn: &mut PgConnection,
        league_id: DbId,
        positions: &[(DbId, i32)],
    ) -> Result<(), sqlx::Error> {
        for &(id, queue_order) in positions {
            sqlx::query(
                "UPDATE prompts SET queue_order = $3
                 WHERE id = $1 AND league_id = $2 AND status_id = $4",
            )
            .bind(id)
            .bind(league_id)
            .bind(queue_order)
            .bind(PromptStatus::Scheduled.id())
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Guarded transitions
    // -----------------------------------------------------------------------

    /// Activate the lowest-positioned scheduled prompt of a league.
    ///
    /// Starts the submission window at `now` and closes it at `week_end`.
    /// The remaining scheduled prompts move up one position. Returns `None`
    /// when the queue is empty.
    pub async fn activate_next(
        conn: &mut PgConnection,
        league_id: DbId,
        now: Timestamp,
        week_end: Timestamp,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "UPDATE prompts SET
                status_id = $4,
                phase_started_at = $2,
                week_start = $2,
                week_end = $3
             WHERE id = (
                 SELECT id FROM prompts
                 WHERE league_id = $1 AND status_id = $5
                 ORDER BY queue_order, id
                 LIMIT 1
             )
               AND status_id = $5
             RETURNING {COLUMNS}"
        );
        let activated = sqlx::query_as::<_, Prompt>(&query)
            .bind(league_id)
            .bind(now)
            .bind(week_end)
            .bind(PromptStatus::Active.id())
            .bind(PromptStatus::Scheduled.id())
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(prompt) = &activated {
            Self::shift_queue_after(conn, league_id, prompt.queue_order).await?;
        }
        Ok(activated)
    }

    /// Close submissions: `Active -> Voting`, voting window `now..vote_end`.
    pub async fn open_voting(
        conn: &mut PgConnection,
        id: DbId,
        now: Timestamp,
        vote_end: Timestamp,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "UPDATE prompts SET
                status_id = $4,
                phase_started_at = $2,
                vote_start = $2,
                vote_end = $3
             WHERE id = $1 AND status_id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .bind(now)
            .bind(vote_end)
            .bind(PromptStatus::Voting.id())
            .bind(PromptStatus::Active.id())
            .fetch_optional(conn)
            .await
    }

    /// Close voting: `Voting -> Completed`.
    pub async fn complete(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Prompt>, sqlx::Error> {
        let query = format!(
            "UPDATE prompts SET status_id = $2
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prompt>(&query)
            .bind(id)
            .bind(PromptStatus::Completed.id())
            .bind(PromptStatus::Voting.id())
            .fetch_optional(conn)
            .await
    }

    /// Move every scheduled prompt behind `queue_order` up one position.
    async fn shift_queue_after(
        conn: &mut PgConnection,
        league_id: DbId,
        queue_order: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE prompts SET queue_order = queue_order - 1
             WHERE league_id = $1 AND status_id = $2 AND queue_order > $3",
        )
        .bind(league_id)
        .bind(PromptStatus::Scheduled.id())
        .bind(queue_order)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
