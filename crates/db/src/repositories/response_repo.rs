//! Repository for the `responses` table.

use challenge_core::scoring::RankedResponse;
use challenge_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::response::{BallotEntry, Response, ResponseResult, UpsertResponse};
use crate::models::status::PromptStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, prompt_id, user_id, image_url, caption, is_published, published_at, \
                        total_points, final_rank, submitted_at, created_at, updated_at";

/// Provides queries for prompt responses.
pub struct ResponseRepo;

impl ResponseRepo {
    /// Create or replace the user's response to an active prompt.
    ///
    /// Keyed by the unique `(user_id, prompt_id)` pair, so concurrent
    /// resubmissions collapse into one row. The prompt row is share-locked
    /// for the statement, which orders the write against a concurrent
    /// `Active -> Voting` transition. Returns `None` if the prompt is not
    /// accepting submissions.
    pub async fn upsert(
        pool: &PgPool,
        prompt_id: DbId,
        user_id: DbId,
        input: &UpsertResponse,
    ) -> Result<Option<Response>, sqlx::Error> {
        let query = format!(
            "INSERT INTO responses (prompt_id, user_id, image_url, caption)
             SELECT $1, $2, $3, $4
             WHERE EXISTS (
                 SELECT 1 FROM prompts WHERE id = $1 AND status_id = $5 FOR SHARE
             )
             ON CONFLICT (user_id, prompt_id) DO UPDATE SET
                image_url = EXCLUDED.image_url,
                caption = EXCLUDED.caption,
                submitted_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Response>(&query)
            .bind(prompt_id)
            .bind(user_id)
            .bind(&input.image_url)
            .bind(&input.caption)
            .bind(PromptStatus::Active.id())
            .fetch_optional(pool)
            .await
    }

    /// Find a response by its internal ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Response>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM responses WHERE id = $1");
        sqlx::query_as::<_, Response>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// The user's own response to a prompt, if submitted.
    pub async fn find_for_user(
        pool: &PgPool,
        prompt_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Response>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM responses WHERE prompt_id = $1 AND user_id = $2");
        sqlx::query_as::<_, Response>(&query)
            .bind(prompt_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Withdraw the user's response while the prompt is still active.
    pub async fn delete_for_user(
        pool: &PgPool,
        prompt_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM responses
             WHERE prompt_id = $1 AND user_id = $2
               AND EXISTS (
                   SELECT 1 FROM prompts WHERE id = $1 AND status_id = $3 FOR SHARE
               )",
        )
        .bind(prompt_id)
        .bind(user_id)
        .bind(PromptStatus::Active.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Publish every response of a prompt. Returns the number published.
    pub async fn publish_all(
        conn: &mut PgConnection,
        prompt_id: DbId,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE responses SET is_published = true, published_at = $2
             WHERE prompt_id = $1 AND is_published = false",
        )
        .bind(prompt_id)
        .bind(now)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Published responses of a prompt without author information.
    pub async fn list_ballot(
        pool: &PgPool,
        prompt_id: DbId,
    ) -> Result<Vec<BallotEntry>, sqlx::Error> {
        sqlx::query_as::<_, BallotEntry>(
            "SELECT id, image_url, caption, published_at FROM responses
             WHERE prompt_id = $1 AND is_published = true
             ORDER BY id",
        )
        .bind(prompt_id)
        .fetch_all(pool)
        .await
    }

    /// Scored responses with authors, best rank first.
    pub async fn list_results(
        pool: &PgPool,
        prompt_id: DbId,
    ) -> Result<Vec<ResponseResult>, sqlx::Error> {
        sqlx::query_as::<_, ResponseResult>(
            "SELECT r.id, r.user_id, u.username, r.image_url, r.caption,
                    r.total_points, r.final_rank
             FROM responses r
             JOIN users u ON u.id = r.user_id
             WHERE r.prompt_id = $1
             ORDER BY r.final_rank NULLS LAST, r.id",
        )
        .bind(prompt_id)
        .fetch_all(pool)
        .await
    }

    /// Persist final points and ranks computed for a completed prompt.
    pub async fn apply_scores(
        conn: &mut PgConnection,
        prompt_id: DbId,
        ranked: &[RankedResponse],
    ) -> Result<(), sqlx::Error> {
        for r in ranked {
            sqlx::query(
                "UPDATE responses SET total_points = $3, final_rank = $4
                 WHERE id = $1 AND prompt_id = $2",
            )
            .bind(r.response_id)
            .bind(prompt_id)
            .bind(r.total_points)
            .bind(r.final_rank)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
