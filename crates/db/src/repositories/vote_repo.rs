//! Repository for the `votes` table.

use challenge_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::status::PromptStatus;
use crate::models::vote::{NewVote, Vote, VoteTally};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, prompt_id, response_id, voter_id, rank, points, created_at";

/// Provides queries for votes.
pub struct VoteRepo;

impl VoteRepo {
    /// Insert a vote. Allowance and eligibility checks are the caller's job
    /// and must happen in the same transaction.
    pub async fn insert(conn: &mut PgConnection, input: &NewVote) -> Result<Vote, sqlx::Error> {
        let query = format!(
            "INSERT INTO votes (prompt_id, response_id, voter_id, rank, points)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(input.prompt_id)
            .bind(input.response_id)
            .bind(input.voter_id)
            .bind(input.rank)
            .bind(input.points)
            .fetch_one(conn)
            .await
    }

    /// Number of votes the voter has cast on a prompt.
    pub async fn count_for_voter(
        conn: &mut PgConnection,
        prompt_id: DbId,
        voter_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM votes WHERE prompt_id = $1 AND voter_id = $2",
        )
        .bind(prompt_id)
        .bind(voter_id)
        .fetch_one(conn)
        .await
    }

    /// Votes the voter has cast on a prompt, best rank first.
    pub async fn list_for_voter(
        pool: &PgPool,
        prompt_id: DbId,
        voter_id: DbId,
    ) -> Result<Vec<Vote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM votes
             WHERE prompt_id = $1 AND voter_id = $2
             ORDER BY rank"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(prompt_id)
            .bind(voter_id)
            .fetch_all(pool)
            .await
    }

    /// Retract one of the voter's votes while voting is still open.
    pub async fn delete_own(
        pool: &PgPool,
        prompt_id: DbId,
        vote_id: DbId,
        voter_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM votes
             WHERE id = $1 AND prompt_id = $2 AND voter_id = $3
               AND EXISTS (
                   SELECT 1 FROM prompts WHERE id = $2 AND status_id = $4 FOR SHARE
               )",
        )
        .bind(vote_id)
        .bind(prompt_id)
        .bind(voter_id)
        .bind(PromptStatus::Voting.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Points and first-place votes per response of a prompt.
    ///
    /// Responses without votes are included with zeros.
    pub async fn tallies(
        conn: &mut PgConnection,
        prompt_id: DbId,
    ) -> Result<Vec<VoteTally>, sqlx::Error> {
        sqlx::query_as::<_, VoteTally>(
            "SELECT r.id AS response_id,
                    COALESCE(SUM(v.points), 0)::BIGINT AS total_points,
                    COUNT(v.id) FILTER (WHERE v.rank = 1) AS first_place_votes
             FROM responses r
             LEFT JOIN votes v ON v.response_id = r.id
             WHERE r.prompt_id = $1
             GROUP BY r.id
             ORDER BY r.id",
        )
        .bind(prompt_id)
        .fetch_all(conn)
        .await
    }
}
