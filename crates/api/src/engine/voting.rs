//! Vote casting.
//!
//! The allowance check (`votes_per_player`) and the insert share one
//! transaction that holds the voter's membership row lock, so concurrent
//! requests by the same voter are counted one after the other. The league
//! and the prompt are share-locked so neither the league settings nor the
//! prompt status can change halfway through a cast.

use challenge_core::error::CoreError;
use challenge_core::scoring::points_for_rank;
use challenge_core::types::DbId;
use challenge_db::models::status::PromptStatus;
use challenge_db::models::vote::{CastVote, NewVote, Vote};
use challenge_db::repositories::{LeagueRepo, MembershipRepo, PromptRepo, ResponseRepo, VoteRepo};
use challenge_db::DbPool;

use crate::error::{is_unique_violation, AppError, AppResult};

/// Record a ranked vote by `voter_id` on a response of `prompt_id`.
pub async fn cast(
    pool: &DbPool,
    prompt_id: DbId,
    voter_id: DbId,
    input: &CastVote,
) -> AppResult<Vote> {
    // A prompt never changes league, so the id can be read before locking.
    let league_id = PromptRepo::find_by_id(pool, prompt_id)
        .await?
        .map(|p| p.league_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prompt",
            id: prompt_id,
        }))?;

    let mut tx = pool.begin().await?;

    // League before prompt, the same order a cycle step locks them in.
    let league = LeagueRepo::find_for_share(&mut *tx, league_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "League",
            id: league_id,
        }))?;
    let prompt = PromptRepo::find_for_share(&mut *tx, prompt_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prompt",
            id: prompt_id,
        }))?;
    if prompt.status_id != PromptStatus::Voting.id() {
        return Err(AppError::Core(CoreError::Validation(
            "Voting is not open for this prompt".into(),
        )));
    }

    MembershipRepo::lock_active(&mut *tx, league.id, voter_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "You are not a member of this league".into(),
            ))
        })?;
    let points = points_for_rank(input.rank, league.votes_per_player)?;

    let response = ResponseRepo::find_by_id(&mut *tx, input.response_id)
        .await?
        .filter(|r| r.prompt_id == prompt.id && r.is_published)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Response",
            id: input.response_id,
        }))?;
    if response.user_id == voter_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot vote for your own response".into(),
        )));
    }

    let used = VoteRepo::count_for_voter(&mut *tx, prompt.id, voter_id).await?;
    if used >= i64::from(league.votes_per_player) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "You have already cast all {} votes for this prompt",
            league.votes_per_player
        ))));
    }

    let new_vote = NewVote {
        prompt_id: prompt.id,
        response_id: response.id,
        voter_id,
        rank: input.rank,
        points,
    };
    let vote = VoteRepo::insert(&mut *tx, &new_vote)
        .await
        .map_err(duplicate_vote)?;
    tx.commit().await?;

    tracing::info!(
        prompt_id,
        user_id = voter_id,
        response_id = vote.response_id,
        rank = vote.rank,
        "Vote cast"
    );
    Ok(vote)
}

/// Turn the per-voter unique constraints into readable conflicts.
fn duplicate_vote(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err, "uq_votes_voter_response") {
        AppError::Core(CoreError::Conflict(
            "You already voted for this response".into(),
        ))
    } else if is_unique_violation(&err, "uq_votes_voter_prompt_rank") {
        AppError::Core(CoreError::Conflict(
            "You already used this rank for this prompt".into(),
        ))
    } else {
        AppError::Database(err)
    }
}
