//! League-scoped authorization.
//!
//! Missing leagues are 404, existing leagues the caller may not touch are
//! 403. Handlers call these before doing any league-scoped work.

use challenge_core::error::CoreError;
use challenge_core::types::DbId;
use challenge_db::models::league::League;
use challenge_db::models::prompt::Prompt;
use challenge_db::repositories::{LeagueRepo, MembershipRepo, PromptRepo};
use challenge_db::DbPool;

use crate::error::{AppError, AppResult};

/// Load a league or fail with 404.
pub async fn find_league(pool: &DbPool, league_id: DbId) -> AppResult<League> {
    LeagueRepo::find_by_id(pool, league_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "League",
            id: league_id,
        }))
}

/// Load a prompt or fail with 404.
pub async fn find_prompt(pool: &DbPool, prompt_id: DbId) -> AppResult<Prompt> {
    PromptRepo::find_by_id(pool, prompt_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Prompt",
            id: prompt_id,
        }))
}

/// Load a league the user actively belongs to.
pub async fn member_league(pool: &DbPool, league_id: DbId, user_id: DbId) -> AppResult<League> {
    let league = find_league(pool, league_id).await?;
    ensure_member(pool, &league, user_id).await?;
    Ok(league)
}

/// Load a league owned by the user.
pub async fn owned_league(pool: &DbPool, league_id: DbId, user_id: DbId) -> AppResult<League> {
    let league = find_league(pool, league_id).await?;
    ensure_owner(&league, user_id)?;
    Ok(league)
}

/// Fail with 403 unless the user is an active member of the league.
pub async fn ensure_member(pool: &DbPool, league: &League, user_id: DbId) -> AppResult<()> {
    if MembershipRepo::is_active_member(pool, league.id, user_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You are not a member of this league".into(),
        )))
    }
}

/// Fail with 403 unless the user owns the league.
pub fn ensure_owner(league: &League, user_id: DbId) -> AppResult<()> {
    if league.is_owned_by(user_id) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only the league owner can do this".into(),
        )))
    }
}

/// Load a prompt together with its league, requiring active membership.
pub async fn member_prompt(
    pool: &DbPool,
    prompt_id: DbId,
    user_id: DbId,
) -> AppResult<(Prompt, League)> {
    let prompt = find_prompt(pool, prompt_id).await?;
    let league = member_league(pool, prompt.league_id, user_id).await?;
    Ok((prompt, league))
}

/// Load a prompt together with its league, requiring ownership.
pub async fn owned_prompt(
    pool: &DbPool,
    prompt_id: DbId,
    user_id: DbId,
) -> AppResult<(Prompt, League)> {
    let prompt = find_prompt(pool, prompt_id).await?;
    let league = owned_league(pool, prompt.league_id, user_id).await?;
    Ok((prompt, league))
}
