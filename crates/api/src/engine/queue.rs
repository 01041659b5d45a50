//! Queue mutations for scheduled prompts.
//!
//! Each operation runs under the league lock so positions stay 1-based and
//! contiguous even when edits race with each other or with an activation.

use challenge_core::error::CoreError;
use challenge_core::queue::{queue_positions, validate_reorder};
use challenge_core::types::DbId;
use challenge_db::models::prompt::Prompt;
use challenge_db::models::status::PromptStatus;
use challenge_db::repositories::{LeagueRepo, PromptRepo};
use challenge_db::DbPool;

use crate::error::{AppError, AppResult};

/// Append a prompt to the end of the league's queue.
pub async fn append(pool: &DbPool, league_id: DbId, text: &str) -> AppResult<Prompt> {
    let mut tx = pool.begin().await?;
    lock_league(&mut tx, league_id).await?;

    let prompt = PromptRepo::create_scheduled(&mut *tx, league_id, text).await?;
    tx.commit().await?;

    tracing::info!(
        league_id,
        prompt_id = prompt.id,
        queue_order = prompt.queue_order,
        "Prompt scheduled"
    );
    Ok(prompt)
}

/// Remove a scheduled prompt and close the gap behind it.
pub async fn remove(pool: &DbPool, prompt: &Prompt) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    lock_league(&mut tx, prompt.league_id).await?;

    if !PromptRepo::delete_scheduled(&mut *tx, prompt.id).await? {
        return Err(not_scheduled("deleted"));
    }
    tx.commit().await?;

    tracing::info!(league_id = prompt.league_id, prompt_id = prompt.id, "Prompt deleted");
    Ok(())
}

/// Rewrite queue positions to follow `prompt_ids`.
///
/// The list must name every scheduled prompt of the league exactly once.
/// Returns the queue in its new order.
pub async fn reorder(
    pool: &DbPool,
    league_id: DbId,
    prompt_ids: &[DbId],
) -> AppResult<Vec<Prompt>> {
    let mut tx = pool.begin().await?;
    lock_league(&mut tx, league_id).await?;

    let scheduled = PromptRepo::scheduled_ids(&mut *tx, league_id).await?;
    validate_reorder(prompt_ids, &scheduled)?;

    let positions = queue_positions(prompt_ids);
    PromptRepo::apply_queue_positions(&mut *tx, league_id, &positions).await?;
    tx.commit().await?;

    tracing::info!(league_id, prompts = positions.len(), "Prompt queue reordered");
    Ok(PromptRepo::list_by_league(pool, league_id, Some(PromptStatus::Scheduled.id())).await?)
}

/// Change the text of a scheduled prompt.
pub async fn edit_text(pool: &DbPool, prompt: &Prompt, text: &str) -> AppResult<Prompt> {
    PromptRepo::update_scheduled_text(pool, prompt.id, text)
        .await?
        .ok_or_else(|| not_scheduled("edited"))
}

async fn lock_league(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    league_id: DbId,
) -> AppResult<()> {
    LeagueRepo::lock(&mut **tx, league_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "League",
            id: league_id,
        }))
}

fn not_scheduled(action: &str) -> AppError {
    AppError::Core(CoreError::Validation(format!(
        "Only scheduled prompts can be {action}"
    )))
}
