//! Vote point curve and ranking.
//!
//! A voter ranks up to `votes_per_player` responses. Rank 1 is worth
//! `votes_per_player` points and each following rank one point less, so the
//! last allowed rank is worth exactly one point.
//!
//! Ranking uses competition ranks: entries are ordered by total points
//! descending, then by first-place votes descending. Entries equal on both
//! share a rank and the next rank skips (`1, 1, 3`).

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Points awarded by a single vote of the given `rank`.
pub fn points_for_rank(rank: i32, votes_per_player: i32) -> Result<i32, CoreError> {
    if votes_per_player < 1 {
        return Err(CoreError::Validation(
            "votes_per_player must be at least 1".into(),
        ));
    }
    if !(1..=votes_per_player).contains(&rank) {
        return Err(CoreError::Validation(format!(
            "rank must be between 1 and {votes_per_player}"
        )));
    }
    Ok(votes_per_player - rank + 1)
}

/// Aggregated votes received by one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseTally {
    pub response_id: DbId,
    pub total_points: i64,
    pub first_place_votes: i64,
}

/// Final placement for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankedResponse {
    pub response_id: DbId,
    pub total_points: i64,
    pub final_rank: i32,
}

/// Assign competition ranks to `items` ordered by `key` descending.
///
/// Items with equal keys share a rank. The returned vector is sorted by
/// rank; ties keep their input order.
pub fn assign_ranks<T, K, F>(mut items: Vec<T>, key: F) -> Vec<(T, i32)>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));

    let mut ranked: Vec<(T, i32)> = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some((prev, prev_rank)) if key(prev) == key(&item) => *prev_rank,
            _ => position as i32 + 1,
        };
        ranked.push((item, rank));
    }
    ranked
}

/// Rank the responses of a completed prompt.
///
/// Responses without votes must be passed with zero points; they end up
/// sharing the lowest rank.
pub fn rank_responses(tallies: &[ResponseTally]) -> Vec<RankedResponse> {
    let mut sorted = tallies.to_vec();
    sorted.sort_by_key(|t| t.response_id);

    assign_ranks(sorted, |t| (t.total_points, t.first_place_votes))
        .into_iter()
        .map(|(t, final_rank)| RankedResponse {
            response_id: t.response_id,
            total_points: t.total_points,
            final_rank,
        })
        .collect()
}
