//! HTTP-level integration tests for ranked voting.

mod common;

use axum::http::StatusCode;
use common::{
    add_prompt, body_json, create_league, delete_auth, force_transition, get_auth, join_league,
    post_json_auth, register, submit, TestUser,
};
use sqlx::PgPool;

/// A league with an open prompt, the owner and `n` members who submitted.
struct Round {
    app: axum::Router,
    owner: TestUser,
    players: Vec<TestUser>,
    league_id: i64,
    prompt_id: i64,
    entries: Vec<i64>,
}

async fn round_with_players(pool: PgPool, n: usize, open_voting: bool) -> Round {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;
    let league = create_league(&app, &owner, serde_json::json!({ "name": "Votes" })).await;
    let league_id = league["id"].as_i64().unwrap();

    let mut players = Vec::with_capacity(n);
    for i in 0..n {
        let player = register(&app, &format!("player{i}")).await;
        join_league(&app, &player, &league).await;
        players.push(player);
    }

    let prompt_id = add_prompt(&app, &owner, league_id, "Texture").await;
    force_transition(&app, &owner, league_id).await;

    let mut entries = Vec::with_capacity(n);
    for (i, player) in players.iter().enumerate() {
        entries.push(submit(&app, player, prompt_id, &format!("entry{i}")).await);
    }
    if open_voting {
        force_transition(&app, &owner, league_id).await;
    }

    Round {
        app,
        owner,
        players,
        league_id,
        prompt_id,
        entries,
    }
}

async fn cast(round: &Round, voter: &TestUser, response_id: i64, rank: i32) -> StatusCode {
    post_json_auth(
        round.app.clone(),
        &format!("/api/v1/prompts/{}/votes", round.prompt_id),
        serde_json::json!({ "response_id": response_id, "rank": rank }),
        &voter.token,
    )
    .await
    .status()
}

/// Votes are only accepted during the voting phase.
#[sqlx::test(migrations = "../../db/migrations")]
async fn voting_requires_voting_phase(pool: PgPool) {
    let round = round_with_players(pool, 2, false).await;
    let status = cast(&round, &round.players[0], round.entries[1], 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Voting for one's own response is rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn self_vote_is_rejected(pool: PgPool) {
    let round = round_with_players(pool, 2, true).await;
    let status = cast(&round, &round.players[0], round.entries[0], 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Ranks must lie within the league's vote allowance.
#[sqlx::test(migrations = "../../db/migrations")]
async fn rank_must_be_in_range(pool: PgPool) {
    let round = round_with_players(pool, 2, true).await;
    let voter = &round.players[0];
    assert_eq!(cast(&round, voter, round.entries[1], 0).await, StatusCode::BAD_REQUEST);
    assert_eq!(cast(&round, voter, round.entries[1], 4).await, StatusCode::BAD_REQUEST);
    assert_eq!(cast(&round, voter, round.entries[1], 3).await, StatusCode::CREATED);
}

/// The same response cannot be ranked twice, nor the same rank reused.
#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_votes_conflict(pool: PgPool) {
    let round = round_with_players(pool, 3, true).await;
    let voter = &round.players[0];

    assert_eq!(cast(&round, voter, round.entries[1], 1).await, StatusCode::CREATED);
    assert_eq!(cast(&round, voter, round.entries[1], 2).await, StatusCode::CONFLICT);
    assert_eq!(cast(&round, voter, round.entries[2], 1).await, StatusCode::CONFLICT);
    assert_eq!(cast(&round, voter, round.entries[2], 2).await, StatusCode::CREATED);
}

/// Unknown responses and outsiders are rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn vote_targets_and_voters_are_checked(pool: PgPool) {
    let round = round_with_players(pool, 2, true).await;
    assert_eq!(
        cast(&round, &round.players[0], 999_999, 1).await,
        StatusCode::NOT_FOUND
    );

    let outsider = register(&round.app, "outsider").await;
    assert_eq!(
        cast(&round, &outsider, round.entries[0], 1).await,
        StatusCode::FORBIDDEN
    );
}

/// Concurrent casts never exceed the allowance.
#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_votes_respect_allowance(pool: PgPool) {
    let round = round_with_players(pool.clone(), 6, true).await;
    let voter = &round.players[0];

    let attempts = round.entries[1..]
        .iter()
        .zip([1, 2, 3, 1, 2])
        .map(|(&entry, rank)| cast(&round, voter, entry, rank));
    let statuses = futures::future::join_all(attempts).await;

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    assert!(created <= 3, "created {created} votes: {statuses:?}");
    let expected = [StatusCode::CREATED, StatusCode::CONFLICT, StatusCode::BAD_REQUEST];
    assert!(statuses.iter().all(|s| expected.contains(s)), "{statuses:?}");

    let stored: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM votes WHERE prompt_id = $1 AND voter_id = $2",
    )
    .bind(round.prompt_id)
    .bind(voter.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stored as usize, created);
}

/// The allowance and point curve stay fixed for the whole voting phase.
#[sqlx::test(migrations = "../../db/migrations")]
async fn allowance_is_fixed_during_voting(pool: PgPool) {
    let round = round_with_players(pool.clone(), 4, true).await;
    let first = &round.players[0];
    for (entry, rank) in round.entries[1..].iter().zip([1, 2, 3]) {
        assert_eq!(cast(&round, first, *entry, rank).await, StatusCode::CREATED);
    }

    let shrink = common::put_json_auth(
        round.app.clone(),
        &format!("/api/v1/leagues/{}", round.league_id),
        serde_json::json!({ "votes_per_player": 1 }),
        &round.owner.token,
    )
    .await;
    assert_eq!(shrink.status(), StatusCode::BAD_REQUEST);

    let second = &round.players[1];
    assert_eq!(cast(&round, second, round.entries[0], 1).await, StatusCode::CREATED);

    let points: Vec<(i32, i32)> = sqlx::query_as(
        "SELECT rank, points FROM votes WHERE prompt_id = $1 ORDER BY voter_id, rank",
    )
    .bind(round.prompt_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(points, vec![(1, 3), (2, 2), (3, 1), (1, 3)]);
}

/// Votes can be listed and retracted while voting is open.
#[sqlx::test(migrations = "../../db/migrations")]
async fn votes_can_be_retracted_until_completion(pool: PgPool) {
    let round = round_with_players(pool, 2, true).await;
    let voter = &round.players[0];
    assert_eq!(cast(&round, voter, round.entries[1], 1).await, StatusCode::CREATED);

    let mine_uri = format!("/api/v1/prompts/{}/votes/mine", round.prompt_id);
    let mine = body_json(get_auth(round.app.clone(), &mine_uri, &voter.token).await).await;
    let vote_id = mine[0]["id"].as_i64().unwrap();
    assert_eq!(mine[0]["points"], 3);

    let vote_uri = format!("/api/v1/prompts/{}/votes/{vote_id}", round.prompt_id);
    let other = delete_auth(round.app.clone(), &vote_uri, &round.players[1].token).await;
    assert_eq!(other.status(), StatusCode::NOT_FOUND);

    let retracted = delete_auth(round.app.clone(), &vote_uri, &voter.token).await;
    assert_eq!(retracted.status(), StatusCode::NO_CONTENT);

    assert_eq!(cast(&round, voter, round.entries[1], 1).await, StatusCode::CREATED);
    force_transition(&round.app, &round.owner, round.league_id).await;

    let mine = body_json(get_auth(round.app.clone(), &mine_uri, &voter.token).await).await;
    let vote_id = mine[0]["id"].as_i64().unwrap();
    let late = delete_auth(
        round.app.clone(),
        &format!("/api/v1/prompts/{}/votes/{vote_id}", round.prompt_id),
        &voter.token,
    )
    .await;
    assert_eq!(late.status(), StatusCode::BAD_REQUEST);
}
