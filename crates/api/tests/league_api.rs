//! HTTP-level integration tests for leagues and memberships.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_league, get_auth, join_league, post_auth, post_json_auth, put_json_auth,
    register,
};
use sqlx::PgPool;

/// New leagues get default settings, an invite code, and the owner as member.
#[sqlx::test(migrations = "../../db/migrations")]
async fn create_league_uses_defaults(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;

    let league = create_league(&app, &owner, serde_json::json!({ "name": "Friday Photos" })).await;
    assert_eq!(league["submission_days"], 7);
    assert_eq!(league["voting_days"], 2);
    assert_eq!(league["votes_per_player"], 3);
    assert_eq!(league["is_started"], false);
    assert_eq!(league["invite_code"].as_str().unwrap().len(), 8);

    let id = league["id"].as_i64().unwrap();
    let members = get_auth(app, &format!("/api/v1/leagues/{id}/members"), &owner.token).await;
    let json = body_json(members).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["is_owner"], true);
}

/// Settings outside their bounds are a validation error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn create_league_rejects_out_of_range_settings(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;

    let response = post_json_auth(
        app,
        "/api/v1/leagues",
        serde_json::json!({ "name": "Too long", "submission_days": 31 }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Joining by invite code grants access; outsiders get 403 and unknown ids 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn membership_controls_access(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;
    let friend = register(&app, "friend").await;
    let league = create_league(&app, &owner, serde_json::json!({ "name": "Crew" })).await;
    let id = league["id"].as_i64().unwrap();
    let uri = format!("/api/v1/leagues/{id}");

    let before = get_auth(app.clone(), &uri, &friend.token).await;
    assert_eq!(before.status(), StatusCode::FORBIDDEN);

    join_league(&app, &friend, &league).await;
    let after = get_auth(app.clone(), &uri, &friend.token).await;
    assert_eq!(after.status(), StatusCode::OK);

    let listed = body_json(get_auth(app.clone(), "/api/v1/leagues", &friend.token).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let missing = get_auth(app, "/api/v1/leagues/999999", &friend.token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

/// Invite codes are matched case-insensitively.
#[sqlx::test(migrations = "../../db/migrations")]
async fn join_accepts_lowercase_code(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;
    let friend = register(&app, "friend").await;
    let league = create_league(&app, &owner, serde_json::json!({ "name": "Crew" })).await;
    let code = league["invite_code"].as_str().unwrap().to_lowercase();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/leagues/join",
        serde_json::json!({ "invite_code": format!(" {code} ") }),
        &friend.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let bad = post_json_auth(
        app,
        "/api/v1/leagues/join",
        serde_json::json!({ "invite_code": "NOPE0000" }),
        &friend.token,
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

/// Members can leave, owners cannot.
#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_cannot_leave(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;
    let friend = register(&app, "friend").await;
    let league = create_league(&app, &owner, serde_json::json!({ "name": "Crew" })).await;
    let id = league["id"].as_i64().unwrap();
    join_league(&app, &friend, &league).await;

    let leave_uri = format!("/api/v1/leagues/{id}/leave");
    let owner_leave = post_auth(app.clone(), &leave_uri, &owner.token).await;
    assert_eq!(owner_leave.status(), StatusCode::BAD_REQUEST);

    let friend_leave = post_auth(app.clone(), &leave_uri, &friend.token).await;
    assert_eq!(friend_leave.status(), StatusCode::NO_CONTENT);

    let gone = get_auth(app, &format!("/api/v1/leagues/{id}"), &friend.token).await;
    assert_eq!(gone.status(), StatusCode::FORBIDDEN);
}

/// Only the owner may change settings.
#[sqlx::test(migrations = "../../db/migrations")]
async fn update_is_owner_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;
    let friend = register(&app, "friend").await;
    let league = create_league(&app, &owner, serde_json::json!({ "name": "Crew" })).await;
    let id = league["id"].as_i64().unwrap();
    join_league(&app, &friend, &league).await;

    let uri = format!("/api/v1/leagues/{id}");
    let body = serde_json::json!({ "voting_days": 3 });

    let denied = put_json_auth(app.clone(), &uri, body.clone(), &friend.token).await;
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let updated = put_json_auth(app, &uri, body, &owner.token).await;
    assert_eq!(updated.status(), StatusCode::OK);
    let json = body_json(updated).await;
    assert_eq!(json["voting_days"], 3);
    assert_eq!(json["name"], "Crew");
}

/// Phase settings are frozen while a prompt is open; the name is not.
#[sqlx::test(migrations = "../../db/migrations")]
async fn settings_are_frozen_during_an_open_prompt(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register(&app, "owner").await;
    let league = create_league(&app, &owner, serde_json::json!({ "name": "Crew" })).await;
    let id = league["id"].as_i64().unwrap();
    let uri = format!("/api/v1/leagues/{id}");
    common::add_prompt(&app, &owner, id, "Only one").await;
    common::force_transition(&app, &owner, id).await;

    for body in [
        serde_json::json!({ "submission_days": 3 }),
        serde_json::json!({ "voting_days": 1 }),
        serde_json::json!({ "votes_per_player": 1, "name": "Renamed" }),
    ] {
        let response = put_json_auth(app.clone(), &uri, body.clone(), &owner.token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
    }

    let renamed = put_json_auth(
        app.clone(),
        &uri,
        serde_json::json!({ "name": "Renamed" }),
        &owner.token,
    )
    .await;
    assert_eq!(renamed.status(), StatusCode::OK);

    // Voting, then completed: the league is idle again.
    common::force_transition(&app, &owner, id).await;
    common::force_transition(&app, &owner, id).await;

    let updated = put_json_auth(
        app,
        &uri,
        serde_json::json!({ "votes_per_player": 5 }),
        &owner.token,
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let json = body_json(updated).await;
    assert_eq!(json["votes_per_player"], 5);
    assert_eq!(json["name"], "Renamed");
}
