//! Integration tests for the playback session endpoints.

mod common;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use serde_json::{Value, json};

const SESSIONS: &str = "/api/v1/playback/sessions";

async fn start(app: &Router) -> (String, Value) {
    let (status, json) = common::post_json(app.clone(), SESSIONS, &json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = json["session_id"].as_str().unwrap().to_owned();
    (session_id, json["view"].clone())
}

/// Polls the session until `predicate` holds; the timer driver runs on its
/// own task.
async fn wait_for(app: &Router, session_id: &str, predicate: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..100 {
        let (status, view) = common::get_json(app.clone(), &format!("{SESSIONS}/{session_id}")).await;
        assert_eq!(status, StatusCode::OK);
        if predicate(&view) {
            return view;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {session_id} never reached the expected state");
}

#[tokio::test]
async fn test_start_session_runs_to_first_line() {
    // Arrange
    let app = common::build_test_app();

    // Act
    let (_, view) = start(&app).await;

    // Assert
    assert_eq!(view["waiting_for"], "input");
    assert_eq!(view["state"]["ui"]["dialogue"]["text"], "Welcome, Traveler.");
    assert_eq!(view["state"]["ui"]["dialogue"]["speaker"], "Guide");
    assert_eq!(
        view["state"]["stage"]["background"]["url"],
        "https://cdn.example.com/backgrounds/forest.png"
    );
    assert_eq!(view["state"]["music"]["asset_id"], "theme");
    assert_eq!(view["state"]["music"]["is_playing"], true);
}

#[tokio::test]
async fn test_start_session_with_unknown_scene_returns_404() {
    let app = common::build_test_app();

    let (status, json) =
        common::post_json(app, SESSIONS, &json!({ "start_scene_id": "nowhere" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "missing_reference");
}

#[tokio::test]
async fn test_text_input_and_label_choice_flow() {
    // Arrange
    let app = common::build_test_app();
    let (session_id, _) = start(&app).await;
    let base = format!("{SESSIONS}/{session_id}");

    // Act
    let (status, after_input) =
        common::post_json(app.clone(), &format!("{base}/input"), &json!({ "source": "click" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after_input["view"]["waiting_for"], "text_input");

    let (status, after_text) = common::post_json(
        app.clone(),
        &format!("{base}/text-input"),
        &json!({ "value": "Rowan" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after_text["view"]["waiting_for"], "choice");

    let (status, after_choice) =
        common::post_json(app.clone(), &format!("{base}/choose"), &json!({ "option_index": 1 })).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let view = &after_choice["view"];
    assert_eq!(view["state"]["variables"]["name"], "Rowan");
    assert_eq!(view["state"]["ui"]["dialogue"]["text"], "Take your time, Rowan.");
    assert_eq!(view["state"]["choice_history"][0]["option_id"], "timid");
}

#[tokio::test]
async fn test_scene_choice_lands_on_blank_stage_then_driver_continues() {
    // Arrange
    let app = common::build_test_app();
    let (session_id, _) = start(&app).await;
    let base = format!("{SESSIONS}/{session_id}");
    common::post_json(app.clone(), &format!("{base}/input"), &json!({ "source": "click" })).await;
    common::post_json(app.clone(), &format!("{base}/text-input"), &json!({ "value": "" })).await;

    // Act
    let (status, after_choice) =
        common::post_json(app.clone(), &format!("{base}/choose"), &json!({ "option_index": 0 })).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let view = &after_choice["view"];
    assert_eq!(view["state"]["current_scene_id"], "forest");
    assert_eq!(view["state"]["current_index"], 0);
    assert!(view["state"]["stage"]["background"].is_null());
    assert!(view["state"]["ui"]["dialogue"].is_null());

    let movie = wait_for(&app, &session_id, |v| v["waiting_for"] == "movie").await;
    assert_eq!(
        movie["state"]["ui"]["movie_url"],
        "https://cdn.example.com/movies/opening.mp4"
    );

    let (status, after_movie) = common::post_empty(app.clone(), &format!("{base}/movie-finished")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after_movie["view"]["state"]["ui"]["dialogue"]["text"], "Courage: 1");
}

#[tokio::test]
async fn test_wrong_resume_signal_returns_409_and_keeps_state() {
    let app = common::build_test_app();
    let (session_id, before) = start(&app).await;
    let base = format!("{SESSIONS}/{session_id}");

    let (status, json) = common::post_empty(app.clone(), &format!("{base}/movie-finished")).await;
    let (_, after) = common::get_json(app, &base).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "unexpected_resume");
    assert_eq!(after["state"], before["state"]);
}

#[tokio::test]
async fn test_dismiss_screen_without_screen_returns_400() {
    let app = common::build_test_app();
    let (session_id, _) = start(&app).await;

    let (status, json) =
        common::post_empty(app, &format!("{SESSIONS}/{session_id}/dismiss-screen")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_unknown_button_returns_404() {
    let app = common::build_test_app();
    let (session_id, _) = start(&app).await;

    let (status, json) =
        common::post_empty(app, &format!("{SESSIONS}/{session_id}/buttons/skip")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "missing_reference");
}

#[tokio::test]
async fn test_history_panel_toggle() {
    let app = common::build_test_app();
    let (session_id, _) = start(&app).await;

    let (status, json) = common::post_json(
        app,
        &format!("{SESSIONS}/{session_id}/history-panel"),
        &json!({ "open": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["view"]["state"]["ui"]["history_open"], true);
}

#[tokio::test]
async fn test_events_endpoint_drains_log() {
    let app = common::build_test_app();
    let (session_id, _) = start(&app).await;
    let uri = format!("{SESSIONS}/{session_id}/events");

    let (status, first) = common::get_json(app.clone(), &uri).await;
    let (_, second) = common::get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = first
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(types[0], "playback.session_started");
    assert!(types.contains(&"playback.suspended"));
    assert!(second.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_session_ends_it() {
    let app = common::build_test_app();
    let (session_id, _) = start(&app).await;
    let base = format!("{SESSIONS}/{session_id}");

    let status = common::delete(app.clone(), &base).await;
    let (after, _) = common::get_json(app.clone(), &base).await;
    let again = common::delete(app, &base).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(after, StatusCode::NOT_FOUND);
    assert_eq!(again, StatusCode::NOT_FOUND);
}
