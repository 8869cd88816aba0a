//! Routes for playback sessions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagehand_core::error::EngineError;
use stagehand_core::event::DomainEvent;
use stagehand_playback::application::command_handlers;
use stagehand_playback::application::dispatcher::Dispatcher;
use stagehand_playback::application::query_handlers::PlaybackView;
use stagehand_playback::domain::commands::{self, InputSource};
use stagehand_playback::domain::events::PlaybackEvent;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /sessions.
#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Scene to start from; the project's start scene when absent.
    #[serde(default)]
    pub start_scene_id: Option<String>,
}

/// Response body for POST /sessions.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub view: PlaybackView,
}

/// Request body for POST /sessions/{id}/choose.
#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    /// Index into the options as offered.
    pub option_index: usize,
}

/// Request body for POST /sessions/{id}/text-input.
#[derive(Debug, Deserialize)]
pub struct TextInputRequest {
    pub value: String,
}

/// Request body for POST /sessions/{id}/history-panel.
#[derive(Debug, Deserialize)]
pub struct HistoryPanelRequest {
    pub open: bool,
}

/// Response body returned after a player command is handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the playback events the command produced.
    pub event_ids: Vec<Uuid>,
    /// The session after the command.
    pub view: PlaybackView,
}

/// One entry of a session's event log.
#[derive(Debug, Serialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub sequence_number: i64,
    pub correlation_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl From<&PlaybackEvent> for EventEnvelope {
    fn from(event: &PlaybackEvent) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            event_type: event.event_type().to_owned(),
            sequence_number: meta.sequence_number,
            correlation_id: meta.correlation_id,
            occurred_at: meta.occurred_at,
            payload: event.to_payload(),
        }
    }
}

/// Runs a player command against a session and builds the response.
fn respond(
    state: &AppState,
    session_id: Uuid,
    handle: impl FnOnce(&mut Dispatcher) -> Result<Vec<PlaybackEvent>, EngineError>,
) -> Result<Json<CommandResponse>, ApiError> {
    let session = state.session(session_id)?;
    let events = session.with_dispatcher(handle)??;
    let event_ids = events.iter().map(|e| e.metadata.event_id).collect();
    let view = session.view()?;
    Ok(Json(CommandResponse { event_ids, view }))
}

/// POST /sessions
#[instrument(skip(state, request))]
async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<StartSessionResponse>), ApiError> {
    let (session_id, view) = state.start_session(request.start_scene_id.as_deref())?;
    Ok((
        StatusCode::CREATED,
        Json(StartSessionResponse { session_id, view }),
    ))
}

/// GET /sessions/{id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PlaybackView>, ApiError> {
    let view = state.session(session_id)?.view()?;
    Ok(Json(view))
}

/// DELETE /sessions/{id}
#[instrument(skip(state))]
async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.end_session(session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/{id}/input
#[instrument(skip(state, input))]
async fn continue_playback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<InputSource>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ContinuePlayback {
        correlation_id: Uuid::new_v4(),
        session_id,
        input,
    };

    info!(correlation_id = %command.correlation_id, "handling continue command");

    respond(&state, session_id, |dispatcher| {
        command_handlers::handle_continue_playback(&command, dispatcher)
    })
}

/// POST /sessions/{id}/choose
#[instrument(skip(state, request))]
async fn choose_option(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChooseRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ChooseOption {
        correlation_id: Uuid::new_v4(),
        session_id,
        option_index: request.option_index,
    };

    info!(correlation_id = %command.correlation_id, option_index = command.option_index, "handling choose_option command");

    respond(&state, session_id, |dispatcher| {
        command_handlers::handle_choose_option(&command, dispatcher)
    })
}

/// POST /sessions/{id}/text-input
#[instrument(skip(state, request))]
async fn submit_text_input(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<TextInputRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SubmitTextInput {
        correlation_id: Uuid::new_v4(),
        session_id,
        value: request.value,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_text_input command");

    respond(&state, session_id, |dispatcher| {
        command_handlers::handle_submit_text_input(&command, dispatcher)
    })
}

/// POST /sessions/{id}/movie-finished
#[instrument(skip(state))]
async fn movie_finished(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ReportMovieFinished {
        correlation_id: Uuid::new_v4(),
        session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling report_movie_finished command");

    respond(&state, session_id, |dispatcher| {
        command_handlers::handle_report_movie_finished(&command, dispatcher)
    })
}

/// POST /sessions/{id}/dismiss-screen
#[instrument(skip(state))]
async fn dismiss_screen(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DismissScreen {
        correlation_id: Uuid::new_v4(),
        session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling dismiss_screen command");

    respond(&state, session_id, |dispatcher| {
        command_handlers::handle_dismiss_screen(&command, dispatcher)
    })
}

/// POST /sessions/{id}/buttons/{button_id}
#[instrument(skip(state))]
async fn press_button(
    State(state): State<AppState>,
    Path((session_id, button_id)): Path<(Uuid, String)>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::PressButton {
        correlation_id: Uuid::new_v4(),
        session_id,
        button_id,
    };

    info!(correlation_id = %command.correlation_id, button_id = %command.button_id, "handling press_button command");

    respond(&state, session_id, |dispatcher| {
        command_handlers::handle_press_button(&command, dispatcher)
    })
}

/// POST /sessions/{id}/history-panel
#[instrument(skip(state, request))]
async fn toggle_history_panel(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<HistoryPanelRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ToggleHistoryPanel {
        correlation_id: Uuid::new_v4(),
        session_id,
        open: request.open,
    };

    info!(correlation_id = %command.correlation_id, open = command.open, "handling toggle_history_panel command");

    respond(&state, session_id, |dispatcher| {
        command_handlers::handle_toggle_history_panel(&command, dispatcher)
    })
}

/// GET /sessions/{id}/events
#[instrument(skip(state))]
async fn drain_events(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<EventEnvelope>>, ApiError> {
    let session = state.session(session_id)?;
    let events = session.with_dispatcher(|dispatcher| dispatcher.drain_events())?;
    Ok(Json(events.iter().map(EventEnvelope::from).collect()))
}

/// Returns the router for playback sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/{id}", get(get_session).delete(end_session))
        .route("/sessions/{id}/input", post(continue_playback))
        .route("/sessions/{id}/choose", post(choose_option))
        .route("/sessions/{id}/text-input", post(submit_text_input))
        .route("/sessions/{id}/movie-finished", post(movie_finished))
        .route("/sessions/{id}/dismiss-screen", post(dismiss_screen))
        .route("/sessions/{id}/buttons/{button_id}", post(press_button))
        .route("/sessions/{id}/history-panel", post(toggle_history_panel))
        .route("/sessions/{id}/events", get(drain_events))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use stagehand_core::clock::Clock;
    use stagehand_playback::application::context::PlaybackSettings;
    use stagehand_script::domain::command::{
        Choice, ChoiceOption, ChoiceTarget, Command, CommandKind, Dialogue,
    };
    use stagehand_script::domain::project::Project;
    use stagehand_script::domain::scene::Scene;
    use stagehand_test_support::FixedClock;
    use tower::ServiceExt;

    fn line(id: &str, text: &str) -> Command {
        Command::new(
            id,
            CommandKind::Dialogue(Dialogue {
                character_id: None,
                speaker_name: Some("Narrator".to_owned()),
                text: text.to_owned(),
                voice_asset_id: None,
            }),
        )
    }

    fn test_app_state() -> AppState {
        let project = Project {
            id: "pilot".to_owned(),
            name: "Pilot".to_owned(),
            start_scene_id: "intro".to_owned(),
            scenes: vec![Scene::new(
                "intro",
                "Intro",
                vec![
                    line("d1", "Welcome"),
                    Command::new(
                        "c1",
                        CommandKind::Choice(Choice {
                            prompt: None,
                            options: vec![ChoiceOption {
                                id: "go".to_owned(),
                                text: "Go".to_owned(),
                                conditions: Vec::new(),
                                target: ChoiceTarget::Continue,
                            }],
                        }),
                    ),
                    line("d2", "Goodbye"),
                ],
            )],
            characters: Vec::new(),
            variables: Vec::new(),
            screens: Vec::new(),
            assets: Vec::new(),
        };
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc::now()));
        AppState::new(project, clock, PlaybackSettings::default(), "")
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn json_of(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_start_session_returns_201_with_first_line() {
        // Arrange
        let app = router().with_state(test_app_state());

        // Act
        let response = app
            .oneshot(post("/sessions", &serde_json::json!({})))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_of(response).await;
        Uuid::parse_str(json["session_id"].as_str().unwrap()).unwrap();
        assert_eq!(json["view"]["state"]["ui"]["dialogue"]["text"], "Welcome");
        assert_eq!(json["view"]["waiting_for"], "input");
    }

    #[tokio::test]
    async fn test_input_advances_to_choice() {
        // Arrange
        let state = test_app_state();
        let (session_id, _) = state.start_session(None).unwrap();
        let app = router().with_state(state);

        // Act
        let response = app
            .oneshot(post(
                &format!("/sessions/{session_id}/input"),
                &serde_json::json!({ "source": "click" }),
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert!(!json["event_ids"].as_array().unwrap().is_empty());
        assert_eq!(json["view"]["waiting_for"], "choice");
        assert_eq!(
            json["view"]["state"]["ui"]["choices"]["options"][0]["text"],
            "Go"
        );
    }

    #[tokio::test]
    async fn test_choose_while_waiting_for_input_returns_409() {
        let state = test_app_state();
        let (session_id, _) = state.start_session(None).unwrap();
        let app = router().with_state(state);

        let response = app
            .oneshot(post(
                &format!("/sessions/{session_id}/choose"),
                &serde_json::json!({ "option_index": 0 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = json_of(response).await;
        assert_eq!(json["error"], "unexpected_resume");
    }

    #[tokio::test]
    async fn test_get_unknown_session_returns_404() {
        let app = router().with_state(test_app_state());

        let request = Request::builder()
            .method("GET")
            .uri(format!("/sessions/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_of(response).await;
        assert_eq!(json["error"], "session_not_found");
    }

    #[tokio::test]
    async fn test_delete_session_returns_204() {
        let state = test_app_state();
        let (session_id, _) = state.start_session(None).unwrap();
        let app = router().with_state(state.clone());

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/sessions/{session_id}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn test_events_are_drained_once() {
        let state = test_app_state();
        let (session_id, _) = state.start_session(None).unwrap();
        let app = router().with_state(state);
        let uri = format!("/sessions/{session_id}/events");
        let get = |uri: &str| {
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };

        let first = json_of(app.clone().oneshot(get(&uri)).await.unwrap()).await;
        let second = json_of(app.oneshot(get(&uri)).await.unwrap()).await;

        let first = first.as_array().unwrap();
        assert_eq!(first[0]["event_type"], "playback.session_started");
        assert!(second.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_input_with_unknown_source_returns_422() {
        let state = test_app_state();
        let (session_id, _) = state.start_session(None).unwrap();
        let app = router().with_state(state);

        let response = app
            .oneshot(post(
                &format!("/sessions/{session_id}/input"),
                &serde_json::json!({ "source": "telepathy" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
