//! Stagehand API: HTTP host for playback sessions.
//!
//! Loads one project, runs any number of playback sessions against it with
//! real tokio timers, and exposes the player's resume signals as endpoints.

pub mod config;
pub mod error;
pub mod media;
pub mod project_store;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router. `main` adds the HTTP layers on top.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/playback", routes::playback::router())
        .with_state(state)
}
