//! Shared application state and the per-session timer driver.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stagehand_core::assets::AssetResolver;
use stagehand_core::clock::Clock;
use stagehand_core::error::EngineError;
use stagehand_core::rng::SystemRng;
use stagehand_playback::application::context::{PlaybackResources, PlaybackSettings};
use stagehand_playback::application::dispatcher::Dispatcher;
use stagehand_playback::application::query_handlers::{PlaybackView, get_playback_view};
use stagehand_script::application::assets::ManifestAssetResolver;
use stagehand_script::domain::conditions::VariableConditionEvaluator;
use stagehand_script::domain::project::Project;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::media::{HeadlessMusicHandle, LoggingSoundEffects, PassthroughPreloader};

/// One running playback session.
pub struct Session {
    dispatcher: Mutex<Dispatcher>,
    /// Wakes the driver after anything that may move the next deadline.
    wake: Notify,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Mutex::new(dispatcher),
            wake: Notify::new(),
            driver: Mutex::new(None),
        }
    }

    /// Runs `f` against the session's dispatcher, then wakes the driver.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Infrastructure` if the dispatcher lock is
    /// poisoned.
    pub fn with_dispatcher<T>(&self, f: impl FnOnce(&mut Dispatcher) -> T) -> Result<T, EngineError> {
        let result = {
            let mut dispatcher = self
                .dispatcher
                .lock()
                .map_err(|_| EngineError::Infrastructure("session lock poisoned".to_owned()))?;
            f(&mut dispatcher)
        };
        self.wake.notify_one();
        Ok(result)
    }

    /// Snapshot of the session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Infrastructure` if the dispatcher lock is
    /// poisoned.
    pub fn view(&self) -> Result<PlaybackView, EngineError> {
        let dispatcher = self
            .dispatcher
            .lock()
            .map_err(|_| EngineError::Infrastructure("session lock poisoned".to_owned()))?;
        Ok(get_playback_view(&dispatcher))
    }

    fn stop_driver(&self) {
        if let Ok(mut driver) = self.driver.lock() {
            if let Some(handle) = driver.take() {
                handle.abort();
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The project every session plays.
    pub project: Arc<Project>,
    pub clock: Arc<dyn Clock>,
    pub assets: Arc<dyn AssetResolver>,
    pub settings: PlaybackSettings,
    sessions: Arc<Mutex<HashMap<Uuid, Arc<Session>>>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("project_id", &self.project.id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state. Asset ids resolve through the
    /// project's manifest, prefixed with `asset_base_url`.
    #[must_use]
    pub fn new(
        project: Project,
        clock: Arc<dyn Clock>,
        settings: PlaybackSettings,
        asset_base_url: &str,
    ) -> Self {
        let assets = Arc::new(ManifestAssetResolver::new(&project, asset_base_url));
        Self::with_assets(project, clock, settings, assets)
    }

    /// Create new application state with an explicit asset resolver.
    #[must_use]
    pub fn with_assets(
        project: Project,
        clock: Arc<dyn Clock>,
        settings: PlaybackSettings,
        assets: Arc<dyn AssetResolver>,
    ) -> Self {
        Self {
            project: Arc::new(project),
            clock,
            assets,
            settings,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn resources(&self) -> PlaybackResources {
        PlaybackResources {
            clock: Arc::clone(&self.clock),
            rng: Box::new(SystemRng::new()),
            assets: Arc::clone(&self.assets),
            preloader: Arc::new(PassthroughPreloader),
            sound_effects: Arc::new(LoggingSoundEffects),
            conditions: Arc::new(VariableConditionEvaluator),
            music: Box::new(HeadlessMusicHandle::new()),
            settings: self.settings,
        }
    }

    fn sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Arc<Session>>>, EngineError> {
        self.sessions
            .lock()
            .map_err(|_| EngineError::Infrastructure("session table lock poisoned".to_owned()))
    }

    /// Starts a session, runs it up to its first suspension and spawns its
    /// timer driver. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingReference` if the start scene does not
    /// exist.
    pub fn start_session(
        &self,
        start_scene_id: Option<&str>,
    ) -> Result<(Uuid, PlaybackView), EngineError> {
        let session_id = Uuid::new_v4();
        let mut dispatcher = Dispatcher::start(
            session_id,
            Arc::clone(&self.project),
            self.resources(),
            start_scene_id,
        )?;
        dispatcher.advance();
        let view = get_playback_view(&dispatcher);

        let session = Arc::new(Session::new(dispatcher));
        let handle = tokio::spawn(drive(Arc::clone(&session), Arc::clone(&self.clock)));
        if let Ok(mut driver) = session.driver.lock() {
            *driver = Some(handle);
        }
        self.sessions()?.insert(session_id, session);

        info!(%session_id, scene_id = %view.state.current_scene_id, "playback session started");
        Ok((session_id, view))
    }

    /// Looks up a running session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SessionNotFound` for unknown ids.
    pub fn session(&self, session_id: Uuid) -> Result<Arc<Session>, EngineError> {
        self.sessions()?
            .get(&session_id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(session_id))
    }

    /// Ends a session and discards its state.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SessionNotFound` for unknown ids.
    pub fn end_session(&self, session_id: Uuid) -> Result<(), EngineError> {
        let session = self
            .sessions()?
            .remove(&session_id)
            .ok_or(EngineError::SessionNotFound(session_id))?;
        session.with_dispatcher(Dispatcher::end)?;
        session.stop_driver();
        info!(%session_id, "playback session ended");
        Ok(())
    }

    /// Number of running sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions().map_or(0, |sessions| sessions.len())
    }
}

/// Sleeps until the dispatcher's next deadline (or until woken) and ticks
/// it, for as long as the session lives.
async fn drive(session: Arc<Session>, clock: Arc<dyn Clock>) {
    loop {
        let deadline = {
            let Ok(dispatcher) = session.dispatcher.lock() else {
                return;
            };
            if dispatcher.navigation().is_ended() {
                return;
            }
            dispatcher.next_deadline()
        };

        match deadline {
            Some(at) => {
                let wait = (at - clock.now()).to_std().unwrap_or(Duration::ZERO);
                tokio::select! {
                    () = tokio::time::sleep(wait) => {
                        if let Ok(mut dispatcher) = session.dispatcher.lock() {
                            debug!(session_id = %dispatcher.session_id(), "timer tick");
                            dispatcher.tick();
                        }
                    }
                    () = session.wake.notified() => {}
                }
            }
            None => session.wake.notified().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_script::domain::command::{Command, CommandKind, Wait};
    use stagehand_script::domain::scene::Scene;
    use stagehand_test_support::FixedClock;

    fn project() -> Project {
        Project {
            id: "pilot".to_owned(),
            name: "Pilot".to_owned(),
            start_scene_id: "intro".to_owned(),
            scenes: vec![Scene::new(
                "intro",
                "Intro",
                vec![Command::new(
                    "w1",
                    CommandKind::Wait(Wait {
                        duration_ms: 0,
                        wait_for_input: true,
                    }),
                )],
            )],
            characters: Vec::new(),
            variables: Vec::new(),
            screens: Vec::new(),
            assets: Vec::new(),
        }
    }

    fn state() -> AppState {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(chrono::Utc::now()));
        AppState::new(project(), clock, PlaybackSettings::default(), "")
    }

    #[tokio::test]
    async fn test_start_session_registers_suspended_session() {
        // Arrange
        let state = state();

        // Act
        let (session_id, view) = state.start_session(None).unwrap();

        // Assert
        assert_eq!(view.session_id, session_id);
        assert!(view.navigation.is_suspended());
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test]
    async fn test_end_session_removes_it() {
        let state = state();
        let (session_id, _) = state.start_session(None).unwrap();

        state.end_session(session_id).unwrap();

        assert_eq!(state.session_count(), 0);
        assert!(matches!(
            state.session(session_id),
            Err(EngineError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_start_session_with_unknown_scene_fails() {
        let state = state();

        let result = state.start_session(Some("nowhere"));

        assert!(matches!(result, Err(EngineError::MissingReference { .. })));
        assert_eq!(state.session_count(), 0);
    }
}
