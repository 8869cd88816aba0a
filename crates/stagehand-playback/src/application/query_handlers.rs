//! Query handlers: read-only views of a running session.

use serde::Serialize;
use uuid::Uuid;

use crate::application::context::{PlaybackSettings, SessionMode};
use crate::application::dispatcher::Dispatcher;
use crate::domain::navigation::{NavigationState, SuspendReason};
use crate::domain::state::PlaybackState;

/// Read-only snapshot of a playback session.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackView {
    /// The session identifier.
    pub session_id: Uuid,
    pub navigation: NavigationState,
    /// What playback is waiting for, if anything.
    pub waiting_for: Option<SuspendReason>,
    pub mode: SessionMode,
    pub settings: PlaybackSettings,
    pub state: PlaybackState,
}

/// Snapshots the dispatcher's session.
#[must_use]
pub fn get_playback_view(dispatcher: &Dispatcher) -> PlaybackView {
    PlaybackView {
        session_id: dispatcher.session_id(),
        navigation: dispatcher.navigation().clone(),
        waiting_for: dispatcher.suspend_reason(),
        mode: dispatcher.mode(),
        settings: *dispatcher.settings(),
        state: dispatcher.state().clone(),
    }
}

#[cfg(test)]
mod tests {
    use stagehand_script::domain::command::{Command, CommandKind, Wait};
    use stagehand_script::domain::scene::Scene;

    use super::*;
    use crate::application::testing::dispatcher;

    #[test]
    fn test_get_playback_view_serializes_navigation_and_state() {
        // Arrange
        let (mut dispatcher, _rig) = dispatcher(vec![Scene::new(
            "intro",
            "Intro",
            vec![Command::new(
                "w1",
                CommandKind::Wait(Wait {
                    duration_ms: 0,
                    wait_for_input: true,
                }),
            )],
        )]);
        dispatcher.advance();

        // Act
        let view = get_playback_view(&dispatcher);
        let json = serde_json::to_value(&view).unwrap();

        // Assert
        assert_eq!(view.waiting_for, Some(SuspendReason::Input));
        assert_eq!(json["navigation"]["status"], "suspended");
        assert_eq!(json["navigation"]["reason"], "input");
        assert_eq!(json["state"]["current_scene_id"], "intro");
        assert_eq!(json["state"]["ui"]["is_waiting_for_input"], true);
        assert_eq!(json["mode"], "gameplay");
    }
}
