//! ShowScreen.

use stagehand_core::error::{EngineError, ReferenceKind};
use stagehand_script::domain::command::ShowScreen;

use super::HandlerResult;
use crate::application::context::{HandlerContext, SessionMode};
use crate::application::outcome::HandlerOutcome;
use crate::domain::navigation::SuspendReason;
use crate::domain::patch::StateChange;

/// During gameplay a screen is a non-blocking HUD; otherwise it is modal
/// and blocks until dismissed.
pub(super) fn show_screen(show: &ShowScreen, ctx: &HandlerContext<'_>) -> HandlerResult {
    let screen = ctx
        .project
        .screen(&show.screen_id)
        .ok_or_else(|| EngineError::missing(ReferenceKind::Screen, &show.screen_id))?;

    Ok(match ctx.mode {
        SessionMode::Gameplay => {
            HandlerOutcome::apply(StateChange::PushHud(screen.id.clone()).into())
        }
        SessionMode::Menu => HandlerOutcome::halt(
            SuspendReason::Screen,
            StateChange::PushScreen(screen.id.clone()).into(),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::outcome::Flow;
    use crate::application::testing::{Harness, project};

    fn inventory() -> ShowScreen {
        ShowScreen {
            screen_id: "inventory".to_owned(),
        }
    }

    #[test]
    fn test_gameplay_screen_is_a_hud_overlay() {
        let mut harness = Harness::new(project(Vec::new()));

        let outcome = harness.run(|ctx| show_screen(&inventory(), ctx)).unwrap();

        assert_eq!(outcome.flow, Flow::Advance);
        assert_eq!(
            outcome.updates.changes(),
            &[StateChange::PushHud("inventory".to_owned())]
        );
    }

    #[test]
    fn test_menu_screen_blocks_until_dismissed() {
        let mut harness = Harness::new(project(Vec::new()));
        harness.mode = SessionMode::Menu;

        let outcome = harness.run(|ctx| show_screen(&inventory(), ctx)).unwrap();

        assert_eq!(outcome.flow, Flow::Halt(SuspendReason::Screen));
    }
}
