//! Wait and PlayMovie.

use stagehand_core::assets::AssetKind;
use stagehand_script::domain::command::{PlayMovie, Wait};

use super::HandlerResult;
use crate::application::context::HandlerContext;
use crate::application::outcome::HandlerOutcome;
use crate::domain::navigation::SuspendReason;
use crate::domain::patch::{StateChange, StatePatch};

pub(super) fn wait(wait: Wait) -> HandlerOutcome {
    match (wait.duration_ms, wait.wait_for_input) {
        (0, false) => HandlerOutcome::advance(),
        (0, true) => HandlerOutcome::halt(
            SuspendReason::Input,
            StateChange::WaitingForInput(true).into(),
        )
        .on_resume(StateChange::WaitingForInput(false).into()),
        (duration_ms, true) => HandlerOutcome::timed(
            duration_ms,
            StateChange::WaitingForInput(true).into(),
            StateChange::WaitingForInput(false).into(),
        )
        .interruptible(),
        (duration_ms, false) => {
            HandlerOutcome::timed(duration_ms, StatePatch::new(), StatePatch::new())
        }
    }
}

/// Blocks until the host reports the movie finished. Never self-resolves.
pub(super) fn play_movie(play: &PlayMovie, ctx: &HandlerContext<'_>) -> HandlerResult {
    let url = ctx.require_asset(&play.asset_id, AssetKind::Movie)?;
    Ok(
        HandlerOutcome::halt(SuspendReason::Movie, StateChange::Movie(Some(url)).into())
            .on_resume(StateChange::Movie(None).into()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::outcome::Flow;

    #[test]
    fn test_zero_wait_without_input_is_a_no_op() {
        assert_eq!(wait(Wait::default()), HandlerOutcome::advance());
    }

    #[test]
    fn test_zero_wait_with_input_waits_for_input_only() {
        let outcome = wait(Wait {
            duration_ms: 0,
            wait_for_input: true,
        });

        assert_eq!(outcome.flow, Flow::Halt(SuspendReason::Input));
    }

    #[test]
    fn test_timed_wait_with_input_races_both() {
        let outcome = wait(Wait {
            duration_ms: 1000,
            wait_for_input: true,
        });

        assert_eq!(
            outcome.flow,
            Flow::Delay {
                delay_ms: 1000,
                interruptible: true
            }
        );
    }

    #[test]
    fn test_timed_wait_without_input_is_timer_only() {
        let outcome = wait(Wait {
            duration_ms: 250,
            wait_for_input: false,
        });

        assert_eq!(
            outcome.flow,
            Flow::Delay {
                delay_ms: 250,
                interruptible: false
            }
        );
    }
}
