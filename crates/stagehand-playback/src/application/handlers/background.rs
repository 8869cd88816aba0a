//! SetBackground.

use stagehand_core::assets::AssetKind;
use stagehand_script::domain::command::{BackgroundTransition, SetBackground};

use super::HandlerResult;
use crate::application::context::HandlerContext;
use crate::application::outcome::HandlerOutcome;
use crate::domain::patch::{StateChange, StatePatch};
use crate::domain::state::{Background, TransitionDescriptor};

pub(super) fn set_background(set: &SetBackground, ctx: &mut HandlerContext<'_>) -> HandlerResult {
    let url = ctx.require_asset(&set.asset_id, AssetKind::Background)?;
    let metadata = ctx.assets.metadata(&set.asset_id, AssetKind::Background);
    let background = Background {
        asset_id: set.asset_id.clone(),
        url,
        is_video: metadata.is_video,
        looping: metadata.looping,
    };

    let animated = set.transition != BackgroundTransition::Instant && set.duration_ms > 0;
    // Re-issuing the active background still preloads and transitions.
    if animated {
        match ctx.preloader.preload(&background.url, background.is_video) {
            Ok(()) => {
                let descriptor = TransitionDescriptor {
                    kind: set.transition,
                    duration_ms: set.duration_ms,
                    from: ctx.state.stage.background.clone(),
                    to: background.clone(),
                };
                let updates = StatePatch::new()
                    .with(StateChange::Transition(Some(descriptor)))
                    .with(StateChange::Background(Some(background)));
                return Ok(HandlerOutcome::timed(
                    set.duration_ms,
                    updates,
                    StateChange::Transition(None).into(),
                ));
            }
            Err(err) => {
                tracing::warn!(asset_id = %set.asset_id, error = %err, "preload failed, switching instantly");
                ctx.warn_error(&err);
            }
        }
    }

    Ok(HandlerOutcome::apply(
        StatePatch::new()
            .with(StateChange::Transition(None))
            .with(StateChange::Background(Some(background))),
    ))
}
