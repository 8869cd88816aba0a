//! Text, image and button overlays.

use stagehand_core::assets::AssetKind;
use stagehand_script::domain::command::{HideOverlay, ShowButton, ShowImage, ShowText};

use super::HandlerResult;
use super::dialogue::interpolate;
use crate::application::context::HandlerContext;
use crate::application::outcome::HandlerOutcome;
use crate::domain::patch::StateChange;
use crate::domain::state::{ButtonOverlay, ImageOverlay, TextOverlay};

pub(super) fn show_text(show: &ShowText, ctx: &HandlerContext<'_>) -> HandlerOutcome {
    HandlerOutcome::apply(
        StateChange::ShowText(TextOverlay {
            overlay_id: show.overlay_id.clone(),
            text: interpolate(&show.text, ctx.project, &ctx.state.variables),
            x: show.x,
            y: show.y,
            style: show.style.clone(),
        })
        .into(),
    )
}

pub(super) fn hide_text(hide: &HideOverlay) -> HandlerOutcome {
    HandlerOutcome::apply(StateChange::HideText(hide.overlay_id.clone()).into())
}

pub(super) fn show_image(show: &ShowImage, ctx: &HandlerContext<'_>) -> HandlerResult {
    let url = ctx.require_asset(&show.asset_id, AssetKind::Image)?;
    Ok(HandlerOutcome::apply(
        StateChange::ShowImage(ImageOverlay {
            overlay_id: show.overlay_id.clone(),
            asset_id: show.asset_id.clone(),
            url,
            x: show.x,
            y: show.y,
            width: show.width,
            height: show.height,
            opacity: show.opacity.clamp(0.0, 1.0),
        })
        .into(),
    ))
}

pub(super) fn hide_image(hide: &HideOverlay) -> HandlerOutcome {
    HandlerOutcome::apply(StateChange::HideImage(hide.overlay_id.clone()).into())
}

pub(super) fn show_button(show: &ShowButton) -> HandlerOutcome {
    HandlerOutcome::apply(
        StateChange::ShowButton(ButtonOverlay {
            overlay_id: show.overlay_id.clone(),
            text: show.text.clone(),
            x: show.x,
            y: show.y,
            action: show.action.clone(),
        })
        .into(),
    )
}

pub(super) fn hide_button(hide: &HideOverlay) -> HandlerOutcome {
    HandlerOutcome::apply(StateChange::HideButton(hide.overlay_id.clone()).into())
}
