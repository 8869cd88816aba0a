//! ShowCharacter and HideCharacter.
//!
//! A character is drawn as a stack: base art, then one image per layer.
//! Each layer's asset comes from, in order of precedence:
//!
//! 1. an existing runtime binding to a number variable, if its value indexes
//!    one of the layer's assets;
//! 2. a number variable whose name contains the layer's name
//!    (case-insensitive), which also becomes the layer's binding;
//! 3. the expression's static choice for that layer.

use stagehand_core::assets::AssetKind;
use stagehand_core::error::{EngineError, ReferenceKind};
use stagehand_script::domain::command::{CharacterTransition, HideCharacter, ShowCharacter};
use stagehand_script::domain::project::{Character, CharacterLayer, Expression, Project};
use stagehand_script::domain::value::{VariableType, VariableValue};

use super::HandlerResult;
use crate::application::context::HandlerContext;
use crate::application::outcome::HandlerOutcome;
use crate::domain::patch::{StateChange, StatePatch};
use crate::domain::state::{
    CharacterRenderState, CharacterTransitionState, PlaybackState, StageImage, TransitionPhase,
};

/// Added to a declared transition so the presentation finishes animating
/// before playback moves on.
pub(crate) const TRANSITION_BUFFER_MS: u64 = 100;

pub(super) fn show_character(show: &ShowCharacter, ctx: &mut HandlerContext<'_>) -> HandlerResult {
    let project = ctx.project;
    let state = ctx.state;
    let character = project
        .character(&show.character_id)
        .ok_or_else(|| EngineError::missing(ReferenceKind::Character, &show.character_id))?;

    let expression = show
        .expression_id
        .as_deref()
        .or(character.default_expression_id.as_deref())
        .and_then(|expression_id| {
            let expression = character.expression(expression_id);
            if expression.is_none() {
                ctx.warn_error(&EngineError::missing(ReferenceKind::Expression, expression_id));
            }
            expression
        });

    let mut updates = StatePatch::new();
    let mut images = Vec::new();

    let base = expression
        .and_then(|e| e.base_asset_id.as_deref())
        .or(character.base_asset_id.as_deref());
    if let Some(image) = base.and_then(|asset_id| stage_image(asset_id, ctx)) {
        images.push(image);
    }
    for layer in &character.layers {
        let asset_id = select_layer_asset(character, layer, expression, project, state, &mut updates);
        if let Some(image) = asset_id.and_then(|asset_id| stage_image(asset_id, ctx)) {
            images.push(image);
        }
    }

    let transition = active_transition(show.transition);
    updates.push(StateChange::ShowCharacter(CharacterRenderState {
        character_id: character.id.clone(),
        expression_id: expression.map(|e| e.id.clone()),
        position: show.position,
        images,
        transition: transition.map(|t| CharacterTransitionState {
            kind: t.kind,
            duration_ms: t.duration_ms,
            phase: TransitionPhase::Enter,
        }),
    }));

    Ok(match transition {
        Some(t) => HandlerOutcome::timed(
            t.duration_ms.saturating_add(TRANSITION_BUFFER_MS),
            updates,
            StateChange::CharacterTransition {
                character_id: character.id.clone(),
                transition: None,
            }
            .into(),
        ),
        None => HandlerOutcome::apply(updates),
    })
}

pub(super) fn hide_character(hide: &HideCharacter, ctx: &HandlerContext<'_>) -> HandlerResult {
    if ctx.project.character(&hide.character_id).is_none() {
        return Err(EngineError::missing(
            ReferenceKind::Character,
            &hide.character_id,
        ));
    }
    if !ctx.state.stage.characters.contains_key(&hide.character_id) {
        tracing::debug!(character_id = %hide.character_id, "character not on stage");
        return Ok(HandlerOutcome::advance());
    }

    let remove = StateChange::RemoveCharacter(hide.character_id.clone());
    Ok(match active_transition(hide.transition) {
        Some(t) => HandlerOutcome::timed(
            t.duration_ms.saturating_add(TRANSITION_BUFFER_MS),
            StateChange::CharacterTransition {
                character_id: hide.character_id.clone(),
                transition: Some(CharacterTransitionState {
                    kind: t.kind,
                    duration_ms: t.duration_ms,
                    phase: TransitionPhase::Exit,
                }),
            }
            .into(),
            remove.into(),
        ),
        None => HandlerOutcome::apply(remove.into()),
    })
}

fn active_transition(transition: Option<CharacterTransition>) -> Option<CharacterTransition> {
    transition.filter(|t| t.duration_ms > 0)
}

fn select_layer_asset<'c>(
    character: &Character,
    layer: &'c CharacterLayer,
    expression: Option<&'c Expression>,
    project: &Project,
    state: &PlaybackState,
    updates: &mut StatePatch,
) -> Option<&'c str> {
    let bound = state
        .layer_bindings
        .get(&character.id)
        .and_then(|bindings| bindings.get(&layer.id));
    if let Some(asset_id) = bound.and_then(|variable_id| pick(layer, state.variables.get(variable_id))) {
        return Some(asset_id);
    }

    let layer_name = layer.name.to_lowercase();
    let discovered = project.variables.iter().find(|definition| {
        definition.variable_type == VariableType::Number
            && !layer_name.is_empty()
            && definition.name.to_lowercase().contains(&layer_name)
    });
    if let Some(definition) = discovered {
        if let Some(asset_id) = pick(layer, state.variables.get(&definition.id)) {
            if bound != Some(&definition.id) {
                updates.push(StateChange::BindLayer {
                    character_id: character.id.clone(),
                    layer_id: layer.id.clone(),
                    variable_id: definition.id.clone(),
                });
            }
            return Some(asset_id);
        }
    }

    expression
        .and_then(|e| e.layers.get(&layer.id))
        .map(String::as_str)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pick<'c>(layer: &'c CharacterLayer, value: Option<&VariableValue>) -> Option<&'c str> {
    let index = value?.as_number().filter(|n| *n >= 0.0)?.floor() as usize;
    layer.asset_ids.get(index).map(String::as_str)
}

fn stage_image(asset_id: &str, ctx: &mut HandlerContext<'_>) -> Option<StageImage> {
    let url = ctx.resolve_asset(asset_id, AssetKind::Character)?;
    let metadata = ctx.assets.metadata(asset_id, AssetKind::Character);
    Some(StageImage {
        asset_id: asset_id.to_owned(),
        url,
        is_video: metadata.is_video,
        looping: metadata.looping,
    })
}
