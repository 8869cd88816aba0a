//! Dialogue, choices and text input: the commands that talk to the player.

use stagehand_core::assets::AssetKind;
use stagehand_core::error::{EngineError, ReferenceKind};
use stagehand_script::domain::command::{Choice, Dialogue, TextInput};
use stagehand_script::domain::project::Project;
use stagehand_script::domain::value::{VariableValue, Variables};

use super::HandlerResult;
use crate::application::context::HandlerContext;
use crate::application::outcome::HandlerOutcome;
use crate::domain::navigation::SuspendReason;
use crate::domain::patch::{StateChange, StatePatch};
use crate::domain::state::{
    ChoicePrompt, DialogueEntry, DialogueLine, OfferedOption, TextInputPrompt,
};

/// Replaces `{variable}` placeholders with display values.
///
/// A placeholder may name a variable by id or by its declared name. Unknown
/// placeholders are left as written.
#[must_use]
pub fn interpolate(text: &str, project: &Project, variables: &Variables) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match lookup(key.trim(), project, variables) {
            Some(value) => out.push_str(&value.to_string()),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn lookup<'v>(key: &str, project: &Project, variables: &'v Variables) -> Option<&'v VariableValue> {
    variables.get(key).or_else(|| {
        project
            .variables
            .iter()
            .find(|definition| definition.name.eq_ignore_ascii_case(key))
            .and_then(|definition| variables.get(&definition.id))
    })
}

pub(super) fn show_dialogue(dialogue: &Dialogue, ctx: &mut HandlerContext<'_>) -> HandlerResult {
    let project = ctx.project;
    let state = ctx.state;

    let character = dialogue.character_id.as_deref().and_then(|character_id| {
        let character = project.character(character_id);
        if character.is_none() {
            ctx.warn_error(&EngineError::missing(ReferenceKind::Character, character_id));
        }
        character
    });
    let speaker = dialogue
        .speaker_name
        .clone()
        .or_else(|| character.map(|c| c.name.clone()));
    let text = interpolate(&dialogue.text, project, &state.variables);

    if let Some(voice_asset_id) = &dialogue.voice_asset_id {
        play_voice(voice_asset_id, ctx);
    }

    let line = DialogueLine {
        character_id: dialogue.character_id.clone(),
        speaker: speaker.clone(),
        text: text.clone(),
    };
    let entry = DialogueEntry {
        scene_id: state.current_scene_id.clone(),
        command_id: ctx.command_id.to_owned(),
        speaker,
        text,
    };
    let updates = StatePatch::new()
        .with(StateChange::Dialogue(Some(line)))
        .with(StateChange::RecordDialogue(entry))
        .with(StateChange::WaitingForInput(true));

    Ok(HandlerOutcome::halt(SuspendReason::Input, updates)
        .on_resume(StateChange::WaitingForInput(false).into()))
}

fn play_voice(asset_id: &str, ctx: &mut HandlerContext<'_>) {
    let Some(url) = ctx.resolve_asset(asset_id, AssetKind::Voice) else {
        return;
    };
    if let Err(err) = ctx.sound_effects.play(&url, ctx.settings.sfx_volume) {
        ctx.warn_error(&err);
    }
}

pub(super) fn offer_choice(choice: &Choice, ctx: &HandlerContext<'_>) -> HandlerResult {
    let variables = &ctx.state.variables;
    let options: Vec<OfferedOption> = choice
        .options
        .iter()
        .filter(|option| ctx.conditions.evaluate(&option.conditions, variables))
        .map(|option| OfferedOption {
            option_id: option.id.clone(),
            text: interpolate(&option.text, ctx.project, variables),
            target: option.target.clone(),
        })
        .collect();

    if options.is_empty() {
        return Err(EngineError::Validation(format!(
            "choice '{}' has no available options",
            ctx.command_id
        )));
    }

    let prompt = ChoicePrompt {
        command_id: ctx.command_id.to_owned(),
        prompt: choice
            .prompt
            .as_deref()
            .map(|prompt| interpolate(prompt, ctx.project, variables)),
        options,
    };
    let updates = StatePatch::new()
        .with(StateChange::Choices(Some(prompt)))
        .with(StateChange::WaitingForInput(true));
    let on_resume = StatePatch::new()
        .with(StateChange::Choices(None))
        .with(StateChange::WaitingForInput(false));

    Ok(HandlerOutcome::halt(SuspendReason::Choice, updates).on_resume(on_resume))
}

pub(super) fn prompt_text_input(input: &TextInput, ctx: &HandlerContext<'_>) -> HandlerResult {
    if ctx.project.variable(&input.variable_id).is_none() {
        return Err(EngineError::missing(
            ReferenceKind::Variable,
            &input.variable_id,
        ));
    }

    let prompt = TextInputPrompt {
        command_id: ctx.command_id.to_owned(),
        prompt: interpolate(&input.prompt, ctx.project, &ctx.state.variables),
        variable_id: input.variable_id.clone(),
        placeholder: input.placeholder.clone(),
        default_value: input.default_value.clone(),
        max_length: input.max_length,
    };

    Ok(HandlerOutcome::halt(
        SuspendReason::TextInput,
        StateChange::TextInput(Some(prompt)).into(),
    )
    .on_resume(StateChange::TextInput(None).into()))
}
