//! The command handler set.
//!
//! One function per command kind, selected by an exhaustive match on the
//! command's tag. Handlers read a frozen [`HandlerContext`] and return a
//! [`HandlerOutcome`]; an `Err` is a soft failure the dispatcher turns into
//! skip-and-advance.

mod audio;
mod background;
mod character;
mod dialogue;
mod effects;
mod navigation;
mod overlays;
mod pacing;
mod screens;
mod variables;

pub use dialogue::interpolate;

use stagehand_core::error::EngineError;
use stagehand_script::domain::command::{Command, CommandKind};

use super::context::HandlerContext;
use super::outcome::HandlerOutcome;

/// Result of running one handler.
pub type HandlerResult = Result<HandlerOutcome, EngineError>;

/// Runs the handler for `command`'s kind.
///
/// # Errors
///
/// Returns the soft failure that made the command degrade to a no-op.
pub fn handle(command: &Command, ctx: &mut HandlerContext<'_>) -> HandlerResult {
    match &command.kind {
        CommandKind::Dialogue(dialogue) => dialogue::show_dialogue(dialogue, ctx),
        CommandKind::Choice(choice) => dialogue::offer_choice(choice, ctx),
        CommandKind::TextInput(input) => dialogue::prompt_text_input(input, ctx),
        CommandKind::SetVariable(set) => variables::set_variable(set, ctx),
        CommandKind::Jump(jump) => navigation::jump(jump, ctx),
        CommandKind::JumpToLabel(jump) => navigation::jump_to_label(jump, ctx),
        CommandKind::ShowCharacter(show) => character::show_character(show, ctx),
        CommandKind::HideCharacter(hide) => character::hide_character(hide, ctx),
        CommandKind::SetBackground(set) => background::set_background(set, ctx),
        CommandKind::PlayMusic(play) => audio::play_music(play, ctx),
        CommandKind::StopMusic(stop) => Ok(audio::stop_music(*stop, ctx)),
        CommandKind::PlaySoundEffect(play) => audio::play_sound_effect(play, ctx),
        CommandKind::PlayMovie(play) => pacing::play_movie(play, ctx),
        CommandKind::Wait(wait) => Ok(pacing::wait(*wait)),
        CommandKind::ShakeScreen(shake) => Ok(effects::shake(shake)),
        CommandKind::TintScreen(tint) => Ok(effects::tint(tint)),
        CommandKind::PanZoomScreen(pan_zoom) => Ok(effects::pan_zoom(pan_zoom)),
        CommandKind::ResetScreenEffects(reset) => Ok(effects::reset(*reset)),
        CommandKind::FlashScreen(flash) => Ok(effects::flash(flash)),
        CommandKind::ShowScreen(show) => screens::show_screen(show, ctx),
        CommandKind::ShowText(show) => Ok(overlays::show_text(show, ctx)),
        CommandKind::HideText(hide) => Ok(overlays::hide_text(hide)),
        CommandKind::ShowImage(show) => overlays::show_image(show, ctx),
        CommandKind::HideImage(hide) => Ok(overlays::hide_image(hide)),
        CommandKind::ShowButton(show) => Ok(overlays::show_button(show)),
        CommandKind::HideButton(hide) => Ok(overlays::hide_button(hide)),
        CommandKind::Label(_)
        | CommandKind::Group(_)
        | CommandKind::BranchStart(_)
        | CommandKind::BranchEnd(_) => Ok(HandlerOutcome::advance()),
    }
}
