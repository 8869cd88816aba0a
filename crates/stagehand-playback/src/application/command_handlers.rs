//! Command handlers for player commands.
//!
//! Each handler checks the command targets this session, tags the events
//! it causes with the command's correlation ID, forwards the signal to the
//! dispatcher and returns the events produced.

use stagehand_core::command::PlayerCommand;
use stagehand_core::error::EngineError;
use tracing::debug;

use crate::application::dispatcher::Dispatcher;
use crate::domain::commands::{
    ChooseOption, ContinuePlayback, DismissScreen, PressButton, ReportMovieFinished,
    SubmitTextInput, ToggleHistoryPanel,
};
use crate::domain::events::PlaybackEvent;

fn begin(command: &dyn PlayerCommand, dispatcher: &mut Dispatcher) -> Result<(), EngineError> {
    if command.session_id() != dispatcher.session_id() {
        return Err(EngineError::SessionNotFound(command.session_id()));
    }
    debug!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        "handling player command"
    );
    dispatcher.set_correlation_id(command.correlation_id());
    Ok(())
}

fn finish(dispatcher: &mut Dispatcher) -> Vec<PlaybackEvent> {
    let events = dispatcher.drain_events();
    dispatcher.set_correlation_id(dispatcher.session_id());
    events
}

/// Handles `ContinuePlayback`: acknowledges the current line or cuts an
/// interruptible wait short.
///
/// # Errors
///
/// Returns `EngineError::SessionNotFound` for another session's command and
/// the dispatcher's resume errors otherwise.
pub fn handle_continue_playback(
    command: &ContinuePlayback,
    dispatcher: &mut Dispatcher,
) -> Result<Vec<PlaybackEvent>, EngineError> {
    begin(command, dispatcher)?;
    debug!(input = ?command.input, "continue");
    let result = dispatcher.continue_playback();
    let events = finish(dispatcher);
    result.map(|()| events)
}

/// Handles `ChooseOption`.
///
/// # Errors
///
/// Returns `EngineError::Validation` for an out-of-range option index and
/// a resume error when no choice is pending.
pub fn handle_choose_option(
    command: &ChooseOption,
    dispatcher: &mut Dispatcher,
) -> Result<Vec<PlaybackEvent>, EngineError> {
    begin(command, dispatcher)?;
    let result = dispatcher.choose(command.option_index);
    let events = finish(dispatcher);
    result.map(|()| events)
}

/// Handles `SubmitTextInput`.
///
/// # Errors
///
/// Returns a resume error when no text input is pending.
pub fn handle_submit_text_input(
    command: &SubmitTextInput,
    dispatcher: &mut Dispatcher,
) -> Result<Vec<PlaybackEvent>, EngineError> {
    begin(command, dispatcher)?;
    let result = dispatcher.submit_text(&command.value);
    let events = finish(dispatcher);
    result.map(|()| events)
}

/// Handles `ReportMovieFinished`.
///
/// # Errors
///
/// Returns a resume error when no movie is playing.
pub fn handle_report_movie_finished(
    command: &ReportMovieFinished,
    dispatcher: &mut Dispatcher,
) -> Result<Vec<PlaybackEvent>, EngineError> {
    begin(command, dispatcher)?;
    let result = dispatcher.movie_finished();
    let events = finish(dispatcher);
    result.map(|()| events)
}

/// Handles `DismissScreen`.
///
/// # Errors
///
/// Returns `EngineError::Validation` when no modal screen is open.
pub fn handle_dismiss_screen(
    command: &DismissScreen,
    dispatcher: &mut Dispatcher,
) -> Result<Vec<PlaybackEvent>, EngineError> {
    begin(command, dispatcher)?;
    let result = dispatcher.dismiss_screen();
    let events = finish(dispatcher);
    result.map(|()| events)
}

/// Handles `PressButton`.
///
/// # Errors
///
/// Returns `EngineError::MissingReference` when the button is not on stage.
pub fn handle_press_button(
    command: &PressButton,
    dispatcher: &mut Dispatcher,
) -> Result<Vec<PlaybackEvent>, EngineError> {
    begin(command, dispatcher)?;
    let result = dispatcher.press_button(&command.button_id);
    let events = finish(dispatcher);
    result.map(|()| events)
}

/// Handles `ToggleHistoryPanel`.
///
/// # Errors
///
/// Returns `EngineError::SessionNotFound` for another session's command.
pub fn handle_toggle_history_panel(
    command: &ToggleHistoryPanel,
    dispatcher: &mut Dispatcher,
) -> Result<Vec<PlaybackEvent>, EngineError> {
    begin(command, dispatcher)?;
    dispatcher.set_history_open(command.open);
    Ok(finish(dispatcher))
}
