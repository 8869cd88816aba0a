//! Player commands: the resume signals and controls a host sends into a
//! running session.

use serde::{Deserialize, Serialize};
use stagehand_core::command::PlayerCommand;
use uuid::Uuid;

/// The device that produced an acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum InputSource {
    Click,
    Key { key: String },
}

/// Acknowledge the current line (or cut a wait short).
#[derive(Debug, Clone)]
pub struct ContinuePlayback {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to continue.
    pub session_id: Uuid,
    /// What produced the input.
    pub input: InputSource,
}

impl PlayerCommand for ContinuePlayback {
    fn command_type(&self) -> &'static str {
        "playback.continue"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Pick one of the offered choice options.
#[derive(Debug, Clone)]
pub struct ChooseOption {
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    /// Index into the options as offered (after condition filtering).
    pub option_index: usize,
}

impl PlayerCommand for ChooseOption {
    fn command_type(&self) -> &'static str {
        "playback.choose_option"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Submit the text-input prompt.
#[derive(Debug, Clone)]
pub struct SubmitTextInput {
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub value: String,
}

impl PlayerCommand for SubmitTextInput {
    fn command_type(&self) -> &'static str {
        "playback.submit_text_input"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Report that the playing movie ended (or was skipped).
#[derive(Debug, Clone)]
pub struct ReportMovieFinished {
    pub correlation_id: Uuid,
    pub session_id: Uuid,
}

impl PlayerCommand for ReportMovieFinished {
    fn command_type(&self) -> &'static str {
        "playback.report_movie_finished"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Close the modal screen on top of the stack.
#[derive(Debug, Clone)]
pub struct DismissScreen {
    pub correlation_id: Uuid,
    pub session_id: Uuid,
}

impl PlayerCommand for DismissScreen {
    fn command_type(&self) -> &'static str {
        "playback.dismiss_screen"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Press an overlay button.
#[derive(Debug, Clone)]
pub struct PressButton {
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub button_id: String,
}

impl PlayerCommand for PressButton {
    fn command_type(&self) -> &'static str {
        "playback.press_button"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// Open or close the dialogue history panel.
#[derive(Debug, Clone)]
pub struct ToggleHistoryPanel {
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub open: bool,
}

impl PlayerCommand for ToggleHistoryPanel {
    fn command_type(&self) -> &'static str {
        "playback.toggle_history_panel"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> Uuid {
        self.session_id
    }
}
