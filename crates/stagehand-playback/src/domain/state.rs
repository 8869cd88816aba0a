//! Playback state: everything a presentation layer needs to draw a frame.
//!
//! `PlaybackState` is owned and mutated exclusively by the dispatcher.
//! Handlers read it and propose [`StatePatch`](super::patch::StatePatch)es.

use std::collections::BTreeMap;

use serde::Serialize;
use stagehand_script::domain::command::{
    BackgroundTransition, ButtonAction, CharacterPosition, CharacterTransitionKind, ChoiceTarget,
    Command,
};
use stagehand_script::domain::scene::Scene;
use stagehand_script::domain::value::Variables;

/// Reserved call-stack frame. Cleared on every scene jump and otherwise
/// unused until sub-scene calls exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    pub scene_id: String,
    pub index: usize,
}

/// The whole mutable state of one playback session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_scene_id: String,
    /// Snapshot of the active scene's tape.
    #[serde(skip)]
    pub current_commands: Vec<Command>,
    pub current_index: usize,
    pub command_stack: Vec<StackFrame>,
    pub stage: StageState,
    pub ui: UiState,
    pub music: MusicState,
    pub variables: Variables,
    /// Character id → layer id → number variable id driving that layer.
    pub layer_bindings: BTreeMap<String, BTreeMap<String, String>>,
    pub dialogue_history: Vec<DialogueEntry>,
    pub choice_history: Vec<ChoiceRecord>,
}

impl PlaybackState {
    /// State at the start of a session, positioned on the first command of
    /// `scene`.
    #[must_use]
    pub fn new(scene: &Scene, variables: Variables) -> Self {
        Self {
            current_scene_id: scene.id.clone(),
            current_commands: scene.commands.clone(),
            current_index: 0,
            command_stack: Vec::new(),
            stage: StageState::default(),
            ui: UiState::default(),
            music: MusicState::default(),
            variables,
            layer_bindings: BTreeMap::new(),
            dialogue_history: Vec::new(),
            choice_history: Vec::new(),
        }
    }

    /// Replaces the active scene wholesale: blank stage and UI, index 0 and
    /// an empty command stack. Music, variables and histories carry over.
    pub fn enter_scene(&mut self, scene: &Scene) {
        self.current_scene_id.clone_from(&scene.id);
        self.current_commands = scene.commands.clone();
        self.current_index = 0;
        self.command_stack.clear();
        self.stage = StageState::default();
        self.ui = UiState::default();
    }

    /// The command under the pointer, if the tape has not run out.
    #[must_use]
    pub fn current_command(&self) -> Option<&Command> {
        self.current_commands.get(self.current_index)
    }

    /// Whether the pointer has run past the end of the tape.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.current_index >= self.current_commands.len()
    }
}

/// The visible composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageState {
    pub background: Option<Background>,
    pub characters: BTreeMap<String, CharacterRenderState>,
    pub texts: Vec<TextOverlay>,
    pub images: Vec<ImageOverlay>,
    pub buttons: Vec<ButtonOverlay>,
    pub effects: ScreenEffects,
}

/// The active background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Background {
    pub asset_id: String,
    pub url: String,
    pub is_video: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
}

/// One image (or video) in a character's layered stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageImage {
    pub asset_id: String,
    pub url: String,
    pub is_video: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
}

/// Which way a character transition runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    Enter,
    Exit,
}

/// A character transition in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterTransitionState {
    pub kind: CharacterTransitionKind,
    pub duration_ms: u64,
    pub phase: TransitionPhase,
}

/// How one character is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterRenderState {
    pub character_id: String,
    pub expression_id: Option<String>,
    pub position: CharacterPosition,
    /// Bottom to top: base art, then one entry per resolved layer.
    pub images: Vec<StageImage>,
    pub transition: Option<CharacterTransitionState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextOverlay {
    pub overlay_id: String,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOverlay {
    pub overlay_id: String,
    pub asset_id: String,
    pub url: String,
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonOverlay {
    pub overlay_id: String,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub action: ButtonAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shake {
    pub intensity: f32,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tint {
    pub color: String,
    pub opacity: f32,
}

/// Screen-wide effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenEffects {
    pub shake: Option<Shake>,
    pub tint: Option<Tint>,
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    /// Duration the presentation should animate the latest effect change over.
    pub transition_duration_ms: u64,
}

impl Default for ScreenEffects {
    fn default() -> Self {
        Self {
            shake: None,
            tint: None,
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            transition_duration_ms: 0,
        }
    }
}

/// Non-stage presentation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiState {
    pub dialogue: Option<DialogueLine>,
    pub choices: Option<ChoicePrompt>,
    pub text_input: Option<TextInputPrompt>,
    pub movie_url: Option<String>,
    pub is_waiting_for_input: bool,
    pub transition: Option<TransitionDescriptor>,
    pub flash: Option<Flash>,
    pub history_open: bool,
    /// Modal screens; the last entry is on top.
    pub screen_stack: Vec<String>,
    /// Non-blocking HUD overlays shown during gameplay.
    pub hud_stack: Vec<String>,
}

impl UiState {
    /// Whether a background transition is running.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// The modal screen on top of the stack.
    #[must_use]
    pub fn top_screen(&self) -> Option<&str> {
        self.screen_stack.last().map(String::as_str)
    }
}

/// The dialogue line currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueLine {
    pub character_id: Option<String>,
    pub speaker: Option<String>,
    pub text: String,
}

/// One option as offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferedOption {
    pub option_id: String,
    pub text: String,
    pub target: ChoiceTarget,
}

/// The active choice set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoicePrompt {
    pub command_id: String,
    pub prompt: Option<String>,
    pub options: Vec<OfferedOption>,
}

/// The active text-input prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInputPrompt {
    pub command_id: String,
    pub prompt: String,
    pub variable_id: String,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub max_length: Option<usize>,
}

/// A background transition in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionDescriptor {
    pub kind: BackgroundTransition,
    pub duration_ms: u64,
    pub from: Option<Background>,
    pub to: Background,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub color: String,
    pub duration_ms: u64,
}

/// The single background-music channel as the presentation sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MusicState {
    pub asset_id: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Target volume after fades.
    pub volume: f32,
    pub is_playing: bool,
}

/// A line in the dialogue backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueEntry {
    pub scene_id: String,
    pub command_id: String,
    pub speaker: Option<String>,
    pub text: String,
}

/// A pick in the choice log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceRecord {
    pub scene_id: String,
    pub command_id: String,
    pub option_id: String,
    pub text: String,
}
