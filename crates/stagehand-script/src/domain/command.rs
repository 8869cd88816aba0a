//! Scene commands: the instructions on a scene's tape.
//!
//! A command is serialized as a flat object: an `id`, optional
//! `conditions`, a `type` tag and the fields of its kind.

use serde::{Deserialize, Serialize};

use super::conditions::Condition;
use super::value::VariableValue;

/// One authored instruction in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Unique within its scene.
    pub id: String,
    /// Conditions that must hold for the command to run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// What the command does.
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    /// Creates an unconditional command.
    pub fn new(id: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            id: id.into(),
            conditions: Vec::new(),
            kind,
        }
    }

    /// Attaches conditions to the command.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Stable name of the command kind, matching its serialized tag.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Every kind of scene command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandKind {
    Dialogue(Dialogue),
    SetBackground(SetBackground),
    ShowCharacter(ShowCharacter),
    HideCharacter(HideCharacter),
    Choice(Choice),
    SetVariable(SetVariable),
    TextInput(TextInput),
    Jump(Jump),
    JumpToLabel(JumpToLabel),
    Label(Label),
    PlayMusic(PlayMusic),
    StopMusic(StopMusic),
    PlaySoundEffect(PlaySoundEffect),
    PlayMovie(PlayMovie),
    Wait(Wait),
    ShakeScreen(ShakeScreen),
    TintScreen(TintScreen),
    PanZoomScreen(PanZoomScreen),
    ResetScreenEffects(ResetScreenEffects),
    FlashScreen(FlashScreen),
    ShowScreen(ShowScreen),
    ShowText(ShowText),
    HideText(HideOverlay),
    ShowImage(ShowImage),
    HideImage(HideOverlay),
    ShowButton(ShowButton),
    HideButton(HideOverlay),
    BranchStart(BranchMarker),
    BranchEnd(BranchMarker),
    Group(Group),
}

impl CommandKind {
    /// Stable name of the kind, matching its serialized tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dialogue(_) => "dialogue",
            Self::SetBackground(_) => "set_background",
            Self::ShowCharacter(_) => "show_character",
            Self::HideCharacter(_) => "hide_character",
            Self::Choice(_) => "choice",
            Self::SetVariable(_) => "set_variable",
            Self::TextInput(_) => "text_input",
            Self::Jump(_) => "jump",
            Self::JumpToLabel(_) => "jump_to_label",
            Self::Label(_) => "label",
            Self::PlayMusic(_) => "play_music",
            Self::StopMusic(_) => "stop_music",
            Self::PlaySoundEffect(_) => "play_sound_effect",
            Self::PlayMovie(_) => "play_movie",
            Self::Wait(_) => "wait",
            Self::ShakeScreen(_) => "shake_screen",
            Self::TintScreen(_) => "tint_screen",
            Self::PanZoomScreen(_) => "pan_zoom_screen",
            Self::ResetScreenEffects(_) => "reset_screen_effects",
            Self::FlashScreen(_) => "flash_screen",
            Self::ShowScreen(_) => "show_screen",
            Self::ShowText(_) => "show_text",
            Self::HideText(_) => "hide_text",
            Self::ShowImage(_) => "show_image",
            Self::HideImage(_) => "hide_image",
            Self::ShowButton(_) => "show_button",
            Self::HideButton(_) => "hide_button",
            Self::BranchStart(_) => "branch_start",
            Self::BranchEnd(_) => "branch_end",
            Self::Group(_) => "group",
        }
    }

    /// Markers carry structure only and never change playback state.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            Self::Label(_) | Self::Group(_) | Self::BranchStart(_) | Self::BranchEnd(_)
        )
    }
}

fn default_volume() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Shows a line of dialogue and waits for acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialogue {
    /// Speaking character, if any.
    #[serde(default)]
    pub character_id: Option<String>,
    /// Overrides the character's name in the name box.
    #[serde(default)]
    pub speaker_name: Option<String>,
    /// The line. `{variable}` placeholders are interpolated at runtime.
    pub text: String,
    /// Optional voice clip played alongside the line.
    #[serde(default)]
    pub voice_asset_id: Option<String>,
}

/// Background transition styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundTransition {
    #[default]
    Instant,
    CrossFade,
    FadeThroughBlack,
    Dissolve,
    Slide,
    Iris,
    Wipe,
}

/// Changes the stage background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBackground {
    pub asset_id: String,
    #[serde(default)]
    pub transition: BackgroundTransition,
    #[serde(default)]
    pub duration_ms: u64,
}

/// Where a character stands on stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterPosition {
    FarLeft,
    Left,
    #[default]
    Center,
    Right,
    FarRight,
}

/// Character entrance/exit animation styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterTransitionKind {
    #[default]
    Fade,
    SlideLeft,
    SlideRight,
    SlideUp,
    Zoom,
}

/// A declared character transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterTransition {
    #[serde(default)]
    pub kind: CharacterTransitionKind,
    pub duration_ms: u64,
}

/// Puts a character on stage (or updates one already there).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowCharacter {
    pub character_id: String,
    #[serde(default)]
    pub expression_id: Option<String>,
    #[serde(default)]
    pub position: CharacterPosition,
    #[serde(default)]
    pub transition: Option<CharacterTransition>,
}

/// Removes a character from the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HideCharacter {
    pub character_id: String,
    #[serde(default)]
    pub transition: Option<CharacterTransition>,
}

/// Where picking a choice option leads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChoiceTarget {
    /// Carry on with the command after the choice.
    #[default]
    Continue,
    /// Jump to another scene.
    Scene { scene_id: String },
    /// Jump to a label in the current scene.
    Label { label_id: String },
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
    /// Options whose conditions fail are not offered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub target: ChoiceTarget,
}

/// Presents a set of options and waits for a pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub prompt: Option<String>,
    pub options: Vec<ChoiceOption>,
}

/// Arithmetic applied by `SetVariable`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableOperator {
    #[default]
    Set,
    Add,
    Subtract,
    Random,
}

fn default_random_max() -> i64 {
    100
}

/// Writes a project variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetVariable {
    pub variable_id: String,
    #[serde(default)]
    pub operator: VariableOperator,
    #[serde(default)]
    pub value: VariableValue,
    /// Lower bound for `random`, inclusive.
    #[serde(default)]
    pub random_min: i64,
    /// Upper bound for `random`, inclusive.
    #[serde(default = "default_random_max")]
    pub random_max: i64,
}

/// Prompts for free text and stores it in a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub prompt: String,
    pub variable_id: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Used when the player submits nothing.
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// Replaces the active scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jump {
    pub scene_id: String,
}

/// Moves to a label in the current scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpToLabel {
    pub label_id: String,
}

/// A jump target inside a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub label_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Starts the background music track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayMusic {
    pub asset_id: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(rename = "loop", default = "default_true")]
    pub looping: bool,
    #[serde(default)]
    pub fade_in_ms: u64,
}

/// Fades out and stops the background music.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopMusic {
    #[serde(default)]
    pub fade_out_ms: u64,
}

/// Plays a one-shot sound effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySoundEffect {
    pub asset_id: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

/// Plays a full-screen movie until the host reports it finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayMovie {
    pub asset_id: String,
}

/// Pauses playback for a duration, optionally cut short by input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wait {
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub wait_for_input: bool,
}

/// Shakes the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeScreen {
    #[serde(default = "default_shake_intensity")]
    pub intensity: f32,
    pub duration_ms: u64,
    /// Block playback until the shake ends.
    #[serde(default)]
    pub wait_for_completion: bool,
}

fn default_shake_intensity() -> f32 {
    5.0
}

/// Applies a colour tint over the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TintScreen {
    pub color: String,
    #[serde(default = "default_volume")]
    pub opacity: f32,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub wait_for_completion: bool,
}

/// Zooms and pans the stage camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanZoomScreen {
    #[serde(default = "default_volume")]
    pub zoom: f32,
    #[serde(default)]
    pub pan_x: f32,
    #[serde(default)]
    pub pan_y: f32,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub wait_for_completion: bool,
}

/// Clears shake, tint and pan/zoom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetScreenEffects {
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub wait_for_completion: bool,
}

fn default_flash_color() -> String {
    "#ffffff".to_owned()
}

/// Flashes a solid colour over the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashScreen {
    #[serde(default = "default_flash_color")]
    pub color: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub wait_for_completion: bool,
}

/// Opens a designed UI screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowScreen {
    pub screen_id: String,
}

/// Places a text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowText {
    pub overlay_id: String,
    pub text: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub style: Option<String>,
}

/// Places an image overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowImage {
    pub overlay_id: String,
    pub asset_id: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default = "default_volume")]
    pub opacity: f32,
}

/// What pressing an overlay button does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ButtonAction {
    #[default]
    None,
    Scene { scene_id: String },
    Label { label_id: String },
}

/// Places a clickable button overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowButton {
    pub overlay_id: String,
    pub text: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub action: ButtonAction,
}

/// Removes a text, image or button overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HideOverlay {
    pub overlay_id: String,
}

/// Opening or closing bracket of a conditional branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchMarker {
    pub branch_id: String,
}

/// Editorial grouping marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: String,
    #[serde(default)]
    pub name: Option<String>,
}
