//! State patches, the only way playback state changes.
//!
//! Handlers describe what they want changed as a `StatePatch`; the
//! dispatcher merges the whole patch in one `&mut` borrow, so no observer
//! ever sees half of it.

use stagehand_script::domain::value::VariableValue;

use super::state::{
    Background, ButtonOverlay, CharacterRenderState, CharacterTransitionState, ChoicePrompt,
    ChoiceRecord, DialogueEntry, DialogueLine, Flash, ImageOverlay, MusicState, PlaybackState,
    ScreenEffects, Shake, TextInputPrompt, TextOverlay, Tint, TransitionDescriptor,
};

/// One atomic change to playback state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    Background(Option<Background>),
    /// Inserts or replaces a character on stage.
    ShowCharacter(CharacterRenderState),
    CharacterTransition {
        character_id: String,
        transition: Option<CharacterTransitionState>,
    },
    RemoveCharacter(String),
    BindLayer {
        character_id: String,
        layer_id: String,
        variable_id: String,
    },
    ShowText(TextOverlay),
    HideText(String),
    ShowImage(ImageOverlay),
    HideImage(String),
    ShowButton(ButtonOverlay),
    HideButton(String),
    Shake(Option<Shake>),
    Tint(Option<Tint>),
    PanZoom {
        zoom: f32,
        pan_x: f32,
        pan_y: f32,
    },
    ResetEffects,
    EffectDuration(u64),
    Dialogue(Option<DialogueLine>),
    RecordDialogue(DialogueEntry),
    Choices(Option<ChoicePrompt>),
    RecordChoice(ChoiceRecord),
    TextInput(Option<TextInputPrompt>),
    Movie(Option<String>),
    WaitingForInput(bool),
    Transition(Option<TransitionDescriptor>),
    Flash(Option<Flash>),
    PushScreen(String),
    PopScreen,
    PushHud(String),
    PopHud,
    HistoryPanel(bool),
    Music(MusicState),
    Variable {
        variable_id: String,
        value: VariableValue,
    },
}

/// An ordered list of changes merged as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    changes: Vec<StateChange>,
}

impl StatePatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    #[must_use]
    pub fn with(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn push(&mut self, change: StateChange) {
        self.changes.push(change);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }
}

impl From<StateChange> for StatePatch {
    fn from(change: StateChange) -> Self {
        Self {
            changes: vec![change],
        }
    }
}

impl Extend<StateChange> for StatePatch {
    fn extend<T: IntoIterator<Item = StateChange>>(&mut self, iter: T) {
        self.changes.extend(iter);
    }
}

impl IntoIterator for StatePatch {
    type Item = StateChange;
    type IntoIter = std::vec::IntoIter<StateChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl PlaybackState {
    /// Merges a patch, in order.
    pub fn apply(&mut self, patch: StatePatch) {
        for change in patch {
            self.apply_change(change);
        }
    }

    #[allow(clippy::too_many_lines)]
    fn apply_change(&mut self, change: StateChange) {
        let stage = &mut self.stage;
        let ui = &mut self.ui;
        match change {
            StateChange::Background(background) => stage.background = background,
            StateChange::ShowCharacter(character) => {
                stage
                    .characters
                    .insert(character.character_id.clone(), character);
            }
            StateChange::CharacterTransition {
                character_id,
                transition,
            } => {
                if let Some(character) = stage.characters.get_mut(&character_id) {
                    character.transition = transition;
                }
            }
            StateChange::RemoveCharacter(character_id) => {
                stage.characters.remove(&character_id);
            }
            StateChange::BindLayer {
                character_id,
                layer_id,
                variable_id,
            } => {
                self.layer_bindings
                    .entry(character_id)
                    .or_default()
                    .insert(layer_id, variable_id);
            }
            StateChange::ShowText(text) => {
                upsert(&mut stage.texts, text, |t| t.overlay_id.as_str());
            }
            StateChange::HideText(id) => stage.texts.retain(|t| t.overlay_id != id),
            StateChange::ShowImage(image) => {
                upsert(&mut stage.images, image, |i| i.overlay_id.as_str());
            }
            StateChange::HideImage(id) => stage.images.retain(|i| i.overlay_id != id),
            StateChange::ShowButton(button) => {
                upsert(&mut stage.buttons, button, |b| b.overlay_id.as_str());
            }
            StateChange::HideButton(id) => stage.buttons.retain(|b| b.overlay_id != id),
            StateChange::Shake(shake) => stage.effects.shake = shake,
            StateChange::Tint(tint) => stage.effects.tint = tint,
            StateChange::PanZoom { zoom, pan_x, pan_y } => {
                stage.effects.zoom = zoom;
                stage.effects.pan_x = pan_x;
                stage.effects.pan_y = pan_y;
            }
            StateChange::ResetEffects => {
                let duration = stage.effects.transition_duration_ms;
                stage.effects = ScreenEffects {
                    transition_duration_ms: duration,
                    ..ScreenEffects::default()
                };
            }
            StateChange::EffectDuration(duration_ms) => {
                stage.effects.transition_duration_ms = duration_ms;
            }
            StateChange::Dialogue(line) => ui.dialogue = line,
            StateChange::RecordDialogue(entry) => self.dialogue_history.push(entry),
            StateChange::Choices(prompt) => ui.choices = prompt,
            StateChange::RecordChoice(record) => self.choice_history.push(record),
            StateChange::TextInput(prompt) => ui.text_input = prompt,
            StateChange::Movie(url) => ui.movie_url = url,
            StateChange::WaitingForInput(waiting) => ui.is_waiting_for_input = waiting,
            StateChange::Transition(transition) => ui.transition = transition,
            StateChange::Flash(flash) => ui.flash = flash,
            StateChange::PushScreen(screen_id) => ui.screen_stack.push(screen_id),
            StateChange::PopScreen => {
                ui.screen_stack.pop();
            }
            StateChange::PushHud(screen_id) => ui.hud_stack.push(screen_id),
            StateChange::PopHud => {
                ui.hud_stack.pop();
            }
            StateChange::HistoryPanel(open) => ui.history_open = open,
            StateChange::Music(music) => self.music = music,
            StateChange::Variable { variable_id, value } => {
                self.variables.insert(variable_id, value);
            }
        }
    }
}

fn upsert<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> &str) {
    match items.iter().position(|existing| key(existing) == key(&item)) {
        Some(position) => items[position] = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_script::domain::scene::Scene;
    use stagehand_script::domain::value::Variables;

    fn empty_state() -> PlaybackState {
        PlaybackState::new(&Scene::new("s", "S", Vec::new()), Variables::new())
    }

    fn text(id: &str, body: &str) -> TextOverlay {
        TextOverlay {
            overlay_id: id.to_owned(),
            text: body.to_owned(),
            x: 0.0,
            y: 0.0,
            style: None,
        }
    }

    #[test]
    fn test_apply_merges_every_change_in_order() {
        // Arrange
        let mut state = empty_state();
        let patch = StatePatch::new()
            .with(StateChange::Variable {
                variable_id: "x".to_owned(),
                value: VariableValue::Number(1.0),
            })
            .with(StateChange::Variable {
                variable_id: "x".to_owned(),
                value: VariableValue::Number(2.0),
            })
            .with(StateChange::WaitingForInput(true));

        // Act
        state.apply(patch);

        // Assert
        assert_eq!(state.variables["x"], VariableValue::Number(2.0));
        assert!(state.ui.is_waiting_for_input);
    }

    #[test]
    fn test_show_text_replaces_overlay_with_same_id() {
        let mut state = empty_state();

        state.apply(StatePatch::from(StateChange::ShowText(text("t", "one"))));
        state.apply(StatePatch::from(StateChange::ShowText(text("t", "two"))));

        assert_eq!(state.stage.texts.len(), 1);
        assert_eq!(state.stage.texts[0].text, "two");
    }

    #[test]
    fn test_reset_effects_keeps_transition_duration() {
        let mut state = empty_state();
        state.apply(
            StatePatch::new()
                .with(StateChange::PanZoom {
                    zoom: 2.0,
                    pan_x: 10.0,
                    pan_y: 5.0,
                })
                .with(StateChange::EffectDuration(400))
                .with(StateChange::ResetEffects),
        );

        assert!((state.stage.effects.zoom - 1.0).abs() < f32::EPSILON);
        assert_eq!(state.stage.effects.transition_duration_ms, 400);
    }

    #[test]
    fn test_character_transition_ignores_absent_character() {
        let mut state = empty_state();

        state.apply(StatePatch::from(StateChange::CharacterTransition {
            character_id: "ghost".to_owned(),
            transition: None,
        }));

        assert!(state.stage.characters.is_empty());
    }
}
