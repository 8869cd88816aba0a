//! Fixtures shared by the playback unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use stagehand_core::assets::{AssetKind, AssetMetadata};
use stagehand_core::media::MediaPreloader;
use stagehand_core::rng::DeterministicRng;
use stagehand_script::domain::conditions::{ConditionEvaluator, VariableConditionEvaluator};
use stagehand_script::domain::project::{
    Character, CharacterLayer, Expression, Project, ScreenDefinition, VariableDefinition,
};
use stagehand_script::domain::scene::{Scene, SceneIndex};
use stagehand_script::domain::value::{VariableType, VariableValue};
use stagehand_test_support::{
    InMemoryAssets, ManualClock, MockRng, RecordingMediaHandle, RecordingPreloader,
    RecordingSoundEffects,
};
use uuid::Uuid;

use super::audio::MusicChannel;
use super::context::{HandlerContext, PlaybackResources, PlaybackSettings, SessionMode};
use super::dispatcher::Dispatcher;
use crate::domain::events::Diagnostic;
use crate::domain::state::PlaybackState;

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

fn variable(id: &str, name: &str, variable_type: VariableType, default: VariableValue) -> VariableDefinition {
    VariableDefinition {
        id: id.to_owned(),
        name: name.to_owned(),
        variable_type,
        default_value: Some(default),
    }
}

/// A project with one layered character, a few variables and two screens.
/// The first scene is the start scene.
pub(crate) fn project(scenes: Vec<Scene>) -> Project {
    let start_scene_id = scenes
        .first()
        .map_or_else(|| "intro".to_owned(), |scene| scene.id.clone());
    Project {
        id: "pilot".to_owned(),
        name: "Pilot".to_owned(),
        start_scene_id,
        scenes,
        characters: vec![Character {
            id: "ava".to_owned(),
            name: "Ava".to_owned(),
            base_asset_id: Some("ava_base".to_owned()),
            layers: vec![
                CharacterLayer {
                    id: "eyes".to_owned(),
                    name: "Eyes".to_owned(),
                    asset_ids: vec!["ava_eyes_open".to_owned(), "ava_eyes_closed".to_owned()],
                },
                CharacterLayer {
                    id: "mouth".to_owned(),
                    name: "Mouth".to_owned(),
                    asset_ids: vec!["ava_mouth_smile".to_owned(), "ava_mouth_frown".to_owned()],
                },
            ],
            expressions: vec![
                Expression {
                    id: "happy".to_owned(),
                    name: "Happy".to_owned(),
                    base_asset_id: None,
                    layers: BTreeMap::from([
                        ("eyes".to_owned(), "ava_eyes_open".to_owned()),
                        ("mouth".to_owned(), "ava_mouth_smile".to_owned()),
                    ]),
                },
                Expression {
                    id: "sad".to_owned(),
                    name: "Sad".to_owned(),
                    base_asset_id: None,
                    layers: BTreeMap::from([
                        ("eyes".to_owned(), "ava_eyes_closed".to_owned()),
                        ("mouth".to_owned(), "ava_mouth_frown".to_owned()),
                    ]),
                },
            ],
            default_expression_id: Some("happy".to_owned()),
        }],
        variables: vec![
            variable("gold", "Gold", VariableType::Number, VariableValue::Number(10.0)),
            variable("x", "X", VariableType::Number, VariableValue::Number(0.0)),
            variable("name", "Name", VariableType::String, VariableValue::from("Traveler")),
            variable("brave", "Brave", VariableType::Boolean, VariableValue::Bool(false)),
            variable("ava_mouth", "Ava Mouth", VariableType::Number, VariableValue::Number(0.0)),
        ],
        screens: vec![
            ScreenDefinition {
                id: "inventory".to_owned(),
                name: "Inventory".to_owned(),
            },
            ScreenDefinition {
                id: "pause".to_owned(),
                name: "Pause".to_owned(),
            },
        ],
        assets: Vec::new(),
    }
}

pub(crate) fn assets() -> InMemoryAssets {
    InMemoryAssets::new()
        .with("forest", AssetKind::Background, "/bg/forest.png")
        .with_metadata(
            "cave",
            AssetKind::Background,
            "/bg/cave.webm",
            AssetMetadata {
                is_video: true,
                looping: true,
            },
        )
        .with("ava_base", AssetKind::Character, "/chars/ava/base.png")
        .with("ava_eyes_open", AssetKind::Character, "/chars/ava/eyes_open.png")
        .with("ava_eyes_closed", AssetKind::Character, "/chars/ava/eyes_closed.png")
        .with("ava_mouth_smile", AssetKind::Character, "/chars/ava/mouth_smile.png")
        .with("ava_mouth_frown", AssetKind::Character, "/chars/ava/mouth_frown.png")
        .with("theme", AssetKind::Music, "/music/theme.ogg")
        .with("battle", AssetKind::Music, "/music/battle.ogg")
        .with("click", AssetKind::SoundEffect, "/sfx/click.ogg")
        .with("hello", AssetKind::Voice, "/voice/hello.ogg")
        .with("opening", AssetKind::Movie, "/movies/opening.mp4")
        .with("logo", AssetKind::Image, "/img/logo.png")
}

/// Runs single handlers against a hand-built state.
pub(crate) struct Harness {
    pub project: Project,
    pub state: PlaybackState,
    pub scene_index: SceneIndex,
    pub assets: InMemoryAssets,
    pub preloader: Arc<RecordingPreloader>,
    pub preloader_override: Option<Arc<dyn MediaPreloader>>,
    pub sound_effects: Arc<RecordingSoundEffects>,
    pub conditions: VariableConditionEvaluator,
    pub rng: Box<dyn DeterministicRng>,
    pub music_probe: RecordingMediaHandle,
    pub music: MusicChannel,
    pub settings: PlaybackSettings,
    pub mode: SessionMode,
    pub now: DateTime<Utc>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Harness {
    pub(crate) fn new(project: Project) -> Self {
        let scene = project
            .scenes
            .first()
            .cloned()
            .unwrap_or_else(|| Scene::new("intro", "Intro", Vec::new()));
        let state = PlaybackState::new(&scene, project.initial_variables());
        let music_probe = RecordingMediaHandle::new();
        Self {
            scene_index: SceneIndex::build(&scene.commands),
            state,
            project,
            assets: assets(),
            preloader: Arc::new(RecordingPreloader::new()),
            preloader_override: None,
            sound_effects: Arc::new(RecordingSoundEffects::new()),
            conditions: VariableConditionEvaluator,
            rng: Box::new(MockRng),
            music: MusicChannel::new(Box::new(music_probe.clone())),
            music_probe,
            settings: PlaybackSettings::default(),
            mode: SessionMode::Gameplay,
            now: t0(),
            diagnostics: Vec::new(),
        }
    }

    /// Builds a context over the harness and runs `f` with it. Diagnostics
    /// raised inside are appended to `self.diagnostics`.
    pub(crate) fn run<T>(&mut self, f: impl FnOnce(&mut HandlerContext<'_>) -> T) -> T {
        let preloader: &dyn MediaPreloader = match &self.preloader_override {
            Some(preloader) => preloader.as_ref(),
            None => self.preloader.as_ref(),
        };
        let conditions: &dyn ConditionEvaluator = &self.conditions;
        let mut ctx = HandlerContext {
            project: &self.project,
            state: &self.state,
            scene_index: &self.scene_index,
            command_id: "cmd",
            assets: &self.assets,
            preloader,
            sound_effects: self.sound_effects.as_ref(),
            conditions,
            rng: self.rng.as_mut(),
            music: &mut self.music,
            settings: &self.settings,
            mode: self.mode,
            now: self.now,
            diagnostics: Vec::new(),
        };
        let result = f(&mut ctx);
        let diagnostics = ctx.diagnostics;
        self.diagnostics.extend(diagnostics);
        result
    }
}

/// Handles on the fakes behind a test dispatcher.
pub(crate) struct Rig {
    pub clock: Arc<ManualClock>,
    pub music: RecordingMediaHandle,
    pub preloader: Arc<RecordingPreloader>,
    pub sound_effects: Arc<RecordingSoundEffects>,
}

pub(crate) fn resources_with(
    conditions: Arc<dyn ConditionEvaluator>,
) -> (PlaybackResources, Rig) {
    let rig = Rig {
        clock: Arc::new(ManualClock::new(t0())),
        music: RecordingMediaHandle::new(),
        preloader: Arc::new(RecordingPreloader::new()),
        sound_effects: Arc::new(RecordingSoundEffects::new()),
    };
    let resources = PlaybackResources {
        clock: rig.clock.clone(),
        rng: Box::new(MockRng),
        assets: Arc::new(assets()),
        preloader: rig.preloader.clone(),
        sound_effects: rig.sound_effects.clone(),
        conditions,
        music: Box::new(rig.music.clone()),
        settings: PlaybackSettings::default(),
    };
    (resources, rig)
}

/// A started dispatcher over `scenes` that has not stepped yet.
pub(crate) fn dispatcher(scenes: Vec<Scene>) -> (Dispatcher, Rig) {
    dispatcher_with(scenes, Arc::new(VariableConditionEvaluator))
}

pub(crate) fn dispatcher_with(
    scenes: Vec<Scene>,
    conditions: Arc<dyn ConditionEvaluator>,
) -> (Dispatcher, Rig) {
    let (resources, rig) = resources_with(conditions);
    let dispatcher = Dispatcher::start(Uuid::new_v4(), Arc::new(project(scenes)), resources, None)
        .expect("start scene exists");
    (dispatcher, rig)
}
