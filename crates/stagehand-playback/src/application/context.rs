//! Injected resources and the per-invocation handler context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stagehand_core::assets::{AssetKind, AssetResolver, is_placeholder};
use stagehand_core::clock::Clock;
use stagehand_core::error::{EngineError, ReferenceKind};
use stagehand_core::media::{MediaHandle, MediaPreloader, SoundEffectSink};
use stagehand_core::rng::DeterministicRng;
use stagehand_script::domain::conditions::ConditionEvaluator;
use stagehand_script::domain::project::Project;
use stagehand_script::domain::scene::SceneIndex;

use super::audio::MusicChannel;
use crate::domain::events::{Diagnostic, DiagnosticKind};
use crate::domain::state::PlaybackState;

/// Read-only player settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Characters per second for the typewriter effect. Presentation only.
    pub text_speed: u32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    /// Lets input cut timed suspensions short.
    pub enable_skip: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            text_speed: 30,
            music_volume: 0.8,
            sfx_volume: 1.0,
            enable_skip: true,
        }
    }
}

/// Whether the session is in active gameplay or sitting in a menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Gameplay,
    Menu,
}

/// External collaborators injected into a dispatcher.
pub struct PlaybackResources {
    pub clock: Arc<dyn Clock>,
    pub rng: Box<dyn DeterministicRng>,
    pub assets: Arc<dyn AssetResolver>,
    pub preloader: Arc<dyn MediaPreloader>,
    pub sound_effects: Arc<dyn SoundEffectSink>,
    pub conditions: Arc<dyn ConditionEvaluator>,
    /// The single shared background-music element.
    pub music: Box<dyn MediaHandle>,
    pub settings: PlaybackSettings,
}

/// Everything a handler may look at or touch during one invocation.
///
/// `state` is a frozen view: handlers propose changes through their
/// outcome, never by mutation. The music channel is the only mutable
/// collaborator.
pub struct HandlerContext<'a> {
    pub project: &'a Project,
    pub state: &'a PlaybackState,
    pub scene_index: &'a SceneIndex,
    pub command_id: &'a str,
    pub assets: &'a dyn AssetResolver,
    pub preloader: &'a dyn MediaPreloader,
    pub sound_effects: &'a dyn SoundEffectSink,
    pub conditions: &'a dyn ConditionEvaluator,
    pub rng: &'a mut dyn DeterministicRng,
    pub music: &'a mut MusicChannel,
    pub settings: &'a PlaybackSettings,
    pub mode: SessionMode,
    pub now: DateTime<Utc>,
    /// Soft failures raised during this invocation.
    pub diagnostics: Vec<Diagnostic>,
}

impl HandlerContext<'_> {
    /// Records a soft failure against the current command.
    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        reference: Option<ReferenceKind>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            kind,
            scene_id: self.state.current_scene_id.clone(),
            command_id: Some(self.command_id.to_owned()),
            reference,
            message: message.into(),
        });
    }

    /// Records an engine error as a soft failure.
    pub fn warn_error(&mut self, error: &EngineError) {
        let (kind, reference) = classify(error);
        self.warn(kind, reference, error.to_string());
    }

    /// Resolves an asset url. Unknown ids are reported; placeholder ids
    /// resolve to `None` quietly.
    pub fn resolve_asset(&mut self, asset_id: &str, kind: AssetKind) -> Option<String> {
        let url = self.assets.resolve(asset_id, kind);
        if url.is_none() && !is_placeholder(asset_id) {
            self.warn_error(&EngineError::missing(ReferenceKind::Asset, asset_id));
        }
        url
    }

    /// Resolves an asset url, failing the command when it is absent.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingReference` for unknown or placeholder ids.
    pub fn require_asset(&self, asset_id: &str, kind: AssetKind) -> Result<String, EngineError> {
        self.assets
            .resolve(asset_id, kind)
            .ok_or_else(|| EngineError::missing(ReferenceKind::Asset, asset_id))
    }
}

/// Maps an engine error onto a diagnostic category.
#[must_use]
pub fn classify(error: &EngineError) -> (DiagnosticKind, Option<ReferenceKind>) {
    match error {
        EngineError::MissingReference { kind, .. } => {
            (DiagnosticKind::MissingReference, Some(*kind))
        }
        EngineError::MediaLoadFailure(_) => (DiagnosticKind::MediaLoadFailure, None),
        EngineError::InvalidOperatorOrType(_) => (DiagnosticKind::InvalidOperatorOrType, None),
        _ => (DiagnosticKind::HandlerFailure, None),
    }
}
