//! Domain events for playback sessions.
//!
//! The dispatcher appends one event per observable step so hosts can follow
//! (and persist) what happened without diffing states.

use serde::{Deserialize, Serialize};
use stagehand_core::event::{DomainEvent, EventMetadata};
use stagehand_core::error::ReferenceKind;

/// Category of a soft failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingReference,
    MediaLoadFailure,
    InvalidOperatorOrType,
    HandlerFailure,
    RunawayLoop,
    StructureIssue,
}

/// A soft failure that degraded playback without stopping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub scene_id: String,
    pub command_id: Option<String>,
    pub reference: Option<ReferenceKind>,
    pub message: String,
}

/// Why a command was stepped over without running its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ConditionFalse,
    HandlerFailed,
}

/// Event payload variants for playback sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEventKind {
    SessionStarted {
        scene_id: String,
    },
    SceneEntered {
        scene_id: String,
    },
    CommandExecuted {
        scene_id: String,
        index: usize,
        command_id: String,
        command_kind: String,
    },
    CommandSkipped {
        scene_id: String,
        index: usize,
        command_id: String,
        reason: SkipReason,
    },
    Suspended {
        scene_id: String,
        index: usize,
        reason: String,
    },
    Resumed {
        scene_id: String,
        index: usize,
        source: String,
    },
    DiagnosticRaised(Diagnostic),
    PlaybackFinished {
        scene_id: String,
    },
    SessionEnded,
}

/// Domain event envelope for playback sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl PlaybackEventKind {
    /// Type name used in `EventMetadata::event_type`.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "playback.session_started",
            Self::SceneEntered { .. } => "playback.scene_entered",
            Self::CommandExecuted { .. } => "playback.command_executed",
            Self::CommandSkipped { .. } => "playback.command_skipped",
            Self::Suspended { .. } => "playback.suspended",
            Self::Resumed { .. } => "playback.resumed",
            Self::DiagnosticRaised(_) => "playback.diagnostic_raised",
            Self::PlaybackFinished { .. } => "playback.finished",
            Self::SessionEnded => "playback.session_ended",
        }
    }
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("PlaybackEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
