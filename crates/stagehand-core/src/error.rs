//! Engine error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The kind of authored reference that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Asset,
    Scene,
    Label,
    Character,
    Expression,
    Layer,
    Variable,
    Screen,
    Overlay,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Asset => "asset",
            Self::Scene => "scene",
            Self::Label => "label",
            Self::Character => "character",
            Self::Expression => "expression",
            Self::Layer => "layer",
            Self::Variable => "variable",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
        };
        f.write_str(name)
    }
}

/// Top-level engine error type.
///
/// The first three variants are soft authoring failures: the dispatcher
/// records them as diagnostics and keeps playing. The rest are returned to
/// callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An authored reference (asset, scene, label, ...) does not exist.
    #[error("missing {kind} reference: {id}")]
    MissingReference {
        /// What kind of thing was referenced.
        kind: ReferenceKind,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// Media could not be preloaded or started.
    #[error("media load failure: {0}")]
    MediaLoadFailure(String),

    /// A value could not be used with the requested operator or type.
    #[error("invalid operator or type: {0}")]
    InvalidOperatorOrType(String),

    /// A validation error in a project or a request.
    #[error("validation error: {0}")]
    Validation(String),

    /// No playback session exists with this identifier.
    #[error("playback session not found: {0}")]
    SessionNotFound(Uuid),

    /// A resume signal arrived while playback was not suspended.
    #[error("playback is not suspended")]
    NotSuspended,

    /// A resume signal arrived that the active suspension does not accept.
    #[error("unexpected resume signal: waiting for {expected}, received {received}")]
    UnexpectedResume {
        /// The reason playback is currently suspended.
        expected: String,
        /// The signal that was received.
        received: String,
    },

    /// An infrastructure (I/O, parsing) error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl EngineError {
    /// Shorthand for a `MissingReference` error.
    pub fn missing(kind: ReferenceKind, id: impl Into<String>) -> Self {
        Self::MissingReference {
            kind,
            id: id.into(),
        }
    }

    /// Returns `true` for authoring failures that degrade playback instead
    /// of stopping it.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::MissingReference { .. }
                | Self::MediaLoadFailure(_)
                | Self::InvalidOperatorOrType(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reference_message_names_kind_and_id() {
        let err = EngineError::missing(ReferenceKind::Label, "ending");

        assert_eq!(err.to_string(), "missing label reference: ending");
        assert!(err.is_soft());
    }

    #[test]
    fn test_session_errors_are_not_soft() {
        assert!(!EngineError::NotSuspended.is_soft());
        assert!(!EngineError::SessionNotFound(Uuid::new_v4()).is_soft());
    }
}
