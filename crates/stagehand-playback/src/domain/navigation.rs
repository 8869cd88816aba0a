//! Navigation state machine.
//!
//! `Playing → Playing | Suspended` on each step, `Suspended → Playing` on
//! the matching resume signal, and `Finished` once a tape runs out. A
//! finished session is not an error: the host may still navigate it.

use std::fmt;

use serde::Serialize;

/// Why playback is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendReason {
    /// Acknowledgement (click or key) of a dialogue line.
    Input,
    /// A choice pick.
    Choice,
    /// A text-input submission.
    TextInput,
    /// The host reporting the movie finished.
    Movie,
    /// A modal screen being dismissed.
    Screen,
    /// A timer only (transitions, blocking effects).
    Timer,
    /// Whichever of a timer or an input comes first.
    InputOrTimer,
}

impl SuspendReason {
    /// Whether a resume signal from `source` resolves this suspension.
    #[must_use]
    pub fn accepts(self, source: ResumeSource) -> bool {
        matches!(
            (self, source),
            (Self::Input | Self::InputOrTimer, ResumeSource::Input)
                | (Self::Timer | Self::InputOrTimer, ResumeSource::Timer)
                | (Self::Choice, ResumeSource::Choice)
                | (Self::TextInput, ResumeSource::TextInput)
                | (Self::Movie, ResumeSource::MovieFinished)
                | (Self::Screen, ResumeSource::ScreenDismissed)
        )
    }
}

impl fmt::Display for SuspendReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Choice => "choice",
            Self::TextInput => "text_input",
            Self::Movie => "movie",
            Self::Screen => "screen",
            Self::Timer => "timer",
            Self::InputOrTimer => "input_or_timer",
        };
        f.write_str(name)
    }
}

/// Where a resume signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSource {
    Input,
    Timer,
    Choice,
    TextInput,
    MovieFinished,
    ScreenDismissed,
    /// An overlay button navigated away, cancelling the suspension.
    Button,
}

impl fmt::Display for ResumeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::Timer => "timer",
            Self::Choice => "choice",
            Self::TextInput => "text_input",
            Self::MovieFinished => "movie_finished",
            Self::ScreenDismissed => "screen_dismissed",
            Self::Button => "button",
        };
        f.write_str(name)
    }
}

/// Position of the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NavigationState {
    Playing {
        scene_id: String,
        index: usize,
    },
    Suspended {
        scene_id: String,
        index: usize,
        reason: SuspendReason,
    },
    /// The tape ran out with no outstanding jump.
    Finished { scene_id: String },
    /// The session was ended by its host.
    Ended,
}

impl NavigationState {
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended { .. })
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_or_timer_accepts_both_sources() {
        assert!(SuspendReason::InputOrTimer.accepts(ResumeSource::Input));
        assert!(SuspendReason::InputOrTimer.accepts(ResumeSource::Timer));
        assert!(!SuspendReason::InputOrTimer.accepts(ResumeSource::Choice));
    }

    #[test]
    fn test_dialogue_input_ignores_timers() {
        assert!(SuspendReason::Input.accepts(ResumeSource::Input));
        assert!(!SuspendReason::Input.accepts(ResumeSource::Timer));
    }

    #[test]
    fn test_movie_only_resumes_on_reported_completion() {
        assert!(SuspendReason::Movie.accepts(ResumeSource::MovieFinished));
        assert!(!SuspendReason::Movie.accepts(ResumeSource::Input));
        assert!(!SuspendReason::Movie.accepts(ResumeSource::Timer));
    }
}
