//! Media collaborator traits.
//!
//! Playable media is the only thing handlers control directly instead of
//! through a state patch, because "start" and "stop" are not state.

use crate::error::EngineError;

/// A playable media element with a volume, such as the shared background
/// music element.
pub trait MediaHandle: Send {
    /// Points the handle at a new source. Does not start playback.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MediaLoadFailure` if the source cannot be loaded.
    fn load(&mut self, url: &str) -> Result<(), EngineError>;

    /// Starts or resumes playback.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MediaLoadFailure` if playback cannot start.
    fn play(&mut self) -> Result<(), EngineError>;

    /// Pauses playback.
    fn pause(&mut self);

    /// Whether the handle is currently playing.
    fn is_playing(&self) -> bool;

    /// Current volume in `[0.0, 1.0]`.
    fn volume(&self) -> f32;

    /// Sets the volume; implementations clamp to `[0.0, 1.0]`.
    fn set_volume(&mut self, volume: f32);

    /// Sets whether playback loops.
    fn set_looping(&mut self, looping: bool);
}

/// Fire-and-forget channel for sound effects and voice clips.
pub trait SoundEffectSink: Send + Sync {
    /// Plays a one-shot clip.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MediaLoadFailure` if the clip cannot be played.
    fn play(&self, url: &str, volume: f32) -> Result<(), EngineError>;
}

/// Warms up media before a visual transition uses it.
pub trait MediaPreloader: Send + Sync {
    /// Preloads an image or video.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MediaLoadFailure` if the media cannot be loaded.
    fn preload(&self, url: &str, is_video: bool) -> Result<(), EngineError>;
}
