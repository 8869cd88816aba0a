//! Headless media collaborators.
//!
//! The server has no speakers or decoders: the presentation client plays
//! media from the state it polls. These stand-ins keep the engine's media
//! bookkeeping (volume, looping, play/pause) so fades and status still run.

use stagehand_core::error::EngineError;
use stagehand_core::media::{MediaHandle, MediaPreloader, SoundEffectSink};
use tracing::debug;

/// Music handle that tracks state without producing sound.
#[derive(Debug, Default)]
pub struct HeadlessMusicHandle {
    url: Option<String>,
    playing: bool,
    volume: f32,
    looping: bool,
}

impl HeadlessMusicHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded source, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }
}

impl MediaHandle for HeadlessMusicHandle {
    fn load(&mut self, url: &str) -> Result<(), EngineError> {
        if url.trim().is_empty() {
            return Err(EngineError::MediaLoadFailure("empty music url".to_owned()));
        }
        self.url = Some(url.to_owned());
        self.playing = false;
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        if self.url.is_none() {
            return Err(EngineError::MediaLoadFailure("no music loaded".to_owned()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
}

/// Sound-effect sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSoundEffects;

impl SoundEffectSink for LoggingSoundEffects {
    fn play(&self, url: &str, volume: f32) -> Result<(), EngineError> {
        debug!(url, volume, "sound effect");
        Ok(())
    }
}

/// Preloader that accepts everything; clients fetch media themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughPreloader;

impl MediaPreloader for PassthroughPreloader {
    fn preload(&self, url: &str, is_video: bool) -> Result<(), EngineError> {
        debug!(url, is_video, "preload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_music_tracks_play_state() {
        // Arrange
        let mut handle = HeadlessMusicHandle::new();

        // Act
        handle.load("/music/theme.ogg").unwrap();
        handle.set_volume(1.7);
        handle.set_looping(true);
        handle.play().unwrap();

        // Assert
        assert!(handle.is_playing());
        assert_eq!(handle.url(), Some("/music/theme.ogg"));
        assert!((handle.volume() - 1.0).abs() < f32::EPSILON);
        assert!(handle.is_looping());
    }

    #[test]
    fn test_play_without_source_fails() {
        let mut handle = HeadlessMusicHandle::new();

        assert!(matches!(
            handle.play(),
            Err(EngineError::MediaLoadFailure(_))
        ));
    }
}
