//! Recording media fakes.

use std::sync::{Arc, Mutex};

use stagehand_core::error::EngineError;
use stagehand_core::media::{MediaHandle, MediaPreloader, SoundEffectSink};

#[derive(Debug, Default)]
struct MediaRecord {
    loaded: Vec<String>,
    play_calls: usize,
    pause_calls: usize,
    playing: bool,
    volume: f32,
    looping: bool,
    fail_loads: bool,
}

/// A media handle that records every call. Clones share one record, so a
/// test can box one clone into the engine and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingMediaHandle {
    record: Arc<Mutex<MediaRecord>>,
}

impl RecordingMediaHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle whose `load` always fails.
    #[must_use]
    pub fn failing() -> Self {
        let handle = Self::default();
        handle.record.lock().unwrap().fail_loads = true;
        handle
    }

    /// Every url passed to `load`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn loaded(&self) -> Vec<String> {
        self.record.lock().unwrap().loaded.clone()
    }

    /// Number of `play` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn play_calls(&self) -> usize {
        self.record.lock().unwrap().play_calls
    }

    /// Number of `pause` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn pause_calls(&self) -> usize {
        self.record.lock().unwrap().pause_calls
    }

    /// Whether the looping flag is set.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn looping(&self) -> bool {
        self.record.lock().unwrap().looping
    }
}

impl MediaHandle for RecordingMediaHandle {
    fn load(&mut self, url: &str) -> Result<(), EngineError> {
        let mut record = self.record.lock().unwrap();
        if record.fail_loads {
            return Err(EngineError::MediaLoadFailure(format!("cannot load {url}")));
        }
        record.loaded.push(url.to_owned());
        record.playing = false;
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        let mut record = self.record.lock().unwrap();
        record.play_calls += 1;
        record.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut record = self.record.lock().unwrap();
        record.pause_calls += 1;
        record.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.record.lock().unwrap().playing
    }

    fn volume(&self) -> f32 {
        self.record.lock().unwrap().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.record.lock().unwrap().volume = volume;
    }

    fn set_looping(&mut self, looping: bool) {
        self.record.lock().unwrap().looping = looping;
    }
}

/// A sound-effect sink that records `(url, volume)` for every play.
#[derive(Debug, Default)]
pub struct RecordingSoundEffects {
    played: Mutex<Vec<(String, f32)>>,
}

impl RecordingSoundEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything played.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn played(&self) -> Vec<(String, f32)> {
        self.played.lock().unwrap().clone()
    }
}

impl SoundEffectSink for RecordingSoundEffects {
    fn play(&self, url: &str, volume: f32) -> Result<(), EngineError> {
        self.played.lock().unwrap().push((url.to_owned(), volume));
        Ok(())
    }
}

/// A preloader that records every request and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingPreloader {
    requests: Mutex<Vec<(String, bool)>>,
}

impl RecordingPreloader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every `(url, is_video)` preloaded.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<(String, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

impl MediaPreloader for RecordingPreloader {
    fn preload(&self, url: &str, is_video: bool) -> Result<(), EngineError> {
        self.requests.lock().unwrap().push((url.to_owned(), is_video));
        Ok(())
    }
}

/// A preloader that always fails. Useful for testing degraded transitions.
#[derive(Debug)]
pub struct FailingPreloader;

impl MediaPreloader for FailingPreloader {
    fn preload(&self, url: &str, _is_video: bool) -> Result<(), EngineError> {
        Err(EngineError::MediaLoadFailure(format!("preload failed: {url}")))
    }
}
