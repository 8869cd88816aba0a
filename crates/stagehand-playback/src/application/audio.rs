//! The exclusive background-music channel.
//!
//! Only the music handlers reach the shared media handle, and only through
//! this type.

use chrono::{DateTime, TimeDelta, Utc};
use stagehand_core::error::EngineError;
use stagehand_core::media::MediaHandle;

use super::timing::{FadeCompletion, VolumeFade};

/// How often an active fade wants to be sampled.
const FADE_STEP_MS: i64 = 50;

/// Owns the background-music handle and its running fade.
pub struct MusicChannel {
    handle: Box<dyn MediaHandle>,
    asset_id: Option<String>,
    fade: Option<VolumeFade>,
}

impl std::fmt::Debug for MusicChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicChannel")
            .field("asset_id", &self.asset_id)
            .field("fade", &self.fade)
            .finish_non_exhaustive()
    }
}

impl MusicChannel {
    #[must_use]
    pub fn new(handle: Box<dyn MediaHandle>) -> Self {
        Self {
            handle,
            asset_id: None,
            fade: None,
        }
    }

    /// Starts `asset_id`, fading in from silence to `volume`.
    ///
    /// Re-requesting the track that is already playing only updates its
    /// looping flag (and cancels a pending fade-out).
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MediaLoadFailure` if the handle cannot load or
    /// start the track.
    pub fn play(
        &mut self,
        asset_id: &str,
        url: &str,
        looping: bool,
        volume: f32,
        fade_in_ms: u64,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if self.is_current(asset_id) {
            self.handle.set_looping(looping);
            if self
                .fade
                .is_some_and(|fade| fade.completion == FadeCompletion::Pause)
            {
                self.start_fade(volume, fade_in_ms, FadeCompletion::None, now);
            }
            return Ok(());
        }

        self.fade = None;
        self.handle.load(url)?;
        self.handle.set_looping(looping);
        self.handle.set_volume(0.0);
        self.handle.play()?;
        self.asset_id = Some(asset_id.to_owned());
        self.start_fade(volume, fade_in_ms, FadeCompletion::None, now);
        Ok(())
    }

    /// Fades the track to silence, then pauses it.
    pub fn stop(&mut self, fade_out_ms: u64, now: DateTime<Utc>) {
        if !self.handle.is_playing() {
            self.fade = None;
            return;
        }
        self.start_fade(0.0, fade_out_ms, FadeCompletion::Pause, now);
    }

    /// Samples the active fade.
    pub fn update(&mut self, now: DateTime<Utc>) {
        let Some(fade) = self.fade else {
            return;
        };
        self.handle.set_volume(fade.volume_at(now));
        if fade.is_complete(now) {
            self.fade = None;
            if fade.completion == FadeCompletion::Pause {
                self.handle.pause();
            }
        }
    }

    /// When the channel next needs `update`.
    #[must_use]
    pub fn next_deadline(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.fade
            .map(|fade| fade.ends_at().min(now + TimeDelta::milliseconds(FADE_STEP_MS)))
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.handle.is_playing()
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    #[must_use]
    pub fn current_asset(&self) -> Option<&str> {
        self.asset_id.as_deref()
    }

    fn is_current(&self, asset_id: &str) -> bool {
        self.asset_id.as_deref() == Some(asset_id) && self.handle.is_playing()
    }

    fn start_fade(&mut self, to: f32, duration_ms: u64, completion: FadeCompletion, now: DateTime<Utc>) {
        self.fade = Some(VolumeFade {
            from: self.handle.volume(),
            to,
            started_at: now,
            duration_ms,
            completion,
        });
        self.update(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use stagehand_test_support::RecordingMediaHandle;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        t0() + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn test_new_track_fades_in_from_silence() {
        // Arrange
        let probe = RecordingMediaHandle::new();
        let mut channel = MusicChannel::new(Box::new(probe.clone()));

        // Act
        channel
            .play("theme", "/a/theme.ogg", true, 0.8, 1000, t0())
            .unwrap();
        let start = probe.volume();
        channel.update(at(500));
        let midway = probe.volume();
        channel.update(at(1000));

        // Assert
        assert!(start.abs() < 1e-6);
        assert!((midway - 0.4).abs() < 1e-6);
        assert!((probe.volume() - 0.8).abs() < 1e-6);
        assert!(!channel.is_fading());
        assert_eq!(probe.loaded(), vec!["/a/theme.ogg".to_owned()]);
    }

    #[test]
    fn test_same_playing_track_only_updates_looping() {
        let probe = RecordingMediaHandle::new();
        let mut channel = MusicChannel::new(Box::new(probe.clone()));
        channel.play("theme", "/a/theme.ogg", true, 1.0, 0, t0()).unwrap();

        channel.play("theme", "/a/theme.ogg", false, 1.0, 0, at(10)).unwrap();

        assert_eq!(probe.loaded().len(), 1);
        assert_eq!(probe.play_calls(), 1);
        assert!(!probe.looping());
    }

    #[test]
    fn test_stop_fades_out_then_pauses() {
        let probe = RecordingMediaHandle::new();
        let mut channel = MusicChannel::new(Box::new(probe.clone()));
        channel.play("theme", "/a/theme.ogg", true, 1.0, 0, t0()).unwrap();

        channel.stop(200, at(100));
        channel.update(at(200));
        assert_eq!(probe.pause_calls(), 0);
        channel.update(at(300));

        assert_eq!(probe.pause_calls(), 1);
        assert!(probe.volume().abs() < 1e-6);
        assert!(!channel.is_playing());
    }

    #[test]
    fn test_load_failure_leaves_channel_silent() {
        let mut channel = MusicChannel::new(Box::new(RecordingMediaHandle::failing()));

        let result = channel.play("theme", "/a/theme.ogg", true, 1.0, 0, t0());

        assert!(matches!(result, Err(EngineError::MediaLoadFailure(_))));
        assert_eq!(channel.current_asset(), None);
    }

    #[test]
    fn test_next_deadline_samples_fades_in_small_steps() {
        let probe = RecordingMediaHandle::new();
        let mut channel = MusicChannel::new(Box::new(probe));
        assert_eq!(channel.next_deadline(t0()), None);

        channel.play("theme", "/a/theme.ogg", true, 1.0, 1000, t0()).unwrap();

        assert_eq!(channel.next_deadline(t0()), Some(at(50)));
        assert_eq!(channel.next_deadline(at(980)), Some(at(1000)));
    }
}
