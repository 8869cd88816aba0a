//! PlayMusic, StopMusic and PlaySoundEffect.

use stagehand_core::assets::AssetKind;
use stagehand_script::domain::command::{PlayMusic, PlaySoundEffect, StopMusic};

use super::HandlerResult;
use crate::application::context::HandlerContext;
use crate::application::outcome::HandlerOutcome;
use crate::domain::patch::StateChange;
use crate::domain::state::MusicState;

pub(super) fn play_music(play: &PlayMusic, ctx: &mut HandlerContext<'_>) -> HandlerResult {
    let url = ctx.require_asset(&play.asset_id, AssetKind::Music)?;
    let volume = (play.volume * ctx.settings.music_volume).clamp(0.0, 1.0);

    ctx.music.play(
        &play.asset_id,
        &url,
        play.looping,
        volume,
        play.fade_in_ms,
        ctx.now,
    )?;

    Ok(HandlerOutcome::apply(
        StateChange::Music(MusicState {
            asset_id: Some(play.asset_id.clone()),
            url: Some(url),
            looping: play.looping,
            volume,
            is_playing: true,
        })
        .into(),
    ))
}

pub(super) fn stop_music(stop: StopMusic, ctx: &mut HandlerContext<'_>) -> HandlerOutcome {
    ctx.music.stop(stop.fade_out_ms, ctx.now);
    HandlerOutcome::apply(
        StateChange::Music(MusicState {
            is_playing: false,
            ..ctx.state.music.clone()
        })
        .into(),
    )
}

pub(super) fn play_sound_effect(play: &PlaySoundEffect, ctx: &HandlerContext<'_>) -> HandlerResult {
    let url = ctx.require_asset(&play.asset_id, AssetKind::SoundEffect)?;
    let volume = (play.volume * ctx.settings.sfx_volume).clamp(0.0, 1.0);
    ctx.sound_effects.play(&url, volume)?;
    Ok(HandlerOutcome::advance())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{Harness, project};
    use stagehand_core::media::MediaHandle;

    fn play(asset_id: &str) -> PlayMusic {
        PlayMusic {
            asset_id: asset_id.to_owned(),
            volume: 1.0,
            looping: true,
            fade_in_ms: 0,
        }
    }

    #[test]
    fn test_play_music_scales_by_music_volume_setting() {
        // Arrange
        let mut harness = Harness::new(project(Vec::new()));

        // Act
        let outcome = harness.run(|ctx| play_music(&play("theme"), ctx)).unwrap();

        // Assert
        let Some(StateChange::Music(music)) = outcome.updates.changes().first() else {
            panic!("expected a music change");
        };
        assert!((music.volume - 0.8).abs() < 1e-6);
        assert!((harness.music_probe.volume() - 0.8).abs() < 1e-6);
        assert_eq!(harness.music_probe.loaded(), vec!["/music/theme.ogg".to_owned()]);
    }

    #[test]
    fn test_replaying_current_track_does_not_restart_it() {
        let mut harness = Harness::new(project(Vec::new()));
        harness.run(|ctx| play_music(&play("theme"), ctx)).unwrap();

        harness.run(|ctx| play_music(&play("theme"), ctx)).unwrap();

        assert_eq!(harness.music_probe.play_calls(), 1);
    }

    #[test]
    fn test_sound_effect_leaves_music_alone() {
        let mut harness = Harness::new(project(Vec::new()));
        let effect = PlaySoundEffect {
            asset_id: "click".to_owned(),
            volume: 0.5,
        };

        let outcome = harness.run(|ctx| play_sound_effect(&effect, ctx)).unwrap();

        assert_eq!(outcome, HandlerOutcome::advance());
        assert_eq!(
            harness.sound_effects.played(),
            vec![("/sfx/click.ogg".to_owned(), 0.5)]
        );
        assert!(harness.music_probe.loaded().is_empty());
    }
}
