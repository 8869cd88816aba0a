//! Screen effects: shake, tint, pan/zoom, reset and flash.
//!
//! Each effect sets the duration the presentation animates over. Blocking
//! variants suspend for that duration; shake and flash otherwise clear
//! themselves through a detached timer.

use stagehand_script::domain::command::{
    FlashScreen, PanZoomScreen, ResetScreenEffects, ShakeScreen, TintScreen,
};

use crate::application::outcome::HandlerOutcome;
use crate::domain::patch::{StateChange, StatePatch};
use crate::domain::state::{Flash, Shake, Tint};

fn blocking_or_not(
    wait_for_completion: bool,
    duration_ms: u64,
    updates: StatePatch,
) -> HandlerOutcome {
    if wait_for_completion {
        HandlerOutcome::timed(duration_ms, updates, StatePatch::new())
    } else {
        HandlerOutcome::apply(updates)
    }
}

pub(super) fn shake(shake: &ShakeScreen) -> HandlerOutcome {
    let updates = StatePatch::new()
        .with(StateChange::EffectDuration(shake.duration_ms))
        .with(StateChange::Shake(Some(Shake {
            intensity: shake.intensity,
            duration_ms: shake.duration_ms,
        })));
    let clear = StatePatch::from(StateChange::Shake(None));

    if shake.wait_for_completion {
        HandlerOutcome::timed(shake.duration_ms, updates, clear)
    } else {
        HandlerOutcome::apply(updates).detach(shake.duration_ms, clear)
    }
}

pub(super) fn tint(tint: &TintScreen) -> HandlerOutcome {
    let value = (tint.opacity > 0.0).then(|| Tint {
        color: tint.color.clone(),
        opacity: tint.opacity.clamp(0.0, 1.0),
    });
    let updates = StatePatch::new()
        .with(StateChange::EffectDuration(tint.duration_ms))
        .with(StateChange::Tint(value));
    blocking_or_not(tint.wait_for_completion, tint.duration_ms, updates)
}

pub(super) fn pan_zoom(pan_zoom: &PanZoomScreen) -> HandlerOutcome {
    let updates = StatePatch::new()
        .with(StateChange::EffectDuration(pan_zoom.duration_ms))
        .with(StateChange::PanZoom {
            zoom: pan_zoom.zoom,
            pan_x: pan_zoom.pan_x,
            pan_y: pan_zoom.pan_y,
        });
    blocking_or_not(pan_zoom.wait_for_completion, pan_zoom.duration_ms, updates)
}

pub(super) fn reset(reset: ResetScreenEffects) -> HandlerOutcome {
    let updates = StatePatch::new()
        .with(StateChange::EffectDuration(reset.duration_ms))
        .with(StateChange::ResetEffects);
    blocking_or_not(reset.wait_for_completion, reset.duration_ms, updates)
}

pub(super) fn flash(flash: &FlashScreen) -> HandlerOutcome {
    let updates = StateChange::Flash(Some(Flash {
        color: flash.color.clone(),
        duration_ms: flash.duration_ms,
    }))
    .into();
    let clear = StatePatch::from(StateChange::Flash(None));

    if flash.wait_for_completion {
        HandlerOutcome::timed(flash.duration_ms, updates, clear)
    } else {
        HandlerOutcome::apply(updates).detach(flash.duration_ms, clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::outcome::Flow;

    #[test]
    fn test_non_blocking_shake_clears_itself_later() {
        // Arrange
        let command = ShakeScreen {
            intensity: 8.0,
            duration_ms: 300,
            wait_for_completion: false,
        };

        // Act
        let outcome = shake(&command);

        // Assert
        assert_eq!(outcome.flow, Flow::Advance);
        assert_eq!(
            outcome.detached,
            vec![(300, StatePatch::from(StateChange::Shake(None)))]
        );
    }

    #[test]
    fn test_blocking_flash_clears_on_resume() {
        let command = FlashScreen {
            color: "#ff0000".to_owned(),
            duration_ms: 150,
            wait_for_completion: true,
        };

        let outcome = flash(&command);

        assert!(outcome.suspends());
        assert!(outcome.detached.is_empty());
        assert_eq!(outcome.on_resume.changes(), &[StateChange::Flash(None)]);
    }

    #[test]
    fn test_zero_opacity_tint_clears_the_tint() {
        let command = TintScreen {
            color: "#000000".to_owned(),
            opacity: 0.0,
            duration_ms: 0,
            wait_for_completion: true,
        };

        let outcome = tint(&command);

        assert_eq!(outcome.flow, Flow::Advance);
        assert!(outcome.updates.changes().contains(&StateChange::Tint(None)));
    }
}
