//! Jump and JumpToLabel.

use stagehand_core::error::{EngineError, ReferenceKind};
use stagehand_script::domain::command::{Jump, JumpToLabel};

use super::HandlerResult;
use crate::application::context::HandlerContext;
use crate::application::outcome::{HandlerOutcome, Target};

pub(super) fn jump(jump: &Jump, ctx: &HandlerContext<'_>) -> HandlerResult {
    ctx.project
        .scene(&jump.scene_id)
        .map(|scene| HandlerOutcome::goto(Target::Scene(scene.id.clone())))
        .ok_or_else(|| EngineError::missing(ReferenceKind::Scene, &jump.scene_id))
}

pub(super) fn jump_to_label(jump: &JumpToLabel, ctx: &HandlerContext<'_>) -> HandlerResult {
    ctx.scene_index
        .label(&jump.label_id)
        .map(|index| HandlerOutcome::goto(Target::Index(index)))
        .ok_or_else(|| EngineError::missing(ReferenceKind::Label, &jump.label_id))
}
