//! SetVariable.

use stagehand_core::error::{EngineError, ReferenceKind};
use stagehand_script::domain::command::{SetVariable, VariableOperator};
use stagehand_script::domain::value::VariableValue;

use super::HandlerResult;
use crate::application::context::HandlerContext;
use crate::application::outcome::HandlerOutcome;
use crate::domain::patch::StateChange;

#[allow(clippy::cast_precision_loss)]
pub(super) fn set_variable(set: &SetVariable, ctx: &mut HandlerContext<'_>) -> HandlerResult {
    let project = ctx.project;
    let state = ctx.state;
    let definition = project
        .variable(&set.variable_id)
        .ok_or_else(|| EngineError::missing(ReferenceKind::Variable, &set.variable_id))?;

    let value = match set.operator {
        VariableOperator::Set => set.value.coerce_to(definition.variable_type),
        VariableOperator::Add | VariableOperator::Subtract => {
            let current = state
                .variables
                .get(&set.variable_id)
                .cloned()
                .unwrap_or_else(|| definition.initial_value());
            let base = numeric_or_zero(&current, "current value", ctx);
            let operand = numeric_or_zero(&set.value, "operand", ctx);
            let result = if set.operator == VariableOperator::Add {
                base + operand
            } else {
                base - operand
            };
            VariableValue::Number(result).coerce_to(definition.variable_type)
        }
        VariableOperator::Random => {
            let drawn = ctx.rng.next_i64_range(set.random_min, set.random_max);
            VariableValue::Number(drawn as f64).coerce_to(definition.variable_type)
        }
    };

    Ok(HandlerOutcome::apply(
        StateChange::Variable {
            variable_id: definition.id.clone(),
            value,
        }
        .into(),
    ))
}

/// Arithmetic treats anything non-numeric as 0 and reports it.
fn numeric_or_zero(value: &VariableValue, role: &str, ctx: &mut HandlerContext<'_>) -> f64 {
    value.as_number().unwrap_or_else(|| {
        ctx.warn_error(&EngineError::InvalidOperatorOrType(format!(
            "{role} '{value}' is not numeric, using 0"
        )));
        0.0
    })
}
