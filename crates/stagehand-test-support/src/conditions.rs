//! Fixed condition evaluator.

use stagehand_script::domain::conditions::{Condition, ConditionEvaluator};
use stagehand_script::domain::value::Variables;

/// Answers every non-empty condition list with the same verdict. An empty
/// list always holds.
#[derive(Debug, Clone, Copy)]
pub struct FixedConditionEvaluator(pub bool);

impl ConditionEvaluator for FixedConditionEvaluator {
    fn evaluate(&self, conditions: &[Condition], _variables: &Variables) -> bool {
        conditions.is_empty() || self.0
    }
}
